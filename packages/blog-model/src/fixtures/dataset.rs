//! Fixture document layout.
//!
//! ```yaml
//! users:
//!   - key: bob
//!     email: bob@gmail.com
//!     password: secret
//!     fullname: Bob
//!     is_admin: true
//! posts:
//!   - key: firstBobPost
//!     author: bob
//!     title: About the model layer
//!     content: ...
//!     posted_at: 2009-06-14T00:00:00Z
//! comments:
//!   - post: firstBobPost
//!     author: Guest
//!     content: You are right !
//! ```
//!
//! Users and posts carry a `key` that later entries reference. Entries are
//! inserted in document order.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::FixtureError;

/// Serialization format of a fixture document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    /// Picks the format from the file extension (`yml`, `yaml` or `json`).
    pub fn from_path(path: &Path) -> Result<Self, FixtureError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "yml" | "yaml" => Ok(DocumentFormat::Yaml),
            "json" => Ok(DocumentFormat::Json),
            _ => Err(FixtureError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dataset {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub posts: Vec<PostRecord>,
    #[serde(default)]
    pub comments: Vec<CommentRecord>,
}

impl Dataset {
    pub fn parse(document: &str, format: DocumentFormat) -> Result<Self, FixtureError> {
        let dataset = match format {
            DocumentFormat::Yaml => serde_yaml::from_str(document)?,
            DocumentFormat::Json => serde_json::from_str(document)?,
        };
        Ok(dataset)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserRecord {
    pub key: String,
    pub email: String,
    pub password: String,
    pub fullname: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostRecord {
    pub key: String,
    /// Key of the author in `users`
    pub author: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub posted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentRecord {
    /// Key of the commented post in `posts`
    pub post: String,
    pub author: String,
    pub content: String,
    #[serde(default)]
    pub posted_at: Option<DateTime<Utc>>,
}
