use std::path::PathBuf;

use blog_store::DbError;
use thiserror::Error;

/// Errors raised while loading a fixture document.
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Failed to read fixture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML fixture: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON fixture: {0}")]
    Json(#[from] serde_json::Error),

    /// A post or comment names a key not defined earlier in the document
    #[error("Unknown {kind} reference '{key}'")]
    UnknownReference { kind: &'static str, key: String },

    #[error("Duplicate {kind} key '{key}'")]
    DuplicateKey { kind: &'static str, key: String },

    #[error("Unsupported fixture format: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Db(#[from] DbError),
}
