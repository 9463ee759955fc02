//! Seeding and resetting a blog from fixture documents.

mod dataset;
mod error;

use std::collections::HashMap;
use std::path::Path;

use blog_store::DbError;

use crate::comment::Comment;
use crate::entity::Entity;
use crate::post::Post;
use crate::user::User;
use crate::Blog;

pub use dataset::{CommentRecord, Dataset, DocumentFormat, PostRecord, UserRecord};
pub use error::FixtureError;

/// Number of entities inserted by one fixture load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub users: usize,
    pub posts: usize,
    pub comments: usize,
}

/// Fixture entry points.
pub struct Fixtures;

impl Fixtures {
    /// Empties every blog table and restarts id sequences.
    pub fn delete_database(blog: &Blog) -> Result<(), DbError> {
        let removed = blog.database().truncate_all()?;
        tracing::info!("Deleted database content ({} record(s))", removed);
        Ok(())
    }

    /// Loads a fixture file, picking YAML or JSON by extension.
    pub fn load_models(blog: &Blog, path: impl AsRef<Path>) -> Result<LoadSummary, FixtureError> {
        let path = path.as_ref();
        let format = DocumentFormat::from_path(path)?;
        let document = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Loading fixtures from {}", path.display());
        Self::load_models_from_str(blog, &document, format)
    }

    pub fn load_models_from_str(
        blog: &Blog,
        document: &str,
        format: DocumentFormat,
    ) -> Result<LoadSummary, FixtureError> {
        let dataset = Dataset::parse(document, format)?;
        Self::load_dataset(blog, dataset)
    }

    /// Inserts a parsed dataset in one transaction.
    ///
    /// Any error leaves the blog untouched.
    pub fn load_dataset(blog: &Blog, dataset: Dataset) -> Result<LoadSummary, FixtureError> {
        let db = blog.database();
        let mut tx = db.begin_transaction();
        let mut user_ids: HashMap<String, u64> = HashMap::new();
        let mut post_ids: HashMap<String, u64> = HashMap::new();

        for record in dataset.users {
            if user_ids.contains_key(&record.key) {
                return Err(FixtureError::DuplicateKey {
                    kind: "user",
                    key: record.key,
                });
            }
            let mut user = User::new(record.email, record.password, record.fullname);
            user.is_admin = record.is_admin;
            let id = user.stage_insert(blog, &mut tx)?.persisted_id()?;
            user_ids.insert(record.key, id);
        }

        for record in dataset.posts {
            if post_ids.contains_key(&record.key) {
                return Err(FixtureError::DuplicateKey {
                    kind: "post",
                    key: record.key,
                });
            }
            let author_id = *user_ids
                .get(&record.author)
                .ok_or(FixtureError::UnknownReference {
                    kind: "user",
                    key: record.author,
                })?;
            let post = Post {
                id: None,
                author_id: Some(author_id),
                title: record.title,
                content: record.content,
                posted_at: record.posted_at,
            };
            let id = post.stage_insert(blog, &mut tx)?.persisted_id()?;
            post_ids.insert(record.key, id);
        }

        let mut comments = 0;
        for record in dataset.comments {
            let post_id = *post_ids
                .get(&record.post)
                .ok_or(FixtureError::UnknownReference {
                    kind: "post",
                    key: record.post,
                })?;
            let comment = Comment {
                id: None,
                post_id: Some(post_id),
                author: record.author,
                content: record.content,
                posted_at: record.posted_at,
            };
            comment.stage_insert(blog, &mut tx)?;
            comments += 1;
        }

        db.commit_transaction(&mut tx)?;

        let summary = LoadSummary {
            users: user_ids.len(),
            posts: post_ids.len(),
            comments,
        };
        tracing::info!(
            "Loaded {} user(s), {} post(s), {} comment(s)",
            summary.users,
            summary.posts,
            summary.comments
        );
        Ok(summary)
    }
}
