//! Blog data model: users, posts and comments persisted in a
//! [`blog_store::Database`].
//!
//! Entities are plain structs implementing [`Entity`]. Saving assigns the
//! row id and the creation timestamp; queries go through typed filters and
//! orderings; parent/child sequences are re-read on every access.

mod auth;
mod clock;
pub mod comment;
pub mod entity;
pub mod fixtures;
pub mod post;
mod relations;
pub mod schema;
pub mod user;

use blog_store::config::DbConfig;
use blog_store::{Database, DbError};
use chrono::{DateTime, Utc};

use clock::Clock;

pub use blog_store::table::Direction;
pub use comment::{Comment, CommentFilter, CommentOrder};
pub use entity::{Entity, OrderField, Query};
pub use fixtures::{DocumentFormat, FixtureError, Fixtures, LoadSummary};
pub use post::{Post, PostFilter, PostOrder};
pub use user::{User, UserFilter, UserOrder};

/// A blog store: the database with the blog schema installed, plus the
/// clock used to stamp new posts and comments.
#[derive(Debug)]
pub struct Blog {
    db: Database,
    clock: Clock,
}

impl Blog {
    /// Creates an empty blog with default database configuration.
    pub fn new() -> Result<Self, DbError> {
        Self::with_config(DbConfig::default())
    }

    /// Creates an empty blog with the given database configuration.
    pub fn with_config(config: DbConfig) -> Result<Self, DbError> {
        let db = Database::with_config(config);
        schema::install(&db)?;
        Ok(Self {
            db,
            clock: Clock::default(),
        })
    }

    /// Returns the underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Current time, strictly later than any previous call on this blog.
    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
