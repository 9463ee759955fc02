//! Blog posts.

use blog_store::table::{Predicate, Row};
use blog_store::types::Value;
use blog_store::DbError;
use chrono::{DateTime, Utc};

use crate::entity::{Entity, OrderField, RowReader};
use crate::schema::POSTS;
use crate::user::User;
use crate::Blog;

/// A post written by one user.
///
/// `posted_at` is stamped from the blog clock on first save unless set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: Option<u64>,
    pub author_id: Option<u64>,
    pub title: String,
    pub content: String,
    pub posted_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Creates an unsaved post by `author`.
    pub fn new(author: &User, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            author_id: author.id,
            title: title.into(),
            content: content.into(),
            posted_at: None,
        }
    }

    /// Sets an explicit publication time.
    pub fn with_posted_at(mut self, at: DateTime<Utc>) -> Self {
        self.posted_at = Some(at);
        self
    }
}

/// Named lookups on posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFilter {
    /// Posts by the author with this id; an unsaved author matches nothing
    ByAuthor(Option<u64>),
    /// Posts whose author has this email
    ByAuthorEmail(String),
    ByTitle(String),
}

impl PostFilter {
    pub fn by_author(author: &User) -> Self {
        PostFilter::ByAuthor(author.id)
    }
}

impl From<PostFilter> for Predicate {
    fn from(filter: PostFilter) -> Self {
        match filter {
            PostFilter::ByAuthor(id) => Predicate::eq("author_id", id),
            PostFilter::ByAuthorEmail(email) => Predicate::eq("author.email", email),
            PostFilter::ByTitle(title) => Predicate::eq("title", title),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOrder {
    Id,
    Title,
    PostedAt,
}

impl OrderField for PostOrder {
    fn field(&self) -> &'static str {
        match self {
            PostOrder::Id => "id",
            PostOrder::Title => "title",
            PostOrder::PostedAt => "posted_at",
        }
    }
}

impl Entity for Post {
    const TABLE: &'static str = POSTS;
    type Filter = PostFilter;
    type Order = PostOrder;

    fn id(&self) -> Option<u64> {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = Some(id);
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::from(self.author_id),
            Value::from(self.title.as_str()),
            Value::from(self.content.as_str()),
            Value::from(self.posted_at),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, DbError> {
        let reader = RowReader::new(POSTS, row);
        Ok(Self {
            id: Some(row.id),
            author_id: Some(reader.u64(0)?),
            title: reader.text(1)?,
            content: reader.text(2)?,
            posted_at: Some(reader.timestamp(3)?),
        })
    }

    fn validate(&self) -> Result<(), DbError> {
        if self.author_id.is_none() {
            return Err(DbError::IntegrityViolation {
                table: POSTS.to_string(),
                field: "author_id".to_string(),
                reason: "post author is not saved".to_string(),
            });
        }
        Ok(())
    }

    fn prepared_for_insert(&self, blog: &Blog) -> Self {
        let mut post = self.clone();
        post.posted_at.get_or_insert_with(|| blog.now());
        post
    }
}
