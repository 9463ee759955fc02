//! Comments left on posts.

use blog_store::table::{Predicate, Row};
use blog_store::types::Value;
use blog_store::DbError;
use chrono::{DateTime, Utc};

use crate::entity::{Entity, OrderField, RowReader};
use crate::post::Post;
use crate::schema::COMMENTS;
use crate::Blog;

/// A comment on a post. `author` is a free-text name, not a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: Option<u64>,
    pub post_id: Option<u64>,
    pub author: String,
    pub content: String,
    pub posted_at: Option<DateTime<Utc>>,
}

impl Comment {
    /// Creates an unsaved comment on `post`.
    pub fn new(post: &Post, author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            post_id: post.id,
            author: author.into(),
            content: content.into(),
            posted_at: None,
        }
    }

    pub fn with_posted_at(mut self, at: DateTime<Utc>) -> Self {
        self.posted_at = Some(at);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentFilter {
    /// Comments on the post with this id; an unsaved post matches nothing
    ByPost(Option<u64>),
    ByAuthor(String),
    /// Comments on posts written by the user with this email
    ByPostAuthorEmail(String),
}

impl CommentFilter {
    pub fn by_post(post: &Post) -> Self {
        CommentFilter::ByPost(post.id)
    }
}

impl From<CommentFilter> for Predicate {
    fn from(filter: CommentFilter) -> Self {
        match filter {
            CommentFilter::ByPost(id) => Predicate::eq("post_id", id),
            CommentFilter::ByAuthor(author) => Predicate::eq("author", author),
            CommentFilter::ByPostAuthorEmail(email) => Predicate::eq("post.author.email", email),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentOrder {
    Id,
    Author,
    PostedAt,
}

impl OrderField for CommentOrder {
    fn field(&self) -> &'static str {
        match self {
            CommentOrder::Id => "id",
            CommentOrder::Author => "author",
            CommentOrder::PostedAt => "posted_at",
        }
    }
}

impl Entity for Comment {
    const TABLE: &'static str = COMMENTS;
    type Filter = CommentFilter;
    type Order = CommentOrder;

    fn id(&self) -> Option<u64> {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = Some(id);
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::from(self.post_id),
            Value::from(self.author.as_str()),
            Value::from(self.content.as_str()),
            Value::from(self.posted_at),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, DbError> {
        let reader = RowReader::new(COMMENTS, row);
        Ok(Self {
            id: Some(row.id),
            post_id: Some(reader.u64(0)?),
            author: reader.text(1)?,
            content: reader.text(2)?,
            posted_at: Some(reader.timestamp(3)?),
        })
    }

    fn validate(&self) -> Result<(), DbError> {
        if self.post_id.is_none() {
            return Err(DbError::IntegrityViolation {
                table: COMMENTS.to_string(),
                field: "post_id".to_string(),
                reason: "comment post is not saved".to_string(),
            });
        }
        Ok(())
    }

    fn prepared_for_insert(&self, blog: &Blog) -> Self {
        let mut comment = self.clone();
        comment.posted_at.get_or_insert_with(|| blog.now());
        comment
    }
}
