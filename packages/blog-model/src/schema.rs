//! Table layout of the blog.
//!
//! Field order here is the column order entities read and write.

use blog_store::table::{Field, OnDelete, Relation};
use blog_store::types::FieldType;
use blog_store::{Database, DbError};

pub const USERS: &str = "users";
pub const POSTS: &str = "posts";
pub const COMMENTS: &str = "comments";

/// Creates the three tables and their cascading relations.
pub fn install(db: &Database) -> Result<(), DbError> {
    db.create_table(
        USERS.to_string(),
        vec![
            Field::new("email".to_string(), FieldType::Text).unique(),
            Field::new("password".to_string(), FieldType::Text),
            Field::new("fullname".to_string(), FieldType::Text),
            Field::new("is_admin".to_string(), FieldType::Bool),
        ],
    )?;
    db.create_table(
        POSTS.to_string(),
        vec![
            Field::new("author_id".to_string(), FieldType::U64),
            Field::new("title".to_string(), FieldType::Text),
            Field::new("content".to_string(), FieldType::Text),
            Field::new("posted_at".to_string(), FieldType::Timestamp),
        ],
    )?;
    db.create_table(
        COMMENTS.to_string(),
        vec![
            Field::new("post_id".to_string(), FieldType::U64),
            Field::new("author".to_string(), FieldType::Text),
            Field::new("content".to_string(), FieldType::Text),
            Field::new("posted_at".to_string(), FieldType::Timestamp),
        ],
    )?;

    db.add_relation(
        POSTS,
        Relation::new(
            "author".to_string(),
            "author_id".to_string(),
            USERS.to_string(),
            OnDelete::Cascade,
        ),
    )?;
    db.add_relation(
        COMMENTS,
        Relation::new(
            "post".to_string(),
            "post_id".to_string(),
            POSTS.to_string(),
            OnDelete::Cascade,
        ),
    )?;

    Ok(())
}
