//! Shared fixtures for integration tests.

use blog_store::config::DbConfig;
use blog_store::database::Database;
use blog_store::table::{Field, OnDelete, Relation};
use blog_store::types::{FieldType, Value};

/// Builds an `authors` / `books` / `reviews` chain with the given policies.
pub fn library(book_policy: OnDelete, review_policy: OnDelete) -> Database {
    library_with_config(DbConfig::default(), book_policy, review_policy)
}

pub fn library_with_config(
    config: DbConfig,
    book_policy: OnDelete,
    review_policy: OnDelete,
) -> Database {
    let db = Database::with_config(config);

    db.create_table(
        "authors".to_string(),
        vec![
            Field::new("name".to_string(), FieldType::Text).unique(),
            Field::new("country".to_string(), FieldType::Text),
        ],
    )
    .unwrap();
    db.create_table(
        "books".to_string(),
        vec![
            Field::new("author_id".to_string(), FieldType::U64),
            Field::new("title".to_string(), FieldType::Text),
            Field::new("year".to_string(), FieldType::U64),
        ],
    )
    .unwrap();
    db.create_table(
        "reviews".to_string(),
        vec![
            Field::new("book_id".to_string(), FieldType::U64),
            Field::new("stars".to_string(), FieldType::U64),
        ],
    )
    .unwrap();

    db.add_relation(
        "books",
        Relation::new(
            "author".to_string(),
            "author_id".to_string(),
            "authors".to_string(),
            book_policy,
        ),
    )
    .unwrap();
    db.add_relation(
        "reviews",
        Relation::new(
            "book".to_string(),
            "book_id".to_string(),
            "books".to_string(),
            review_policy,
        ),
    )
    .unwrap();

    db
}

pub fn author(db: &Database, name: &str, country: &str) -> u64 {
    db.insert("authors", vec![Value::from(name), Value::from(country)])
        .unwrap()
}

pub fn book(db: &Database, author_id: u64, title: &str, year: u64) -> u64 {
    db.insert(
        "books",
        vec![Value::U64(author_id), Value::from(title), Value::U64(year)],
    )
    .unwrap()
}

pub fn review(db: &Database, book_id: u64, stars: u64) -> u64 {
    db.insert("reviews", vec![Value::U64(book_id), Value::U64(stars)])
        .unwrap()
}
