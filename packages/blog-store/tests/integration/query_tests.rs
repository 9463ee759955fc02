//! Relation-path predicates, ordering and paging through `Database::query`.

use blog_store::table::{Direction, OnDelete, Predicate, Query};
use blog_store::types::Value;
use blog_store::DbError;
use ntest::timeout;

use super::helpers::{author, book, library, review};

fn titles(rows: &[blog_store::table::Row]) -> Vec<String> {
    rows.iter()
        .map(|row| row.values[1].as_text().unwrap_or_default().to_string())
        .collect()
}

fn seeded() -> blog_store::Database {
    let db = library(OnDelete::Cascade, OnDelete::Cascade);
    let tolkien = author(&db, "Tolkien", "UK");
    let herbert = author(&db, "Herbert", "US");
    let hobbit = book(&db, tolkien, "The Hobbit", 1937);
    let dune = book(&db, herbert, "Dune", 1965);
    let rings = book(&db, tolkien, "The Lord of the Rings", 1954);
    review(&db, hobbit, 5);
    review(&db, dune, 4);
    review(&db, rings, 5);
    review(&db, rings, 2);
    db
}

#[timeout(1000)]
#[test]
fn test_filter_on_local_field() {
    let db = seeded();

    let rows = db
        .query(
            "books",
            &Query::new().filter(Predicate::eq("title", "Dune")),
        )
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, 2);
}

#[timeout(1000)]
#[test]
fn test_filter_through_one_hop() {
    let db = seeded();

    let rows = db
        .query(
            "books",
            &Query::new().filter(Predicate::eq("author.name", "Tolkien")),
        )
        .unwrap();
    assert_eq!(titles(&rows), vec!["The Hobbit", "The Lord of the Rings"]);
}

#[timeout(1000)]
#[test]
fn test_filter_through_two_hops() {
    let db = seeded();

    let rows = db
        .query(
            "reviews",
            &Query::new().filter(Predicate::eq("book.author.country", "UK")),
        )
        .unwrap();
    let ids: Vec<u64> = rows.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3, 4]);
}

#[timeout(1000)]
#[test]
fn test_predicates_are_conjunctive() {
    let db = seeded();

    let query = Query::new()
        .filter(Predicate::eq("book.author.name", "Tolkien"))
        .filter(Predicate::eq("stars", 5u64));
    let rows = db.query("reviews", &query).unwrap();
    let ids: Vec<u64> = rows.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[timeout(1000)]
#[test]
fn test_filter_on_id_and_unmatched_path() {
    let db = seeded();

    let by_id = db
        .query("authors", &Query::new().filter(Predicate::eq("id", 2u64)))
        .unwrap();
    assert_eq!(by_id[0].values[0], Value::from("Herbert"));

    let nobody = db
        .query(
            "books",
            &Query::new().filter(Predicate::eq("author.name", "Asimov")),
        )
        .unwrap();
    assert!(nobody.is_empty());
}

#[timeout(1000)]
#[test]
fn test_order_limit_offset() {
    let db = seeded();

    let newest = db
        .query(
            "books",
            &Query::new().order_by("year", Direction::Desc).limit(1),
        )
        .unwrap();
    assert_eq!(titles(&newest), vec!["Dune"]);

    let rest = db
        .query(
            "books",
            &Query::new().order_by("year", Direction::Desc).offset(1),
        )
        .unwrap();
    assert_eq!(titles(&rest), vec!["The Lord of the Rings", "The Hobbit"]);

    let past_end = db
        .query("books", &Query::new().offset(10))
        .unwrap();
    assert!(past_end.is_empty());
}

#[timeout(1000)]
#[test]
fn test_query_errors() {
    let db = seeded();

    let wrong_type = db.query(
        "books",
        &Query::new().filter(Predicate::eq("year", "nineteen")),
    );
    assert!(matches!(wrong_type, Err(DbError::TypeMismatch { .. })));

    let unknown_relation = db.query(
        "books",
        &Query::new().filter(Predicate::eq("publisher.name", "Allen")),
    );
    assert!(matches!(
        unknown_relation,
        Err(DbError::RelationNotFound { .. })
    ));

    let unknown_field = db.query(
        "books",
        &Query::new().order_by("isbn", Direction::Asc),
    );
    assert!(matches!(unknown_field, Err(DbError::FieldNotFound { .. })));

    let unknown_table = db.query("shelves", &Query::new());
    assert!(matches!(unknown_table, Err(DbError::TableNotFound { .. })));
}

#[timeout(1000)]
#[test]
fn test_truncate_all_resets_ids() -> anyhow::Result<()> {
    let db = seeded();

    assert_eq!(db.truncate_all()?, 2 + 3 + 4);
    for name in ["authors", "books", "reviews"] {
        assert_eq!(db.count(name)?, 0);
    }

    let author_id = author(&db, "Le Guin", "US");
    assert_eq!(author_id, 1);
    assert_eq!(book(&db, author_id, "The Dispossessed", 1974), 1);
    Ok(())
}
