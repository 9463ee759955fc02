//! In-memory relational storage engine.
//!
//! Provides typed tables with generated row identity, unique constraints,
//! foreign-key relations with delete policies, relation-path queries and
//! staged multi-table transactions with atomic commit.

pub mod atomic_rows;
pub mod config;
pub mod database;
pub mod error;
pub mod table;
pub mod transaction;
pub mod types;

pub use database::Database;
pub use error::DbError;
