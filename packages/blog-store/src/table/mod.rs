//! Table schema, field definitions, rows, queries and relation management.

mod field;
mod query;
mod relation;
mod row;
#[allow(clippy::module_inception)]
mod table;
pub(crate) mod validation;

pub use field::Field;
pub use query::{Column, Condition, Direction, Matcher, OrderBy, Predicate, Query, ID_FIELD};
pub use relation::{OnDelete, Relation};
pub use row::Row;
pub use table::Table;
