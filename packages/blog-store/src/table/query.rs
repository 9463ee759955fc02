//! Query descriptions and single-table scans.

use std::collections::HashSet;

use super::row::Row;
use super::Table;
use crate::error::DbError;
use crate::types::Value;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Tables at least this large are scanned with rayon when `parallel` is on.
#[cfg(feature = "parallel")]
pub(crate) const PARALLEL_SCAN_THRESHOLD: usize = 4096;

/// Pseudo-field naming the row id in predicates and orderings.
pub const ID_FIELD: &str = "id";

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// Ordering clause over a field of the queried table.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Equality predicate on a field or on a relation path.
///
/// `path` is either a field of the queried table (`email`) or a dotted chain
/// of relation names ending in a field of the last target (`author.email`,
/// `post.author.email`).
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub path: String,
    pub value: Value,
}

impl Predicate {
    /// Creates an equality predicate.
    pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Splits the path into relation hops and the final field name.
    pub fn split_path(&self) -> (Vec<&str>, &str) {
        let mut segments: Vec<&str> = self.path.split('.').collect();
        let field = segments.pop().unwrap_or_default();
        (segments, field)
    }
}

/// A query against one table: conjunctive predicates, optional ordering,
/// offset and limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub predicates: Vec<Predicate>,
    pub order: Option<OrderBy>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality predicate (AND-ed with the others).
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Sets the ordering clause, replacing any previous one.
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// Column addressed by a condition or ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Field(usize),
}

impl Column {
    fn value_of(self, row: &Row) -> Value {
        match self {
            Column::Id => Value::U64(row.id),
            Column::Field(index) => row.get(index).cloned().unwrap_or(Value::Null),
        }
    }
}

/// How a resolved condition tests a column.
#[derive(Debug, Clone, PartialEq)]
pub enum Matcher {
    /// Column equals the value
    Eq(Value),
    /// Column holds one of these row ids
    In(HashSet<u64>),
}

/// A predicate resolved to a column of a single table.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: Column,
    pub matcher: Matcher,
}

impl Condition {
    fn matches(&self, row: &Row) -> bool {
        match (&self.matcher, self.column) {
            (Matcher::Eq(expected), Column::Id) => expected.as_u64() == Some(row.id),
            (Matcher::Eq(expected), Column::Field(index)) => row.get(index) == Some(expected),
            (Matcher::In(ids), column) => column
                .value_of(row)
                .as_u64()
                .is_some_and(|id| ids.contains(&id)),
        }
    }
}

fn matches_all(row: &Row, conditions: &[Condition]) -> bool {
    conditions.iter().all(|c| c.matches(row))
}

impl Table {
    /// Resolves a field name (or `id`) to a column of this table.
    pub fn column(&self, field_name: &str) -> Result<Column, DbError> {
        if field_name == ID_FIELD {
            return Ok(Column::Id);
        }
        self.field_index(field_name).map(Column::Field)
    }

    /// Returns every row matching all conditions, in id order.
    pub fn scan(&self, conditions: &[Condition]) -> Vec<Row> {
        let rows = self.rows.load();

        #[cfg(feature = "parallel")]
        if rows.len() >= PARALLEL_SCAN_THRESHOLD {
            // Indexed collect keeps the input order.
            return rows
                .par_iter()
                .filter(|row| matches_all(row, conditions))
                .cloned()
                .collect();
        }

        rows.iter()
            .filter(|row| matches_all(row, conditions))
            .cloned()
            .collect()
    }

    /// Returns the ids of rows matching all conditions.
    pub fn matching_ids(&self, conditions: &[Condition]) -> HashSet<u64> {
        self.rows
            .load()
            .iter()
            .filter(|row| matches_all(row, conditions))
            .map(|row| row.id)
            .collect()
    }

    /// Runs resolved conditions with optional ordering and paging.
    ///
    /// Sorting is stable, so rows with equal keys stay in insertion order for
    /// both directions.
    pub fn select(
        &self,
        conditions: &[Condition],
        order: Option<&OrderBy>,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<Row>, DbError> {
        let mut rows = self.scan(conditions);

        if let Some(order) = order {
            let column = self.column(&order.field)?;
            rows.sort_by(|a, b| {
                let ordering = column.value_of(a).sort_cmp(&column.value_of(b));
                match order.direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            });
        }

        let take = limit.unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(offset).take(take).collect())
    }
}
