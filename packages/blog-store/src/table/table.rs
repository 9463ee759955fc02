//! Table schema and row management.
//!
//! Each table has:
//! - Fixed schema with field definitions
//! - Atomic row storage for lock-free reads
//! - Record ID sequence generator
//! - Optional relations to other tables

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::atomic_rows::AtomicRows;
use crate::error::DbError;
use crate::types::Value;

use super::field::Field;
use super::relation::Relation;
use super::row::Row;
use super::validation;

/// Table schema and row management.
///
/// Rows are kept ordered by id, which is also insertion order since ids are
/// handed out from a monotonically increasing sequence.
#[derive(Debug)]
pub struct Table {
    /// Table name
    pub name: String,
    /// Field definitions in declaration order
    pub fields: Vec<Field>,
    /// Foreign key relations to other tables
    pub relations: Vec<Relation>,
    /// Atomic row storage
    pub rows: AtomicRows,
    /// Next record ID to assign (atomic counter)
    pub next_id: AtomicU64,
}

impl Table {
    /// Creates a new table with the given name and field definitions.
    ///
    /// # Arguments
    /// * `name` - Table name
    /// * `fields` - Field definitions
    /// * `initial_capacity` - Initial capacity in records (default: 64)
    /// * `max_records` - Maximum number of records the table may hold
    pub fn create(
        name: String,
        fields: Vec<Field>,
        initial_capacity: Option<usize>,
        max_records: usize,
    ) -> Result<Self, DbError> {
        validation::validate_field_names(&name, &fields)?;

        Ok(Self {
            name,
            fields,
            relations: Vec::new(),
            rows: AtomicRows::new(initial_capacity.unwrap_or(64), max_records),
            next_id: AtomicU64::new(1), // Start IDs at 1
        })
    }

    /// Returns the position of a field within each row.
    pub fn field_index(&self, field_name: &str) -> Result<usize, DbError> {
        self.fields
            .iter()
            .position(|f| f.name == field_name)
            .ok_or_else(|| DbError::FieldNotFound {
                table: self.name.clone(),
                field: field_name.to_string(),
            })
    }

    /// Returns the field definition for the given field name.
    pub fn get_field(&self, field_name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == field_name)
    }

    /// Atomically increments and returns the next record ID.
    pub fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Returns the current next ID value without incrementing.
    pub fn current_next_id(&self) -> u64 {
        self.next_id.load(Ordering::Acquire)
    }

    /// Returns the number of records currently stored.
    pub fn record_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns a consistent snapshot of all rows in id order.
    pub fn snapshot(&self) -> Arc<Vec<Row>> {
        self.rows.load()
    }

    /// Reads a record by id.
    pub fn get_record(&self, id: u64) -> Option<Row> {
        let rows = self.rows.load();
        validation::row_position(&rows, id).map(|pos| rows[pos].clone())
    }

    /// Returns `true` if a record with this id exists.
    pub fn contains(&self, id: u64) -> bool {
        validation::row_position(&self.rows.load(), id).is_some()
    }

    /// Creates a new record from field values.
    ///
    /// # Returns
    /// `Result<u64, DbError>` containing the assigned record ID or an error.
    ///
    /// Writers must be serialized by the caller; concurrent creates on the
    /// same table follow last-writer-wins semantics.
    pub fn create_record(&self, values: Vec<Value>) -> Result<u64, DbError> {
        validation::validate_values(&self.fields, &values)?;

        let mut rows = self.rows.load_full();
        validation::check_unique(&self.name, &self.fields, &rows, &values, None)?;
        self.rows
            .ensure_capacity(rows.len() + 1)
            .map_err(|e| self.with_table_name(e))?;

        let id = self.next_id();
        rows.push(Row::new(id, values));
        self.rows.store(rows).map_err(|e| self.with_table_name(e))?;

        Ok(id)
    }

    /// Replaces all values of an existing record.
    pub fn update_record(&self, id: u64, values: Vec<Value>) -> Result<(), DbError> {
        validation::validate_values(&self.fields, &values)?;

        let mut rows = self.rows.load_full();
        let pos = validation::row_position(&rows, id).ok_or_else(|| DbError::RecordNotFound {
            table: self.name.clone(),
            id,
        })?;
        validation::check_unique(&self.name, &self.fields, &rows, &values, Some(id))?;

        rows[pos].values = values;
        self.rows.store(rows).map_err(|e| self.with_table_name(e))
    }

    /// Removes a record and returns it.
    ///
    /// Does not look at relations; referential checks belong to the database.
    pub fn delete_record(&self, id: u64) -> Result<Row, DbError> {
        let mut rows = self.rows.load_full();
        let pos = validation::row_position(&rows, id).ok_or_else(|| DbError::RecordNotFound {
            table: self.name.clone(),
            id,
        })?;

        let removed = rows.remove(pos);
        self.rows.store(rows).map_err(|e| self.with_table_name(e))?;
        Ok(removed)
    }

    /// Removes every record and restarts the id sequence at 1.
    ///
    /// # Returns
    /// Number of records removed.
    pub fn truncate(&self) -> Result<usize, DbError> {
        let removed = self.rows.len();
        self.rows
            .store(Vec::new())
            .map_err(|e| self.with_table_name(e))?;
        self.next_id.store(1, Ordering::Release);
        Ok(removed)
    }

    /// Adds a relation to another table.
    pub fn add_relation(&mut self, relation: Relation) {
        self.relations.push(relation);
    }

    /// Looks up a relation by name.
    pub fn relation(&self, name: &str) -> Result<&Relation, DbError> {
        self.relations
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| DbError::RelationNotFound {
                table: self.name.clone(),
                relation: name.to_string(),
            })
    }

    /// Fills in the table name on errors raised by the row storage.
    pub(crate) fn with_table_name(&self, error: DbError) -> DbError {
        match error {
            DbError::CapacityExceeded {
                requested, limit, ..
            } => DbError::CapacityExceeded {
                table: self.name.clone(),
                requested,
                limit,
            },
            other => other,
        }
    }
}
