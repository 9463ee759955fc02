use crate::error::DbError;
use crate::table::validation;
use crate::table::{Field, Row, Table};
use crate::types::Value;

use super::change::Change;

/// Holds staged changes for a single table.
///
/// Changes are isolated from the published rows until commit.
#[derive(Debug)]
pub struct StagingBuffer {
    /// Name of the table this buffer belongs to
    pub table_name: String,
    /// Copy of the table rows with staged changes applied
    pub rows: Vec<Row>,
    /// List of changes staged in this transaction
    pub changes: Vec<Change>,
    /// Next id to hand out for staged creates
    pub next_id: u64,
    /// Table version the copy was taken from
    pub base_version: u64,
    /// Schema used to validate staged values
    fields: Vec<Field>,
}

impl StagingBuffer {
    /// Creates a new staging buffer from a table's current state.
    pub fn new(table: &Table) -> Self {
        // Version first: a store racing with the copy shows up as a conflict.
        let base_version = table.rows.version();
        Self {
            table_name: table.name.clone(),
            rows: table.rows.load_full(),
            changes: Vec::new(),
            next_id: table.current_next_id(),
            base_version,
            fields: table.fields.clone(),
        }
    }

    /// Stages a record creation.
    ///
    /// # Returns
    /// `Result<u64, DbError>` containing the id the record will have once committed.
    pub fn stage_create(&mut self, values: Vec<Value>) -> Result<u64, DbError> {
        validation::validate_values(&self.fields, &values)?;
        validation::check_unique(&self.table_name, &self.fields, &self.rows, &values, None)?;

        let id = self.next_id;
        self.next_id += 1;
        self.rows.push(Row::new(id, values.clone()));
        self.changes.push(Change::Create { id, values });

        Ok(id)
    }

    /// Stages a record update.
    pub fn stage_update(&mut self, id: u64, values: Vec<Value>) -> Result<(), DbError> {
        validation::validate_values(&self.fields, &values)?;
        let pos = self.position(id)?;
        validation::check_unique(&self.table_name, &self.fields, &self.rows, &values, Some(id))?;

        let old = std::mem::replace(&mut self.rows[pos].values, values.clone());
        self.changes.push(Change::Update {
            id,
            old,
            new: values,
        });

        Ok(())
    }

    /// Stages a record deletion.
    ///
    /// # Returns
    /// The row as it was before deletion.
    pub fn stage_delete(&mut self, id: u64) -> Result<Row, DbError> {
        let pos = self.position(id)?;
        let original = self.rows.remove(pos);
        self.changes.push(Change::Delete {
            original: original.clone(),
        });
        Ok(original)
    }

    /// Returns `true` if the staged copy holds a row with this id.
    pub fn contains(&self, id: u64) -> bool {
        validation::row_position(&self.rows, id).is_some()
    }

    /// Returns `true` if any change has been staged.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Returns the number of rows in the staged copy.
    pub fn record_count(&self) -> usize {
        self.rows.len()
    }

    fn position(&self, id: u64) -> Result<usize, DbError> {
        validation::row_position(&self.rows, id).ok_or_else(|| DbError::RecordNotFound {
            table: self.table_name.clone(),
            id,
        })
    }
}
