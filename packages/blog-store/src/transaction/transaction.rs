use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::DbError;
use crate::table::{Row, Table};
use crate::types::Value;

use super::staging_buffer::StagingBuffer;

/// Transaction context holding staged changes across multiple tables.
///
/// Changes are isolated from published rows until commit.
#[derive(Debug)]
pub struct Transaction {
    /// Map of table name to staging buffer
    staging: HashMap<String, StagingBuffer>,
    /// Whether the transaction has been committed
    committed: AtomicBool,
    /// Whether the transaction has been aborted
    aborted: AtomicBool,
}

impl Transaction {
    /// Creates a new empty transaction.
    pub fn new() -> Self {
        Self {
            staging: HashMap::new(),
            committed: AtomicBool::new(false),
            aborted: AtomicBool::new(false),
        }
    }

    fn ensure_active(&self) -> Result<(), DbError> {
        if self.is_committed() {
            return Err(DbError::TransactionConflict(
                "transaction already committed".to_string(),
            ));
        }

        if self.is_aborted() {
            return Err(DbError::TransactionConflict(
                "transaction aborted".to_string(),
            ));
        }

        Ok(())
    }

    /// Gets or creates a staging buffer for the given table.
    pub fn get_or_create_staging_buffer(
        &mut self,
        table: &Table,
    ) -> Result<&mut StagingBuffer, DbError> {
        self.ensure_active()?;

        Ok(self
            .staging
            .entry(table.name.clone())
            .or_insert_with(|| StagingBuffer::new(table)))
    }

    /// Returns the staging buffer for a table, if one was created.
    pub fn staged(&self, table_name: &str) -> Option<&StagingBuffer> {
        self.staging.get(table_name)
    }

    /// Stages a record creation in the transaction.
    ///
    /// # Returns
    /// `Result<u64, DbError>` containing the id the record will have once committed.
    pub fn stage_create(&mut self, table: &Table, values: Vec<Value>) -> Result<u64, DbError> {
        let staging_buffer = self.get_or_create_staging_buffer(table)?;
        staging_buffer.stage_create(values)
    }

    /// Stages a record update in the transaction.
    pub fn stage_update(
        &mut self,
        table: &Table,
        id: u64,
        values: Vec<Value>,
    ) -> Result<(), DbError> {
        let staging_buffer = self.get_or_create_staging_buffer(table)?;
        staging_buffer.stage_update(id, values)
    }

    /// Stages a record deletion in the transaction.
    pub fn stage_delete(&mut self, table: &Table, id: u64) -> Result<Row, DbError> {
        let staging_buffer = self.get_or_create_staging_buffer(table)?;
        staging_buffer.stage_delete(id)
    }

    /// Commits all staged changes atomically.
    ///
    /// Every staged table is checked for conflicts and capacity before any
    /// rows are published, so either all tables change or none do.
    pub fn commit(&mut self, tables: &HashMap<String, &Table>) -> Result<(), DbError> {
        self.ensure_active()?;

        // Sort tables by name for a deterministic publication order
        let mut table_names: Vec<&String> = self.staging.keys().collect();
        table_names.sort();

        let mut targets = Vec::with_capacity(table_names.len());
        for table_name in table_names {
            let staging_buffer = &self.staging[table_name];
            if !staging_buffer.has_changes() {
                continue;
            }
            let table = tables
                .get(table_name)
                .ok_or_else(|| DbError::TableNotFound {
                    table: table_name.clone(),
                })?;

            if table.rows.version() != staging_buffer.base_version {
                return Err(DbError::TransactionConflict(format!(
                    "table '{}' changed since it was staged",
                    table_name
                )));
            }
            table
                .rows
                .ensure_capacity(staging_buffer.rows.len())
                .map_err(|e| table.with_table_name(e))?;

            targets.push((*table, staging_buffer));
        }

        for (table, staging_buffer) in targets {
            table
                .rows
                .store(staging_buffer.rows.clone())
                .map_err(|e| table.with_table_name(e))?;
            table
                .next_id
                .fetch_max(staging_buffer.next_id, Ordering::SeqCst);
            tracing::debug!(
                "Committed {} change(s) to table {}",
                staging_buffer.changes.len(),
                table.name
            );
        }

        // Mark as committed
        self.committed.store(true, Ordering::Release);
        Ok(())
    }

    /// Aborts the transaction, discarding all staged changes.
    pub fn abort(&mut self) {
        if !self.is_committed() && !self.is_aborted() {
            self.aborted.store(true, Ordering::Release);
            self.staging.clear();
        }
    }

    /// Returns whether the transaction has been committed.
    pub fn is_committed(&self) -> bool {
        self.committed.load(Ordering::Acquire)
    }

    /// Returns whether the transaction has been aborted.
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    /// Returns whether the transaction is still active (not committed or aborted).
    pub fn is_active(&self) -> bool {
        !self.is_committed() && !self.is_aborted()
    }

    /// Returns the number of tables with staged changes.
    pub fn staged_table_count(&self) -> usize {
        self.staging.len()
    }

    /// Returns whether any changes have been staged.
    pub fn has_staged_changes(&self) -> bool {
        self.staging.values().any(StagingBuffer::has_changes)
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}
