use crate::table::Row;
use crate::types::Value;

/// Represents a single change staged against a table.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Create a new record
    Create {
        /// Id assigned to the new record
        id: u64,
        /// Field values
        values: Vec<Value>,
    },
    /// Update an existing record
    Update {
        /// Id of the record to update
        id: u64,
        /// Values before the update (for rollback and diagnostics)
        old: Vec<Value>,
        /// Values after the update
        new: Vec<Value>,
    },
    /// Delete a record
    Delete {
        /// Original record (for rollback and diagnostics)
        original: Row,
    },
}
