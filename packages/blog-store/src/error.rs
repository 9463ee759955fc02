//! Database error types.

use thiserror::Error;

/// Database operation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DbError {
    /// Table not found
    #[error("Table '{table}' not found")]
    TableNotFound { table: String },

    /// Table already exists
    #[error("Table '{0}' already exists")]
    TableAlreadyExists(String),

    /// Field not found in table
    #[error("Field '{field}' not found in table '{table}'")]
    FieldNotFound { table: String, field: String },

    /// Field already exists in table
    #[error("Field '{field}' already exists in table '{table}'")]
    FieldAlreadyExists { table: String, field: String },

    /// Relation not found on table
    #[error("Relation '{relation}' not found on table '{table}'")]
    RelationNotFound { table: String, relation: String },

    /// Type mismatch error
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    /// Record not found
    #[error("Record {id} not found in table '{table}'")]
    RecordNotFound { table: String, id: u64 },

    /// Unique constraint violated
    #[error("Duplicate value {value} for unique field '{field}' in table '{table}'")]
    UniqueViolation {
        table: String,
        field: String,
        value: String,
    },

    /// Foreign key constraint violated
    #[error("Integrity violation on '{table}.{field}': {reason}")]
    IntegrityViolation {
        table: String,
        field: String,
        reason: String,
    },

    /// Row limit exceeded for a table
    #[error("Capacity exceeded for table '{table}': requested {requested} records, limit {limit}")]
    CapacityExceeded {
        table: String,
        requested: usize,
        limit: usize,
    },

    /// Transaction conflict
    #[error("Transaction conflict: {0}")]
    TransactionConflict(String),

    /// Lock poisoned (RwLock poisoned)
    #[error("Lock poisoned")]
    LockPoisoned,
}
