//! Database configuration.

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Initial table capacity in records
    pub initial_table_capacity: usize,
    /// Maximum records per table (default: unlimited)
    pub max_records_per_table: usize,
    /// Verify that reference fields point at existing rows on every write
    pub enforce_foreign_keys: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            initial_table_capacity: 64,
            max_records_per_table: usize::MAX,
            enforce_foreign_keys: true,
        }
    }
}
