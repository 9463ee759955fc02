//! Atomic row storage using ArcSwap for lock-free reads.
//!
//! Readers take an `Arc` snapshot of the row vector; writers clone it,
//! modify the clone and publish it with a single atomic swap.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::error::DbError;
use crate::table::Row;

/// Copy-on-write row vector with a publication counter.
///
/// Every successful `store()` bumps the version, which transactions use to
/// detect that a table changed underneath their staged copy.
#[derive(Debug)]
pub struct AtomicRows {
    /// Atomic reference-counted rows for lock-free swapping
    inner: ArcSwap<Vec<Row>>,
    /// Number of stores published so far
    version: AtomicU64,
    /// Maximum number of rows the table may hold
    max_records: usize,
}

impl AtomicRows {
    /// Creates empty storage with room for `initial_capacity` rows.
    pub fn new(initial_capacity: usize, max_records: usize) -> Self {
        let capacity = initial_capacity.min(max_records);
        Self {
            inner: ArcSwap::new(Arc::new(Vec::with_capacity(capacity))),
            version: AtomicU64::new(0),
            max_records,
        }
    }

    /// Loads the current rows for read access.
    ///
    /// The snapshot stays valid and unchanged while the `Arc` is held, even if
    /// a writer publishes new rows meanwhile.
    pub fn load(&self) -> Arc<Vec<Row>> {
        self.inner.load_full()
    }

    /// Loads and clones the current rows for modification.
    ///
    /// Changes are not visible until `store()` is called.
    pub fn load_full(&self) -> Vec<Row> {
        self.inner.load().as_ref().clone()
    }

    /// Checks that `required` rows fit within the configured limit.
    ///
    /// The returned error carries an empty table name; callers fill it in.
    pub fn ensure_capacity(&self, required: usize) -> Result<(), DbError> {
        if required > self.max_records {
            return Err(DbError::CapacityExceeded {
                table: String::new(),
                requested: required,
                limit: self.max_records,
            });
        }
        Ok(())
    }

    /// Atomically publishes a new row vector.
    pub fn store(&self, rows: Vec<Row>) -> Result<(), DbError> {
        self.ensure_capacity(rows.len())?;
        self.inner.store(Arc::new(rows));
        self.version.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    /// Returns the number of stores published so far.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Returns the number of rows currently published.
    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    /// Returns `true` if no rows are published.
    pub fn is_empty(&self) -> bool {
        self.inner.load().is_empty()
    }

    /// Returns the configured row limit.
    pub fn max_records(&self) -> usize {
        self.max_records
    }
}
