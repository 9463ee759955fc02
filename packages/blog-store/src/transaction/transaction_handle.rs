use std::ops::{Deref, DerefMut};

use super::transaction::Transaction;

/// Owned [`Transaction`] that is discarded when dropped uncommitted.
///
/// Staging and commit go through `Deref`/`DerefMut`, so a handle is used
/// exactly like the transaction it wraps. A failed commit leaves the
/// transaction active, and dropping the handle then throws its changes away.
#[derive(Debug, Default)]
pub struct TransactionHandle {
    inner: Transaction,
}

impl TransactionHandle {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Deref for TransactionHandle {
    type Target = Transaction;

    fn deref(&self) -> &Transaction {
        &self.inner
    }
}

impl DerefMut for TransactionHandle {
    fn deref_mut(&mut self) -> &mut Transaction {
        &mut self.inner
    }
}

impl Drop for TransactionHandle {
    fn drop(&mut self) {
        if !self.inner.is_active() {
            return;
        }
        if self.inner.has_staged_changes() {
            tracing::debug!(
                "Discarding uncommitted changes to {} table(s)",
                self.inner.staged_table_count()
            );
        }
        self.inner.abort();
    }
}
