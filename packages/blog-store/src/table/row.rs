//! Stored row.

use crate::types::Value;

/// A persisted row: generated id plus one value per table field.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: u64,
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(id: u64, values: Vec<Value>) -> Self {
        Self { id, values }
    }

    /// Returns the value at field position `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }
}
