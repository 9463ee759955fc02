//! Field definition within a table.

use crate::types::FieldType;

/// Field definition within a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name
    pub name: String,
    /// Storage type
    pub field_type: FieldType,
    /// Whether `Value::Null` is accepted
    pub nullable: bool,
    /// Whether values must be distinct across all rows
    pub unique: bool,
}

impl Field {
    /// Creates a new non-nullable, non-unique field.
    pub fn new(name: String, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            nullable: false,
            unique: false,
        }
    }

    /// Marks the field as unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Marks the field as nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}
