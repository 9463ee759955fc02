//! Validation methods for table schema and records.

use std::collections::HashSet;

use super::field::Field;
use super::row::Row;
use crate::error::DbError;
use crate::types::Value;

/// Validates that field names are unique within a table.
pub(crate) fn validate_field_names(table: &str, fields: &[Field]) -> Result<(), DbError> {
    let mut seen_names = HashSet::new();
    for field in fields {
        if !seen_names.insert(field.name.as_str()) {
            return Err(DbError::FieldAlreadyExists {
                table: table.to_string(),
                field: field.name.clone(),
            });
        }
    }
    Ok(())
}

/// Validates a value list against the table schema.
///
/// Checks the value count, each value's type, and nullability.
pub(crate) fn validate_values(fields: &[Field], values: &[Value]) -> Result<(), DbError> {
    if values.len() != fields.len() {
        return Err(DbError::TypeMismatch {
            expected: format!("{} fields", fields.len()),
            got: format!("{} fields", values.len()),
        });
    }

    for (field, value) in fields.iter().zip(values) {
        match value.field_type() {
            None if field.nullable => {}
            Some(t) if t == field.field_type => {}
            _ => {
                return Err(DbError::TypeMismatch {
                    expected: format!("{} for field '{}'", field.field_type, field.name),
                    got: value.type_name().to_string(),
                });
            }
        }
    }

    Ok(())
}

/// Checks unique fields of `values` against existing rows.
///
/// The row with id `exclude_id` (the row being updated) is skipped.
/// Null values never collide.
pub(crate) fn check_unique(
    table: &str,
    fields: &[Field],
    rows: &[Row],
    values: &[Value],
    exclude_id: Option<u64>,
) -> Result<(), DbError> {
    for (index, field) in fields.iter().enumerate() {
        if !field.unique || values[index].is_null() {
            continue;
        }
        let candidate = &values[index];
        let duplicate = rows
            .iter()
            .filter(|row| Some(row.id) != exclude_id)
            .any(|row| row.get(index) == Some(candidate));
        if duplicate {
            tracing::warn!(
                "Rejected duplicate {} for {}.{}",
                candidate,
                table,
                field.name
            );
            return Err(DbError::UniqueViolation {
                table: table.to_string(),
                field: field.name.clone(),
                value: candidate.to_string(),
            });
        }
    }
    Ok(())
}

/// Returns the position of row `id` in an id-ordered row slice.
pub(crate) fn row_position(rows: &[Row], id: u64) -> Option<usize> {
    rows.binary_search_by_key(&id, |row| row.id).ok()
}
