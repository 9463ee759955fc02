//! Relation between tables for foreign key references.

/// What happens to referencing rows when the referenced row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    /// Delete referencing rows along with the target
    Cascade,
    /// Refuse to delete a target that is still referenced
    Restrict,
}

/// Relation between tables for foreign key references.
///
/// The source field holds the id of a row in the target table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// Relation name, used as a path segment in queries (e.g. `author`)
    pub name: String,
    /// Field name in source table holding the target row id
    pub from_field: String,
    /// Name of the target table
    pub to_table: String,
    /// Delete policy
    pub on_delete: OnDelete,
}

impl Relation {
    pub fn new(name: String, from_field: String, to_table: String, on_delete: OnDelete) -> Self {
        Self {
            name,
            from_field,
            to_table,
            on_delete,
        }
    }
}
