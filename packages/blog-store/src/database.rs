//! Database container managing tables, relations and transactions.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use crate::config::DbConfig;
use crate::error::DbError;
use crate::table::{Condition, Field, Matcher, OnDelete, Predicate, Query, Relation, Row, Table};
use crate::transaction::{Transaction, TransactionHandle};
use crate::types::{FieldType, Value};

/// Database container holding all tables.
///
/// Reads take the table map's read lock and then work on lock-free row
/// snapshots. Every write takes the write lock, so writers are serialized
/// and multi-table commits are never observed half-applied.
#[derive(Debug)]
pub struct Database {
    /// Map of table name to table instance
    tables: RwLock<HashMap<String, Table>>,
    /// Engine configuration
    config: DbConfig,
}

impl Database {
    /// Creates a new empty database with default configuration.
    pub fn new() -> Self {
        Self::with_config(DbConfig::default())
    }

    /// Creates a new empty database with the given configuration.
    pub fn with_config(config: DbConfig) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Creates a new table with the given name and field definitions.
    pub fn create_table(&self, name: String, fields: Vec<Field>) -> Result<(), DbError> {
        let mut tables = self.tables.write().map_err(|_| DbError::LockPoisoned)?;
        if tables.contains_key(&name) {
            return Err(DbError::TableAlreadyExists(name));
        }
        let table = Table::create(
            name.clone(),
            fields,
            Some(self.config.initial_table_capacity),
            self.config.max_records_per_table,
        )?;
        tracing::info!("Creating table {} with {} fields", name, table.fields.len());
        tables.insert(name, table);
        Ok(())
    }

    /// Declares a relation from `table` to another table.
    ///
    /// The source field must exist and hold `u64` row ids. The relation name
    /// must not collide with another relation of the same table.
    pub fn add_relation(&self, table: &str, relation: Relation) -> Result<(), DbError> {
        let mut tables = self.tables.write().map_err(|_| DbError::LockPoisoned)?;
        if !tables.contains_key(&relation.to_table) {
            return Err(DbError::TableNotFound {
                table: relation.to_table.clone(),
            });
        }
        let source = tables
            .get_mut(table)
            .ok_or_else(|| DbError::TableNotFound {
                table: table.to_string(),
            })?;

        let field = source
            .get_field(&relation.from_field)
            .ok_or_else(|| DbError::FieldNotFound {
                table: table.to_string(),
                field: relation.from_field.clone(),
            })?;
        if field.field_type != FieldType::U64 {
            return Err(DbError::TypeMismatch {
                expected: format!("u64 for relation field '{}'", field.name),
                got: field.field_type.to_string(),
            });
        }
        if source.relations.iter().any(|r| r.name == relation.name) {
            return Err(DbError::FieldAlreadyExists {
                table: table.to_string(),
                field: relation.name,
            });
        }

        tracing::info!(
            "Adding relation {}.{} -> {} ({:?})",
            table,
            relation.name,
            relation.to_table,
            relation.on_delete
        );
        source.add_relation(relation);
        Ok(())
    }

    /// Returns the number of records in a table.
    pub fn count(&self, table: &str) -> Result<usize, DbError> {
        let tables = self.tables.read().map_err(|_| DbError::LockPoisoned)?;
        Ok(lookup(&tables, table)?.record_count())
    }

    /// Reads a record by id. A missing record is `Ok(None)`.
    pub fn get(&self, table: &str, id: u64) -> Result<Option<Row>, DbError> {
        let tables = self.tables.read().map_err(|_| DbError::LockPoisoned)?;
        Ok(lookup(&tables, table)?.get_record(id))
    }

    /// Inserts a record and returns its id.
    pub fn insert(&self, table: &str, values: Vec<Value>) -> Result<u64, DbError> {
        let tables = self.tables.write().map_err(|_| DbError::LockPoisoned)?;
        let target = lookup(&tables, table)?;
        if self.config.enforce_foreign_keys {
            check_outgoing(&tables, target, &values)?;
        }
        let id = target.create_record(values)?;
        tracing::debug!("Inserted record {} into {}", id, table);
        Ok(id)
    }

    /// Replaces the values of an existing record.
    pub fn update(&self, table: &str, id: u64, values: Vec<Value>) -> Result<(), DbError> {
        let tables = self.tables.write().map_err(|_| DbError::LockPoisoned)?;
        let target = lookup(&tables, table)?;
        if self.config.enforce_foreign_keys {
            check_outgoing(&tables, target, &values)?;
        }
        target.update_record(id, values)?;
        tracing::debug!("Updated record {} in {}", id, table);
        Ok(())
    }

    /// Deletes a record, honoring the delete policy of every relation that
    /// targets its table.
    ///
    /// Rows referencing it through `Cascade` relations are deleted first
    /// (recursively); a referencing row behind a `Restrict` relation aborts
    /// the whole operation. All deletions commit in one transaction.
    ///
    /// # Returns
    /// Total number of rows removed, including the record itself.
    pub fn delete_record(&self, table: &str, id: u64) -> Result<usize, DbError> {
        let tables = self.tables.write().map_err(|_| DbError::LockPoisoned)?;
        let target = lookup(&tables, table)?;
        if !target.contains(id) {
            return Err(DbError::RecordNotFound {
                table: table.to_string(),
                id,
            });
        }

        let mut handle = TransactionHandle::new();
        let mut visiting = HashSet::new();
        let removed = stage_cascade(&tables, &mut handle, target, id, &mut visiting)?;

        let refs = table_refs(&tables);
        if self.config.enforce_foreign_keys {
            check_references(&refs, &handle)?;
        }
        handle.commit(&refs)?;

        tracing::debug!(
            "Deleted record {} from {} ({} row(s) removed)",
            id,
            table,
            removed
        );
        Ok(removed)
    }

    /// Runs a query against a table.
    ///
    /// Predicates on relation paths are resolved into id sets by walking the
    /// relation chain backwards from the last table.
    pub fn query(&self, table: &str, query: &Query) -> Result<Vec<Row>, DbError> {
        let tables = self.tables.read().map_err(|_| DbError::LockPoisoned)?;
        let base = lookup(&tables, table)?;

        let conditions = query
            .predicates
            .iter()
            .map(|predicate| resolve_predicate(&tables, base, predicate))
            .collect::<Result<Vec<_>, _>>()?;

        let rows = base.select(
            &conditions,
            query.order.as_ref(),
            query.limit,
            query.offset,
        )?;
        tracing::debug!(
            "Query on {} with {} predicate(s) returned {} row(s)",
            table,
            conditions.len(),
            rows.len()
        );
        Ok(rows)
    }

    /// Starts a new transaction.
    pub fn begin_transaction(&self) -> TransactionHandle {
        TransactionHandle::new()
    }

    /// Stages a record creation in `tx`.
    ///
    /// # Returns
    /// The id the record will have once the transaction commits.
    pub fn stage_create(
        &self,
        tx: &mut TransactionHandle,
        table: &str,
        values: Vec<Value>,
    ) -> Result<u64, DbError> {
        let tables = self.tables.read().map_err(|_| DbError::LockPoisoned)?;
        let target = lookup(&tables, table)?;
        tx.stage_create(target, values)
    }

    /// Stages a record update in `tx`.
    pub fn stage_update(
        &self,
        tx: &mut TransactionHandle,
        table: &str,
        id: u64,
        values: Vec<Value>,
    ) -> Result<(), DbError> {
        let tables = self.tables.read().map_err(|_| DbError::LockPoisoned)?;
        let target = lookup(&tables, table)?;
        tx.stage_update(target, id, values)
    }

    /// Commits a transaction using this database's tables.
    ///
    /// References of every staged table are verified before anything is
    /// published.
    pub fn commit_transaction(&self, tx: &mut TransactionHandle) -> Result<(), DbError> {
        let tables = self.tables.write().map_err(|_| DbError::LockPoisoned)?;
        let refs = table_refs(&tables);
        if self.config.enforce_foreign_keys {
            check_references(&refs, tx)?;
        }
        tx.commit(&refs)
    }

    /// Removes every record from every table and restarts id sequences.
    ///
    /// # Returns
    /// Total number of records removed.
    pub fn truncate_all(&self) -> Result<usize, DbError> {
        let tables = self.tables.write().map_err(|_| DbError::LockPoisoned)?;
        let mut removed = 0;
        for table in tables.values() {
            removed += table.truncate()?;
        }
        tracing::debug!(
            "Truncated {} table(s), {} record(s) removed",
            tables.len(),
            removed
        );
        Ok(removed)
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

fn lookup<'a>(tables: &'a HashMap<String, Table>, name: &str) -> Result<&'a Table, DbError> {
    tables.get(name).ok_or_else(|| DbError::TableNotFound {
        table: name.to_string(),
    })
}

fn table_refs(tables: &HashMap<String, Table>) -> HashMap<String, &Table> {
    tables
        .iter()
        .map(|(name, table)| (name.clone(), table))
        .collect()
}

/// Builds an equality condition on a field of `table`, checking the type.
fn equality(table: &Table, field: &str, value: &Value) -> Result<Condition, DbError> {
    let column = table.column(field)?;
    if let Some(definition) = table.get_field(field) {
        if let Some(actual) = value.field_type() {
            if actual != definition.field_type {
                return Err(DbError::TypeMismatch {
                    expected: format!("{} for field '{}'", definition.field_type, field),
                    got: actual.to_string(),
                });
            }
        }
    }
    Ok(Condition {
        column,
        matcher: Matcher::Eq(value.clone()),
    })
}

fn resolve_predicate(
    tables: &HashMap<String, Table>,
    base: &Table,
    predicate: &Predicate,
) -> Result<Condition, DbError> {
    let (hops, field) = predicate.split_path();
    if hops.is_empty() {
        return equality(base, field, &predicate.value);
    }

    // Walk forward: (source table, relation) per hop
    let mut chain: Vec<(&Table, &Relation)> = Vec::with_capacity(hops.len());
    let mut current = base;
    for hop in hops {
        let relation = current.relation(hop)?;
        chain.push((current, relation));
        current = lookup(tables, &relation.to_table)?;
    }

    // Walk back from the last table, narrowing to ids
    let mut ids = current.matching_ids(&[equality(current, field, &predicate.value)?]);
    for (table, relation) in chain.iter().skip(1).rev() {
        let column = table.column(&relation.from_field)?;
        ids = table.matching_ids(&[Condition {
            column,
            matcher: Matcher::In(ids),
        }]);
    }

    let (_, first) = chain[0];
    Ok(Condition {
        column: base.column(&first.from_field)?,
        matcher: Matcher::In(ids),
    })
}

/// Verifies that the reference fields of `values` point at existing rows.
fn check_outgoing(
    tables: &HashMap<String, Table>,
    source: &Table,
    values: &[Value],
) -> Result<(), DbError> {
    for relation in &source.relations {
        let index = source.field_index(&relation.from_field)?;
        let Some(target_id) = values.get(index).and_then(Value::as_u64) else {
            continue;
        };
        if !lookup(tables, &relation.to_table)?.contains(target_id) {
            tracing::warn!(
                "Rejected {}.{} = {}: no such row in {}",
                source.name,
                relation.from_field,
                target_id,
                relation.to_table
            );
            return Err(DbError::IntegrityViolation {
                table: source.name.clone(),
                field: relation.from_field.clone(),
                reason: format!("{} row {} does not exist", relation.to_table, target_id),
            });
        }
    }
    Ok(())
}

/// Ids visible to a transaction: its staged copy, or the published rows.
fn visible_ids(table: &Table, tx: &Transaction) -> HashSet<u64> {
    match tx.staged(&table.name) {
        Some(buffer) => buffer.rows.iter().map(|row| row.id).collect(),
        None => table.snapshot().iter().map(|row| row.id).collect(),
    }
}

/// Verifies every relation touching a staged table, as the tables would
/// look after commit.
fn check_references(tables: &HashMap<String, &Table>, tx: &Transaction) -> Result<(), DbError> {
    for source in tables.values() {
        for relation in &source.relations {
            let touched = tx.staged(&source.name).is_some_and(|b| b.has_changes())
                || tx.staged(&relation.to_table).is_some_and(|b| b.has_changes());
            if !touched {
                continue;
            }

            let target = tables
                .get(&relation.to_table)
                .ok_or_else(|| DbError::TableNotFound {
                    table: relation.to_table.clone(),
                })?;
            let target_ids = visible_ids(target, tx);
            let index = source.field_index(&relation.from_field)?;

            let snapshot;
            let rows: &[Row] = match tx.staged(&source.name) {
                Some(buffer) => buffer.rows.as_slice(),
                None => {
                    snapshot = source.snapshot();
                    snapshot.as_slice()
                }
            };

            let dangling = rows.iter().find(|row| {
                row.get(index)
                    .and_then(Value::as_u64)
                    .is_some_and(|id| !target_ids.contains(&id))
            });
            if let Some(row) = dangling {
                tracing::warn!(
                    "Rejected commit: {} row {} references missing {} row",
                    source.name,
                    row.id,
                    relation.to_table
                );
                return Err(DbError::IntegrityViolation {
                    table: source.name.clone(),
                    field: relation.from_field.clone(),
                    reason: format!(
                        "row {} references a missing {} row",
                        row.id, relation.to_table
                    ),
                });
            }
        }
    }
    Ok(())
}

/// Ids of rows in `child` whose `field_index` holds `parent_id`, as visible to `tx`.
fn referencing_ids(child: &Table, tx: &Transaction, field_index: usize, parent_id: u64) -> Vec<u64> {
    let parent = Value::U64(parent_id);
    let snapshot;
    let rows: &[Row] = match tx.staged(&child.name) {
        Some(buffer) => buffer.rows.as_slice(),
        None => {
            snapshot = child.snapshot();
            snapshot.as_slice()
        }
    };
    rows.iter()
        .filter(|row| row.get(field_index) == Some(&parent))
        .map(|row| row.id)
        .collect()
}

/// Stages deletion of a row and, first, of everything that references it.
fn stage_cascade(
    tables: &HashMap<String, Table>,
    tx: &mut Transaction,
    table: &Table,
    id: u64,
    visiting: &mut HashSet<(String, u64)>,
) -> Result<usize, DbError> {
    if !visiting.insert((table.name.clone(), id)) {
        return Ok(0);
    }

    let mut removed = 0;
    for child in tables.values() {
        for relation in child.relations.iter().filter(|r| r.to_table == table.name) {
            let index = child.field_index(&relation.from_field)?;
            let child_ids: Vec<u64> = referencing_ids(child, tx, index, id)
                .into_iter()
                .filter(|child_id| !visiting.contains(&(child.name.clone(), *child_id)))
                .collect();
            if child_ids.is_empty() {
                continue;
            }

            match relation.on_delete {
                OnDelete::Restrict => {
                    tracing::warn!(
                        "Refusing to delete {} row {}: referenced by {} {} row(s)",
                        table.name,
                        id,
                        child_ids.len(),
                        child.name
                    );
                    return Err(DbError::IntegrityViolation {
                        table: child.name.clone(),
                        field: relation.from_field.clone(),
                        reason: format!(
                            "{} row {} is still referenced by {} row(s)",
                            table.name,
                            id,
                            child_ids.len()
                        ),
                    });
                }
                OnDelete::Cascade => {
                    for child_id in child_ids {
                        removed += stage_cascade(tables, tx, child, child_id, visiting)?;
                    }
                }
            }
        }
    }

    tx.stage_delete(table, id)?;
    Ok(removed + 1)
}
