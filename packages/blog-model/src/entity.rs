//! Persistence contract shared by users, posts and comments, and the typed
//! query handle built on it.

use std::marker::PhantomData;

use blog_store::table::{self, Direction, Predicate, Row};
use blog_store::transaction::TransactionHandle;
use blog_store::types::Value;
use blog_store::DbError;
use chrono::{DateTime, Utc};

use crate::Blog;

/// Id reported for entities that were never saved. The store starts every
/// sequence at 1, so no row ever has it.
pub const UNSAVED_ID: u64 = 0;

/// Field an entity can be ordered by.
pub trait OrderField: Copy {
    /// Column name in the entity's table.
    fn field(&self) -> &'static str;
}

/// A record type stored in one table of the blog.
pub trait Entity: Sized + Clone {
    /// Backing table.
    const TABLE: &'static str;

    /// Named equality filters for [`Entity::find`].
    type Filter: Into<Predicate>;

    /// Orderable fields for [`Query::order_by`].
    type Order: OrderField;

    fn id(&self) -> Option<u64>;

    fn set_id(&mut self, id: u64);

    /// Row values in schema column order.
    fn to_values(&self) -> Vec<Value>;

    fn from_row(row: &Row) -> Result<Self, DbError>;

    /// Rejects entities that cannot be written, such as a post without an
    /// author.
    fn validate(&self) -> Result<(), DbError> {
        Ok(())
    }

    /// Copy of the entity as its first insert writes it, with
    /// store-assigned fields filled in. `self` is left as it was.
    fn prepared_for_insert(&self, _blog: &Blog) -> Self {
        self.clone()
    }

    /// Id of the persisted row, or `RecordNotFound` for an unsaved entity.
    fn persisted_id(&self) -> Result<u64, DbError> {
        self.id().ok_or_else(|| DbError::RecordNotFound {
            table: Self::TABLE.to_string(),
            id: UNSAVED_ID,
        })
    }

    /// Inserts the entity, or updates it when it already has an id.
    ///
    /// On insert the generated id and stamped fields are written back into
    /// `self`, only once the store accepted the row.
    fn save(&mut self, blog: &Blog) -> Result<(), DbError> {
        self.validate()?;
        match self.id() {
            Some(id) => blog.database().update(Self::TABLE, id, self.to_values()),
            None => {
                let mut inserted = self.prepared_for_insert(blog);
                let id = blog.database().insert(Self::TABLE, inserted.to_values())?;
                inserted.set_id(id);
                *self = inserted;
                Ok(())
            }
        }
    }

    /// Deletes the entity together with everything that cascades from it.
    fn delete(self, blog: &Blog) -> Result<(), DbError> {
        let id = self.persisted_id()?;
        let removed = blog.database().delete_record(Self::TABLE, id)?;
        tracing::debug!("Deleted {} {} and {} dependent row(s)", Self::TABLE, id, removed - 1);
        Ok(())
    }

    /// Number of persisted entities of this type.
    fn count(blog: &Blog) -> Result<u64, DbError> {
        Ok(blog.database().count(Self::TABLE)? as u64)
    }

    fn find_by_id(blog: &Blog, id: u64) -> Result<Option<Self>, DbError> {
        blog.database()
            .get(Self::TABLE, id)?
            .map(|row| Self::from_row(&row))
            .transpose()
    }

    /// Query handle restricted by one named filter.
    fn find(blog: &Blog, filter: Self::Filter) -> Query<'_, Self> {
        Self::all(blog).filter(filter)
    }

    /// Unfiltered query handle.
    fn all(blog: &Blog) -> Query<'_, Self> {
        Query::new(blog)
    }

    /// Stages the insert of an unsaved entity in `tx`.
    ///
    /// Returns the entity as it will be stored, carrying the id it gets once
    /// `tx` commits. `self` is not touched.
    fn stage_insert(&self, blog: &Blog, tx: &mut TransactionHandle) -> Result<Self, DbError> {
        self.validate()?;
        let mut staged = self.prepared_for_insert(blog);
        let id = blog
            .database()
            .stage_create(tx, Self::TABLE, staged.to_values())?;
        staged.set_id(id);
        Ok(staged)
    }

    /// Saves every entity in a single transaction.
    ///
    /// Unsaved entities are inserted; persisted ones are updated. Ids and
    /// stamped fields reach `entities` only after the commit succeeds, and on
    /// error neither the store nor `entities` change.
    fn insert_all(blog: &Blog, entities: &mut [Self]) -> Result<(), DbError> {
        let db = blog.database();
        let mut tx = db.begin_transaction();
        let mut staged = Vec::with_capacity(entities.len());

        for entity in entities.iter() {
            match entity.id() {
                Some(id) => {
                    entity.validate()?;
                    db.stage_update(&mut tx, Self::TABLE, id, entity.to_values())?;
                    staged.push(entity.clone());
                }
                None => staged.push(entity.stage_insert(blog, &mut tx)?),
            }
        }
        db.commit_transaction(&mut tx)?;

        for (entity, stored) in entities.iter_mut().zip(staged) {
            *entity = stored;
        }
        tracing::debug!("Saved {} {} in one transaction", entities.len(), Self::TABLE);
        Ok(())
    }
}

/// Lazy, restartable query over one entity type.
///
/// Nothing runs until a terminal call. Terminals borrow the handle, so the
/// same handle can be run again and sees the store as it is at that time.
pub struct Query<'a, E: Entity> {
    blog: &'a Blog,
    query: table::Query,
    entity: PhantomData<fn() -> E>,
}

impl<'a, E: Entity> Query<'a, E> {
    fn new(blog: &'a Blog) -> Self {
        Self {
            blog,
            query: table::Query::new(),
            entity: PhantomData,
        }
    }

    /// Adds a filter, AND-ed with the previous ones.
    pub fn filter(mut self, filter: E::Filter) -> Self {
        self.query = self.query.filter(filter.into());
        self
    }

    /// Sorts by `order`. Equal keys keep insertion order.
    pub fn order_by(mut self, order: E::Order, direction: Direction) -> Self {
        self.query = self.query.order_by(order.field(), direction);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.query = self.query.limit(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.query = self.query.offset(offset);
        self
    }

    /// First match, or `None` when nothing matches. A limit of zero on the
    /// handle is kept.
    pub fn first(&self) -> Result<Option<E>, DbError> {
        let limit = self.query.limit.map_or(1, |limit| limit.min(1));
        let query = self.query.clone().limit(limit);
        self.blog
            .database()
            .query(E::TABLE, &query)?
            .first()
            .map(E::from_row)
            .transpose()
    }

    /// All matches, in query order.
    pub fn fetch(&self) -> Result<Vec<E>, DbError> {
        self.blog
            .database()
            .query(E::TABLE, &self.query)?
            .iter()
            .map(E::from_row)
            .collect()
    }

    /// Number of matches, honoring limit and offset.
    pub fn count(&self) -> Result<usize, DbError> {
        Ok(self.blog.database().query(E::TABLE, &self.query)?.len())
    }
}

static NULL: Value = Value::Null;

/// Typed column access for [`Entity::from_row`].
pub(crate) struct RowReader<'r> {
    table: &'static str,
    row: &'r Row,
}

impl<'r> RowReader<'r> {
    pub(crate) fn new(table: &'static str, row: &'r Row) -> Self {
        Self { table, row }
    }

    fn cell(&self, index: usize) -> &'r Value {
        self.row.get(index).unwrap_or(&NULL)
    }

    fn mismatch(&self, index: usize, expected: &str) -> DbError {
        DbError::TypeMismatch {
            expected: format!("{} in column {} of {}", expected, index, self.table),
            got: self.cell(index).type_name().to_string(),
        }
    }

    pub(crate) fn text(&self, index: usize) -> Result<String, DbError> {
        self.cell(index)
            .as_text()
            .map(str::to_string)
            .ok_or_else(|| self.mismatch(index, "text"))
    }

    pub(crate) fn u64(&self, index: usize) -> Result<u64, DbError> {
        self.cell(index)
            .as_u64()
            .ok_or_else(|| self.mismatch(index, "u64"))
    }

    pub(crate) fn bool(&self, index: usize) -> Result<bool, DbError> {
        self.cell(index)
            .as_bool()
            .ok_or_else(|| self.mismatch(index, "bool"))
    }

    pub(crate) fn timestamp(&self, index: usize) -> Result<DateTime<Utc>, DbError> {
        self.cell(index)
            .as_timestamp()
            .ok_or_else(|| self.mismatch(index, "timestamp"))
    }
}
