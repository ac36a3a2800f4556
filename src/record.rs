//! Generic record layer shared by every library entity.
//!
//! An entity declares its [`Schema`] and how to map an ordered row to and
//! from its fields. Everything else (insert, select, filter, search, update
//! and delete) is provided here and by [`crate::search`].
//!
//! A [`Record`] wraps an entity together with the primary-key values it was
//! loaded or last persisted with. `update` addresses the row through that
//! snapshot, so a caller may change the entity's own key fields and still
//! reach the stored row.

use std::fmt;
use std::ops::{Deref, DerefMut};

use tracing::debug;

use crate::error::{LibraryError, Result};
use crate::schema::Schema;
use crate::search;
use crate::sqlite::{Database, Row};
use crate::statement::{self, SqlQuery};
use crate::value::{FromValue, Key, Value};

/// Positional reader over one row, handed to [`Entity::from_values`].
pub struct Values {
    schema: Schema,
    values: std::vec::IntoIter<Value>,
    index: usize,
}

impl Values {
    fn new(schema: Schema, values: Vec<Value>) -> Self {
        Self {
            schema,
            values: values.into_iter(),
            index: 0,
        }
    }

    /// Decode the next column as `T`.
    pub fn take<T: FromValue>(&mut self) -> Result<T> {
        let column = self.schema.columns.get(self.index).copied().unwrap_or("?");
        self.index += 1;
        let value = self.values.next().unwrap_or(Value::Null);
        let found = value.type_name();
        T::from_value(value).ok_or_else(|| LibraryError::Decode {
            table: self.schema.table,
            column,
            expected: T::EXPECTED,
            found: found.to_string(),
        })
    }
}

/// A table-backed type with a static schema.
///
/// `to_values` must return one value per schema column, in schema order,
/// and `from_values` must read them back in the same order.
pub trait Entity: Sized + Clone + fmt::Debug {
    const SCHEMA: Schema;

    fn from_values(values: &mut Values) -> Result<Self>;

    fn to_values(&self) -> Vec<Value>;

    /// Current values of the primary-key columns.
    fn key(&self) -> Vec<Value> {
        let values = self.to_values();
        Self::SCHEMA
            .key_positions()
            .into_iter()
            .map(|i| values[i].clone())
            .collect()
    }

    /// Current value of a named column.
    fn get(&self, column: &str) -> Option<Value> {
        let position = Self::SCHEMA.position(column)?;
        self.to_values().into_iter().nth(position)
    }

    /// Select by key and return the single match, if any.
    ///
    /// A scalar key matches the first column; a composite key of N values
    /// matches the first N columns.
    fn select(db: &Database, key: impl Into<Key>) -> Result<Option<Record<Self>>> {
        Ok(Self::select_many(db, key)?.into_iter().next())
    }

    /// Select by key and return every match.
    fn select_many(db: &Database, key: impl Into<Key>) -> Result<Vec<Record<Self>>> {
        let query = statement::select_prefix(&Self::SCHEMA, key.into())?;
        fetch(db, query)
    }

    /// Select by key, or by an AND of column equalities. Always a list.
    fn filter(db: &Database, filter: Filter) -> Result<Vec<Record<Self>>> {
        match filter.key {
            Some(key) => Self::select_many(db, key),
            None => {
                let query = statement::select_where(&Self::SCHEMA, filter.conditions)?;
                fetch(db, query)
            }
        }
    }

    /// Every row of the table.
    fn select_all(db: &Database) -> Result<Vec<Record<Self>>> {
        db.select_all(&Self::SCHEMA)?.map(Record::from_row).collect()
    }

    /// Tiered search: exact key, then exact attribute, then substring scan.
    fn search(db: &Database, query: &str, attributes: &[&str]) -> Result<Vec<Record<Self>>> {
        search::search(db, query, attributes)
    }
}

fn fetch<E: Entity>(db: &Database, query: SqlQuery) -> Result<Vec<Record<E>>> {
    db.query(&query.statement, &query.params)?
        .map(Record::from_row)
        .collect()
}

/// Build an entity from an ordered row of values.
///
/// Fails when the number of values differs from the number of columns.
pub fn construct<E: Entity>(values: Vec<Value>) -> Result<E> {
    let schema = E::SCHEMA;
    if values.len() != schema.columns.len() {
        return Err(LibraryError::Arity {
            table: schema.table,
            expected: schema.columns.len(),
            got: values.len(),
            columns: schema.columns,
        });
    }
    E::from_values(&mut Values::new(schema, values))
}

/// Equality constraints for [`Entity::filter`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Filter {
    pub key: Option<Key>,
    pub conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(key: impl Into<Key>) -> Self {
        Self {
            key: Some(key.into()),
            conditions: Vec::new(),
        }
    }

    pub fn with_condition(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.conditions.push((column.to_string(), value.into()));
        self
    }
}

/// An entity plus its original-key snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<E: Entity> {
    entity: E,
    original_key: Vec<Value>,
}

impl<E: Entity> Record<E> {
    /// Wrap a freshly built entity; the snapshot is its current key.
    pub fn new(entity: E) -> Self {
        let original_key = entity.key();
        Self {
            entity,
            original_key,
        }
    }

    /// Build a record from positional values, checking arity.
    pub fn from_row(row: Row) -> Result<Self> {
        construct(row).map(Self::new)
    }

    pub fn original_key(&self) -> &[Value] {
        &self.original_key
    }

    /// Whether a key field changed since the record was loaded or updated.
    pub fn key_changed(&self) -> bool {
        self.entity.key() != self.original_key
    }

    pub fn entity(&self) -> &E {
        &self.entity
    }

    pub fn into_entity(self) -> E {
        self.entity
    }

    /// Column/value pairs in schema order.
    pub fn items(&self) -> Vec<(&'static str, Value)> {
        E::SCHEMA
            .columns
            .iter()
            .copied()
            .zip(self.entity.to_values())
            .collect()
    }

    /// Insert, reporting failure as `false`.
    pub fn insert(&self, db: &Database) -> bool {
        let query = statement::insert(&E::SCHEMA, self.entity.to_values());
        db.try_write(&query.statement, &query.params)
    }

    /// Insert, propagating store rejections such as trigger aborts.
    pub fn insert_strict(&self, db: &Database) -> Result<()> {
        let query = statement::insert(&E::SCHEMA, self.entity.to_values());
        db.write(&query.statement, &query.params)?;
        Ok(())
    }

    /// Write every column back to the row addressed by the original key.
    ///
    /// On success the snapshot moves to the current key.
    pub fn update(&mut self, db: &Database) -> bool {
        let query = statement::update(
            &E::SCHEMA,
            self.entity.to_values(),
            self.original_key.clone(),
        );
        let ok = db.try_write(&query.statement, &query.params);
        if ok {
            let key = self.entity.key();
            if key != self.original_key {
                debug!(table = E::SCHEMA.table, "primary key moved on update");
            }
            self.original_key = key;
        }
        ok
    }

    /// Delete the row addressed by the full current key.
    pub fn delete(&self, db: &Database) -> bool {
        let query = statement::delete(&E::SCHEMA, self.entity.key());
        db.try_write(&query.statement, &query.params)
    }
}

impl<E: Entity> From<E> for Record<E> {
    fn from(entity: E) -> Self {
        Self::new(entity)
    }
}

impl<E: Entity> Deref for Record<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.entity
    }
}

impl<E: Entity> DerefMut for Record<E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut self.entity
    }
}

impl<E: Entity> fmt::Display for Record<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (column, value)) in self.items().into_iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{column}: {value}")?;
        }
        Ok(())
    }
}
