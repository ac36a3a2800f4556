//! Statement assembly from schema identifiers and bound values.
//!
//! Only table and column names taken from a [`Schema`] are interpolated;
//! every value travels as a `?` parameter.

use crate::error::{LibraryError, Result};
use crate::schema::Schema;
use crate::value::{Key, Value};

/// SQL statement with its bound parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub statement: String,
    pub params: Vec<Value>,
}

impl SqlQuery {
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<Value>) -> Self {
        self.params = params;
        self
    }
}

fn column_list(schema: &Schema) -> String {
    schema.columns.join(",")
}

fn equalities<'a>(columns: impl IntoIterator<Item = &'a str>, separator: &str) -> String {
    columns
        .into_iter()
        .map(|c| format!("{c}=?"))
        .collect::<Vec<_>>()
        .join(separator)
}

/// `INSERT` of every column in schema order.
pub fn insert(schema: &Schema, values: Vec<Value>) -> SqlQuery {
    let placeholders = vec!["?"; schema.columns.len()].join(", ");
    SqlQuery::new(format!(
        "INSERT INTO {} ({}) VALUES ({placeholders})",
        schema.table,
        column_list(schema)
    ))
    .with_params(values)
}

/// `SELECT` matching the first `key.len()` schema columns to the key values.
pub fn select_prefix(schema: &Schema, key: Key) -> Result<SqlQuery> {
    if key.is_empty() {
        return Err(LibraryError::EmptyKey {
            table: schema.table,
        });
    }
    if key.len() > schema.columns.len() {
        return Err(LibraryError::KeyTooLong {
            table: schema.table,
            got: key.len(),
            max: schema.columns.len(),
        });
    }
    let prefix = schema.columns[..key.len()].iter().copied();
    Ok(SqlQuery::new(format!(
        "SELECT {} FROM {} WHERE {}",
        column_list(schema),
        schema.table,
        equalities(prefix, " AND ")
    ))
    .with_params(key.into_values()))
}

/// `SELECT` with an AND of equalities over caller-named columns.
///
/// Column names must belong to the schema.
pub fn select_where(schema: &Schema, conditions: Vec<(String, Value)>) -> Result<SqlQuery> {
    if conditions.is_empty() {
        return Err(LibraryError::EmptyFilter {
            table: schema.table,
        });
    }
    let mut columns = Vec::with_capacity(conditions.len());
    let mut params = Vec::with_capacity(conditions.len());
    for (column, value) in conditions {
        let Some(position) = schema.position(&column) else {
            return Err(LibraryError::UnknownColumn {
                table: schema.table,
                column,
            });
        };
        columns.push(schema.columns[position]);
        params.push(value);
    }
    Ok(SqlQuery::new(format!(
        "SELECT {} FROM {} WHERE {}",
        column_list(schema),
        schema.table,
        equalities(columns, " AND ")
    ))
    .with_params(params))
}

pub fn select_all(schema: &Schema) -> SqlQuery {
    SqlQuery::new(format!("SELECT {} FROM {}", column_list(schema), schema.table))
}

/// `UPDATE` setting every column, addressed by the given primary-key values.
pub fn update(schema: &Schema, values: Vec<Value>, key: Vec<Value>) -> SqlQuery {
    let mut params = values;
    params.extend(key);
    SqlQuery::new(format!(
        "UPDATE {} SET {} WHERE {}",
        schema.table,
        equalities(schema.columns.iter().copied(), ", "),
        equalities(schema.primary_key.iter().copied(), " AND ")
    ))
    .with_params(params)
}

/// `DELETE` addressed by every primary-key column.
pub fn delete(schema: &Schema, key: Vec<Value>) -> SqlQuery {
    SqlQuery::new(format!(
        "DELETE FROM {} WHERE {}",
        schema.table,
        equalities(schema.primary_key.iter().copied(), " AND ")
    ))
    .with_params(key)
}
