//! Static per-entity table metadata.

use crate::error::{LibraryError, Result};

/// Table identifier, ordered columns and primary-key columns of one entity.
///
/// Declared as an associated `const` on each entity, so every identifier
/// interpolated into a statement comes from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub table: &'static str,
    pub columns: &'static [&'static str],
    pub primary_key: &'static [&'static str],
}

impl Schema {
    pub const fn new(
        table: &'static str,
        columns: &'static [&'static str],
        primary_key: &'static [&'static str],
    ) -> Self {
        Self {
            table,
            columns,
            primary_key,
        }
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.position(column).is_some()
    }

    /// Positions of the primary-key columns, in primary-key order.
    pub fn key_positions(&self) -> Vec<usize> {
        self.primary_key
            .iter()
            .filter_map(|k| self.position(k))
            .collect()
    }

    /// Checks that the primary key is non-empty, has no duplicates and only
    /// names declared columns.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| LibraryError::InvalidSchema {
            table: self.table,
            reason,
        };
        if self.columns.is_empty() {
            return Err(invalid("no columns declared".to_string()));
        }
        if self.primary_key.is_empty() {
            return Err(invalid("no primary key declared".to_string()));
        }
        for (i, key) in self.primary_key.iter().enumerate() {
            if !self.has_column(key) {
                return Err(invalid(format!("primary key column '{key}' is not a column")));
            }
            if self.primary_key[..i].contains(key) {
                return Err(invalid(format!("primary key column '{key}' repeated")));
            }
        }
        Ok(())
    }
}
