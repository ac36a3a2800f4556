//! Tiered search over one entity type.
//!
//! Each tier is tried in order and the first non-empty result wins:
//!
//! 1. [`Strategy::ExactKey`]: the query is the primary key.
//! 2. [`Strategy::ExactAttribute`]: exactly one row has an attribute equal
//!    to the query.
//! 3. [`Strategy::Substring`]: every row whose attribute contains the query,
//!    case-insensitively.
//!
//! Attribute names that are not columns of the entity are skipped.

use tracing::debug;

use crate::error::Result;
use crate::record::{Entity, Filter, Record};
use crate::sqlite::Database;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    ExactKey,
    ExactAttribute,
    Substring,
}

pub const TIERS: [Strategy; 3] = [
    Strategy::ExactKey,
    Strategy::ExactAttribute,
    Strategy::Substring,
];

impl Strategy {
    pub fn run<E: Entity>(
        self,
        db: &Database,
        query: &str,
        attributes: &[&str],
    ) -> Result<Vec<Record<E>>> {
        match self {
            Strategy::ExactKey => exact_key(db, query),
            Strategy::ExactAttribute => exact_attribute(db, query, attributes),
            Strategy::Substring => substring_scan(db, query, attributes),
        }
    }
}

pub fn search<E: Entity>(
    db: &Database,
    query: &str,
    attributes: &[&str],
) -> Result<Vec<Record<E>>> {
    for strategy in TIERS {
        let found = strategy.run::<E>(db, query, attributes)?;
        if !found.is_empty() {
            debug!(table = E::SCHEMA.table, ?strategy, hits = found.len(), "search resolved");
            return Ok(found);
        }
    }
    Ok(Vec::new())
}

/// The row whose key equals `query`, as a one-element list.
pub fn exact_key<E: Entity>(db: &Database, query: &str) -> Result<Vec<Record<E>>> {
    Ok(E::select(db, query)?.into_iter().collect())
}

/// The first attribute, in order, that exactly one row equals.
pub fn exact_attribute<E: Entity>(
    db: &Database,
    query: &str,
    attributes: &[&str],
) -> Result<Vec<Record<E>>> {
    for attribute in attributes {
        if !E::SCHEMA.has_column(attribute) {
            continue;
        }
        let rows = E::filter(db, Filter::new().with_condition(attribute, query))?;
        if rows.len() == 1 {
            return Ok(rows);
        }
    }
    Ok(Vec::new())
}

/// Load the whole table and keep rows matching [`substring_matches`].
pub fn substring_scan<E: Entity>(
    db: &Database,
    query: &str,
    attributes: &[&str],
) -> Result<Vec<Record<E>>> {
    Ok(substring_matches(E::select_all(db)?, query, attributes))
}

/// Rows where any listed attribute contains `query`, ignoring case.
///
/// A row is kept at most once, in input order.
pub fn substring_matches<E: Entity>(
    rows: Vec<Record<E>>,
    query: &str,
    attributes: &[&str],
) -> Vec<Record<E>> {
    let needle = query.to_lowercase();
    rows.into_iter()
        .filter(|row| {
            attributes.iter().any(|attribute| {
                row.get(attribute)
                    .is_some_and(|value| value.to_string().to_lowercase().contains(&needle))
            })
        })
        .collect()
}
