//! SQLite record gateway for the library management terminal.
//!
//! # Intention
//!
//! - Provide one generic record layer that every library entity (users,
//!   books, loans, reservations, ...) specializes through a static schema.
//! - Keep a single connection per process, injected as a [`Database`] handle.
//! - Offer two write policies: [`Database::try_write`] swallows and rolls
//!   back failures, [`Database::write`] propagates them.
//!
//! # Architectural Boundaries
//!
//! - Only record mapping and SQLite code belongs here.
//! - No terminal screens, input validation or reporting views.
//! - Synchronous and single-threaded; no multi-statement transactions.

pub mod auth;
pub mod config;
pub mod error;
pub mod migrations;
pub mod models;
pub mod record;
pub mod schema;
pub mod search;
pub mod sqlite;
pub mod statement;
pub mod value;

pub use config::DatabaseConfig;
pub use error::{LibraryError, Result};
pub use record::{construct, Entity, Filter, Record, Values};
pub use schema::Schema;
pub use sqlite::{Database, Row};
pub use value::{FromValue, Key, Value};
