//! Error types for the record gateway.
//!
//! Argument errors are raised locally before any statement reaches the
//! store. Store failures are split into constraint rejections (surfaced to
//! callers that retry with corrected input) and everything else.

use rusqlite::ErrorCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LibraryError>;

#[derive(Error, Debug)]
pub enum LibraryError {
    /// The initial connection could not be established. Fatal at startup.
    #[error("could not connect to database at {path}: {source}")]
    Connectivity {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A constraint or trigger rejected the statement.
    #[error("rejected by the store: {message}")]
    Constraint {
        message: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("{table} expects {expected} values, got {got} (columns: {columns:?})")]
    Arity {
        table: &'static str,
        expected: usize,
        got: usize,
        columns: &'static [&'static str],
    },

    #[error("{table}: filter needs a key or at least one attribute")]
    EmptyFilter { table: &'static str },

    #[error("{table}: key must carry at least one value")]
    EmptyKey { table: &'static str },

    #[error("{table}: key has {got} values but the table only has {max} columns")]
    KeyTooLong {
        table: &'static str,
        got: usize,
        max: usize,
    },

    #[error("{table} has no column named '{column}'")]
    UnknownColumn { table: &'static str, column: String },

    #[error("{table}.{column}: expected {expected}, found {found}")]
    Decode {
        table: &'static str,
        column: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("user {registration} has no profile record")]
    MissingProfile { registration: String },

    #[error("invalid schema for {table}: {reason}")]
    InvalidSchema { table: &'static str, reason: String },

    #[error("unknown user kind '{value}'")]
    UnknownUserKind { value: String },
}

impl LibraryError {
    /// Classify a failure raised while executing or committing a write.
    pub fn from_write(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, message)
                if code.code == ErrorCode::ConstraintViolation =>
            {
                let message = message.clone().unwrap_or_else(|| code.to_string());
                Self::Constraint {
                    message,
                    source: err,
                }
            }
            _ => Self::Database(err),
        }
    }

    pub fn is_constraint_rejection(&self) -> bool {
        matches!(self, Self::Constraint { .. })
    }

    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            Self::Arity { .. }
                | Self::EmptyFilter { .. }
                | Self::EmptyKey { .. }
                | Self::KeyTooLong { .. }
                | Self::UnknownColumn { .. }
                | Self::UnknownUserKind { .. }
        )
    }

    /// Short label used when a recovered failure is logged.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connectivity { .. } => "connectivity",
            Self::Constraint { .. } => "constraint",
            Self::Database(_) => "database",
            Self::Decode { .. } => "decode",
            Self::MissingProfile { .. } => "missing_profile",
            Self::InvalidSchema { .. } => "schema",
            _ => "argument",
        }
    }
}
