//! Connection manager: one lazily opened SQLite connection per handle.
//!
//! Callers construct a single [`Database`] at startup and pass `&Database`
//! to every record operation. The connection is opened on first use and
//! reused until [`Database::close`] consumes the handle.

use std::time::Duration;

use once_cell::unsync::OnceCell;
use rusqlite::{params_from_iter, Connection};
use tracing::{debug, error, info, warn};

use crate::config::DatabaseConfig;
use crate::error::{LibraryError, Result};
use crate::migrations;
use crate::schema::Schema;
use crate::statement;
use crate::value::Value;

/// One result row, values in statement column order.
pub type Row = Vec<Value>;

/// Single-pass iterator over the rows of a read.
pub type Rows = std::vec::IntoIter<Row>;

pub struct Database {
    config: DatabaseConfig,
    conn: OnceCell<Connection>,
}

impl Database {
    /// Create an unconnected handle. Nothing touches the store until the
    /// first operation.
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            conn: OnceCell::new(),
        }
    }

    /// Create a handle and connect immediately.
    pub fn open(config: DatabaseConfig) -> Result<Self> {
        let db = Self::new(config);
        db.connect()?;
        Ok(db)
    }

    /// Open an in-memory database with the library schema applied.
    pub fn open_in_memory() -> Result<Self> {
        Self::open(DatabaseConfig::in_memory())
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.conn.get().is_some()
    }

    /// Return the shared connection, opening it on the first call.
    ///
    /// Once established the connection is never reopened.
    pub fn connect(&self) -> Result<&Connection> {
        self.conn.get_or_try_init(|| self.establish())
    }

    /// Attempt [`connect`](Self::connect), reporting failure as `false`.
    pub fn try_connect(&self) -> bool {
        match self.connect() {
            Ok(_) => true,
            Err(e) => {
                error!("Database::try_connect: {}", e);
                false
            }
        }
    }

    /// Open the connection and prepare it for use.
    ///
    /// Failures to open the file or set pragmas are [`LibraryError::Connectivity`].
    /// A schema that cannot be applied to a reachable store is reported as
    /// [`LibraryError::Database`].
    fn establish(&self) -> Result<Connection> {
        let path = self.config.path.display().to_string();
        let connectivity = |source| LibraryError::Connectivity {
            path: path.clone(),
            source,
        };

        let conn = if self.config.is_in_memory() {
            Connection::open_in_memory()
        } else {
            Connection::open(&self.config.path)
        }
        .map_err(connectivity)?;

        conn.busy_timeout(Duration::from_millis(self.config.busy_timeout_ms))
            .map_err(connectivity)?;
        if self.config.foreign_keys {
            conn.execute_batch("PRAGMA foreign_keys = ON;")
                .map_err(connectivity)?;
        }
        if self.config.apply_schema {
            migrations::apply(&conn)?;
        }

        info!("connected to database at {}", path);
        Ok(conn)
    }

    /// Run a read-only statement and return its rows.
    ///
    /// The cursor is drained before returning, so the iterator may be held
    /// while further writes go through the same connection.
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<Rows> {
        debug!(sql, params = params.len(), "query");
        let conn = self.connect()?;
        let mut stmt = conn.prepare(sql)?;
        let width = stmt.column_count();
        let mut cursor = stmt.query(params_from_iter(params.iter()))?;

        let mut rows = Vec::new();
        while let Some(row) = cursor.next()? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(Value::from_sql_ref(row.get_ref(i)?));
            }
            rows.push(values);
        }
        Ok(rows.into_iter())
    }

    /// Run a read and return its first row, if any.
    pub fn first_result(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        Ok(self.query(sql, params)?.next())
    }

    /// Every row of the table described by `schema`, in column order.
    pub fn select_all(&self, schema: &Schema) -> Result<Rows> {
        let query = statement::select_all(schema);
        self.query(&query.statement, &query.params)
    }

    /// Execute and commit a write, propagating any failure.
    ///
    /// The write is rolled back before the error is returned. Constraint and
    /// trigger rejections come back as [`LibraryError::Constraint`].
    pub fn write(&self, sql: &str, params: &[Value]) -> Result<usize> {
        debug!(sql, params = params.len(), "write");
        let conn = self.connect()?;
        let tx = conn.unchecked_transaction()?;
        let changed = tx
            .execute(sql, params_from_iter(params.iter()))
            .map_err(LibraryError::from_write)?;
        tx.commit().map_err(LibraryError::from_write)?;
        Ok(changed)
    }

    /// Execute and commit a write, converting any failure into `false`.
    ///
    /// The failure is rolled back and logged; its cause is not returned.
    pub fn try_write(&self, sql: &str, params: &[Value]) -> bool {
        match self.write(sql, params) {
            Ok(_) => true,
            Err(e) => {
                warn!(kind = e.kind(), "Database::try_write: {}", e);
                false
            }
        }
    }

    /// Release the connection. The handle cannot be used afterwards.
    pub fn close(self) -> Result<()> {
        if let Some(conn) = self.conn.into_inner() {
            conn.close().map_err(|(_, e)| LibraryError::Database(e))?;
            info!("database connection closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch() -> Database {
        let mut config = DatabaseConfig::in_memory();
        config.apply_schema = false;
        let db = Database::open(config).unwrap();
        db.write("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT NOT NULL)", &[])
            .unwrap();
        db
    }

    #[test]
    fn connection_is_lazy_and_reused() {
        let db = Database::new(DatabaseConfig::in_memory());
        assert!(!db.is_connected());
        let first = db.connect().unwrap() as *const Connection;
        let second = db.connect().unwrap() as *const Connection;
        assert_eq!(first, second);
        assert!(db.is_connected());
    }

    #[test]
    fn try_connect_reports_failure() {
        let db = Database::new(DatabaseConfig::new("/nonexistent-dir/sub/library.db"));
        assert!(!db.try_connect());
        assert!(!db.is_connected());
    }

    #[test]
    fn open_reports_connectivity_failure() {
        let Err(err) = Database::open(DatabaseConfig::new("/nonexistent-dir/sub/library.db")) else {
            panic!("opening under a missing directory should fail");
        };
        assert!(matches!(err, LibraryError::Connectivity { ref path, .. } if path.contains("sub")));
        assert_eq!(err.kind(), "connectivity");
    }

    #[test]
    fn schema_conflict_is_a_database_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        Connection::open(file.path())
            .unwrap()
            .execute_batch("CREATE VIEW loans AS SELECT 1 AS isbn;")
            .unwrap();

        let Err(err) = Database::open(DatabaseConfig::new(file.path())) else {
            panic!("an index on a view should be refused");
        };
        assert!(matches!(err, LibraryError::Database(_)));
        assert_eq!(err.kind(), "database");
    }

    #[test]
    fn select_all_reads_rows_by_schema() {
        let db = scratch();
        db.write("INSERT INTO t (id, name) VALUES (?, ?)", &[7.into(), "g".into()]).unwrap();
        let schema = Schema::new("t", &["name", "id"], &["id"]);
        let rows: Vec<Row> = db.select_all(&schema).unwrap().collect();
        assert_eq!(rows, vec![vec![Value::from("g"), Value::Integer(7)]]);
    }

    #[test]
    fn query_and_first_result() {
        let db = scratch();
        assert!(db.try_write("INSERT INTO t (id, name) VALUES (?, ?)", &[1.into(), "a".into()]));
        assert!(db.try_write("INSERT INTO t (id, name) VALUES (?, ?)", &[2.into(), "b".into()]));

        let rows: Vec<Row> = db.query("SELECT id, name FROM t ORDER BY id", &[]).unwrap().collect();
        assert_eq!(
            rows,
            vec![
                vec![Value::Integer(1), "a".into()],
                vec![Value::Integer(2), "b".into()],
            ]
        );

        let first = db.first_result("SELECT name FROM t WHERE id=?", &[2.into()]).unwrap();
        assert_eq!(first, Some(vec![Value::from("b")]));
        assert_eq!(db.first_result("SELECT name FROM t WHERE id=?", &[9.into()]).unwrap(), None);
    }

    #[test]
    fn try_write_rolls_back_and_returns_false() {
        let db = scratch();
        assert!(db.try_write("INSERT INTO t (id, name) VALUES (?, ?)", &[1.into(), "a".into()]));
        assert!(!db.try_write("INSERT INTO t (id, name) VALUES (?, ?)", &[1.into(), "dup".into()]));
        assert!(!db.try_write("INSERT INTO t (id, name) VALUES (?, ?)", &[3.into(), Value::Null]));

        let rows: Vec<Row> = db.query("SELECT name FROM t", &[]).unwrap().collect();
        assert_eq!(rows, vec![vec![Value::from("a")]]);
    }

    #[test]
    fn write_propagates_constraint_rejection() {
        let db = scratch();
        db.write("INSERT INTO t (id, name) VALUES (?, ?)", &[1.into(), "a".into()]).unwrap();
        let err = db
            .write("INSERT INTO t (id, name) VALUES (?, ?)", &[1.into(), "dup".into()])
            .unwrap_err();
        assert!(err.is_constraint_rejection());

        let err = db.write("INSERT INTO missing VALUES (1)", &[]).unwrap_err();
        assert!(!err.is_constraint_rejection());
    }

    #[test]
    fn close_consumes_handle() {
        let db = scratch();
        db.close().unwrap();
        Database::new(DatabaseConfig::in_memory()).close().unwrap();
    }
}
