//! Database configuration, loaded from TOML.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const IN_MEMORY: &str = ":memory:";

/// Connection settings for the library database.
///
/// Accepts either the bare keys or a `[database]` table:
///
/// ```toml
/// [database]
/// path = "library.db"
/// foreign_keys = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file, or `:memory:`.
    pub path: PathBuf,
    #[serde(default = "default_true")]
    pub foreign_keys: bool,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Create the library tables on first connect when missing.
    #[serde(default = "default_true")]
    pub apply_schema: bool,
}

#[derive(Deserialize)]
struct ConfigFile {
    database: DatabaseConfig,
}

fn default_true() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new("library.db")
    }
}

impl DatabaseConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            foreign_keys: true,
            busy_timeout_ms: default_busy_timeout_ms(),
            apply_schema: true,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(IN_MEMORY)
    }

    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == IN_MEMORY
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(text).context("invalid TOML")?;
        if table.contains_key("database") {
            let file: ConfigFile = toml::from_str(text).context("invalid [database] table")?;
            Ok(file.database)
        } else {
            toml::from_str(text).context("invalid database config")
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("failed to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn bare_keys_use_defaults() {
        let config = DatabaseConfig::from_toml_str(r#"path = "lib.db""#).unwrap();
        assert_eq!(config, DatabaseConfig::new("lib.db"));
        assert_eq!(config.busy_timeout_ms, 5_000);
    }

    #[test]
    fn database_table_is_accepted() {
        let config = DatabaseConfig::from_toml_str(
            r#"
            [database]
            path = ":memory:"
            foreign_keys = false
            apply_schema = false
            "#,
        )
        .unwrap();
        assert!(config.is_in_memory());
        assert!(!config.foreign_keys);
        assert!(!config.apply_schema);
    }

    #[test]
    fn missing_path_is_an_error() {
        assert!(DatabaseConfig::from_toml_str("foreign_keys = true").is_err());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "path = \"/tmp/library.db\"\nbusy_timeout_ms = 250").unwrap();
        let config = DatabaseConfig::load(file.path()).unwrap();
        assert_eq!(config.path, PathBuf::from("/tmp/library.db"));
        assert_eq!(config.busy_timeout_ms, 250);

        let err = DatabaseConfig::load("/nonexistent/library.toml").unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}
