//! Service configuration, read from a JSON file or from `BARCODE_*` environment variables.
use serde::Deserialize;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

pub const DATABASE_VAR: &str = "BARCODE_DATABASE";
pub const SHEET_VAR: &str = "BARCODE_SHEET";
pub const ERROR_AS_NULL_VAR: &str = "BARCODE_ERROR_AS_NULL";
pub const REJECT_OVERLAPS_VAR: &str = "BARCODE_REJECT_OVERLAPS";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {name}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Invalid configuration file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot read configuration file '{0}': {1}")]
    Io(String, std::io::Error),
}

/// Where the range table lives.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Process-local table, lost on exit
    Memory,
    /// DuckDB database file, or an in-memory DuckDB database when `path` is absent
    #[serde(rename = "duckdb")]
    DuckDb {
        #[serde(default)]
        path: Option<PathBuf>,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::DuckDb { path: None }
    }
}

impl StorageConfig {
    /// `:memory:` selects in-memory DuckDB, `memory` the process-local table,
    /// anything else is a DuckDB file path.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | ":memory:" => StorageConfig::DuckDb { path: None },
            "memory" => StorageConfig::Memory,
            path => StorageConfig::DuckDb {
                path: Some(PathBuf::from(path)),
            },
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub storage: StorageConfig,

    /// Glob selecting the sheet to import; the first sheet when absent
    pub sheet: Option<String>,

    /// Read error cells as empty instead of failing the import
    pub error_as_null: bool,

    /// Reject imports whose ranges overlap for the same lookup key
    pub reject_overlapping_ranges: bool,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Builds a configuration from `BARCODE_*` variables; others are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Config, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Config::default();
        for (name, value) in vars {
            let value = value.as_ref();
            match name.as_ref() {
                DATABASE_VAR => config.storage = StorageConfig::parse(value),
                SHEET_VAR if value.trim().is_empty() => config.sheet = None,
                SHEET_VAR => config.sheet = Some(value.trim().to_owned()),
                ERROR_AS_NULL_VAR => config.error_as_null = parse_flag(ERROR_AS_NULL_VAR, value)?,
                REJECT_OVERLAPS_VAR => config.reject_overlapping_ranges = parse_flag(REJECT_OVERLAPS_VAR, value)?,
                _ => {}
            }
        }
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Config, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.display().to_string(), e))?;
        Self::from_json_str(&json)
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: value.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_to_in_memory_duckdb() {
        let config = Config::from_vars(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.storage, StorageConfig::DuckDb { path: None });
        assert!(!config.reject_overlapping_ranges);
    }

    #[test]
    fn reads_environment_variables() {
        let config = Config::from_vars([
            ("BARCODE_DATABASE", "/var/lib/barcodes.duckdb"),
            ("BARCODE_SHEET", "Ranges*"),
            ("BARCODE_ERROR_AS_NULL", "yes"),
            ("BARCODE_REJECT_OVERLAPS", "1"),
            ("PATH", "/usr/bin"),
        ])
        .unwrap();

        assert_eq!(
            config.storage,
            StorageConfig::DuckDb {
                path: Some(PathBuf::from("/var/lib/barcodes.duckdb"))
            }
        );
        assert_eq!(config.sheet.as_deref(), Some("Ranges*"));
        assert!(config.error_as_null);
        assert!(config.reject_overlapping_ranges);
    }

    #[test]
    fn database_values() {
        assert_eq!(StorageConfig::parse("memory"), StorageConfig::Memory);
        assert_eq!(StorageConfig::parse(":memory:"), StorageConfig::DuckDb { path: None });
        assert_eq!(
            StorageConfig::parse("data.db"),
            StorageConfig::DuckDb {
                path: Some(PathBuf::from("data.db"))
            }
        );
    }

    #[test]
    fn rejects_invalid_flag() {
        let error = Config::from_vars([("BARCODE_REJECT_OVERLAPS", "maybe")]).unwrap_err();
        assert_eq!(error.to_string(), "Invalid value 'maybe' for BARCODE_REJECT_OVERLAPS");
    }

    #[test]
    fn reads_json() {
        let config = Config::from_json_str(
            r#"{"storage": {"backend": "duckdb", "path": "ranges.duckdb"}, "sheet": "Sheet2", "reject_overlapping_ranges": true}"#,
        )
        .unwrap();
        assert_eq!(
            config.storage,
            StorageConfig::DuckDb {
                path: Some(PathBuf::from("ranges.duckdb"))
            }
        );
        assert_eq!(config.sheet.as_deref(), Some("Sheet2"));
        assert!(!config.error_as_null);
        assert!(config.reject_overlapping_ranges);

        let config = Config::from_json_str(r#"{"storage": {"backend": "memory"}}"#).unwrap();
        assert_eq!(config.storage, StorageConfig::Memory);

        assert!(Config::from_json_str(r#"{"database": "x"}"#).is_err());
    }

    #[test]
    fn reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"storage": {{"backend": "memory"}}, "error_as_null": true}}"#).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.storage, StorageConfig::Memory);
        assert!(config.error_as_null);

        assert!(matches!(
            Config::from_file("/nonexistent/barcodes.json"),
            Err(ConfigError::Io(..))
        ));
    }
}
