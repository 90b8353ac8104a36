//! Application configuration loading and validation.
//!
//! # Responsibility
//! - Locate `config.yaml`, layer it over defaults and `MINICRM__*` env vars.
//! - Validate the storage backend selection before any store is built.
//!
//! # Invariants
//! - An unknown `storage.type` is a load error, never a silent fallback.
//! - When no config file exists, a default one is written to the base dir.

use crate::logging::default_log_level;
use config::{Config as ConfigSource, Environment, File, FileFormat};
use log::{info, warn};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE_NAME: &str = "config.yaml";
pub const DEFAULT_JSON_FILE: &str = "contacts.json";
pub const DEFAULT_DB_PATH: &str = "contacts.db";
pub const DEFAULT_LOG_DIR: &str = "logs";
const ENV_PREFIX: &str = "MINICRM";

const CANDIDATE_FILES: &[&str] = &[
    "config.yaml",
    "config.yml",
    "config/config.yaml",
    "config/config.yml",
];

const DEFAULT_CONFIG_YAML: &str = "storage:
  type: json
  jsonFile: contacts.json
  dbPath: contacts.db
";

/// Accepted `storage.type` spellings.
pub const STORAGE_TYPES: &[&str] = &["memory", "json", "gorm"];

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Source(config::ConfigError),
    InvalidStorageType {
        value: String,
        expected: &'static [&'static str],
    },
    WriteDefault {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source(err) => write!(f, "failed to read configuration: {err}"),
            Self::InvalidStorageType { value, expected } => write!(
                f,
                "invalid storage type `{value}`; expected one of {}",
                expected.join("|")
            ),
            Self::WriteDefault { path, source } => write!(
                f,
                "failed to write default configuration `{}`: {source}",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Source(err) => Some(err),
            Self::InvalidStorageType { .. } => None,
            Self::WriteDefault { source, .. } => Some(source),
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(value: config::ConfigError) -> Self {
        Self::Source(value)
    }
}

/// Storage backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    Memory,
    Json,
    /// Relational backend. Spelled `gorm` in config files; `sqlite` is
    /// accepted as an alias.
    Sqlite,
}

impl StorageType {
    pub fn parse(value: &str) -> ConfigResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "json" => Ok(Self::Json),
            "gorm" | "sqlite" => Ok(Self::Sqlite),
            _ => Err(ConfigError::InvalidStorageType {
                value: value.to_string(),
                expected: STORAGE_TYPES,
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Json => "json",
            Self::Sqlite => "gorm",
        }
    }
}

impl Display for StorageType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub kind: StorageType,
    pub json_file: PathBuf,
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: StorageType::Json,
            json_file: PathBuf::from(DEFAULT_JSON_FILE),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    /// Relative values are resolved against the working directory by the
    /// binary before logging starts.
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

/// Validated application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    /// File the values were read from; `None` when only defaults applied.
    pub source: Option<PathBuf>,
}

// Key case handling differs between `config` sources, so camelCase fields
// accept their lowercased spelling too. Absent values fall back to defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    storage: RawStorage,
    logging: RawLogging,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStorage {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(rename = "jsonFile", alias = "jsonfile")]
    json_file: Option<PathBuf>,
    #[serde(rename = "dbPath", alias = "dbpath")]
    db_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawLogging {
    level: Option<String>,
    dir: Option<PathBuf>,
}

impl RawConfig {
    fn validate(self, source: Option<PathBuf>) -> ConfigResult<Config> {
        let defaults = Config::default();
        let kind = match self.storage.kind {
            Some(value) => StorageType::parse(&value)?,
            None => defaults.storage.kind,
        };

        Ok(Config {
            storage: StorageConfig {
                kind,
                json_file: self.storage.json_file.unwrap_or(defaults.storage.json_file),
                db_path: self.storage.db_path.unwrap_or(defaults.storage.db_path),
            },
            logging: LoggingConfig {
                level: self.logging.level.unwrap_or(defaults.logging.level),
                dir: self.logging.dir.unwrap_or(defaults.logging.dir),
            },
            source,
        })
    }
}

/// Loads configuration relative to the current working directory.
///
/// `explicit` bypasses discovery; the file must then exist.
pub fn load_config(explicit: Option<&Path>) -> ConfigResult<Config> {
    load_config_from(Path::new("."), explicit)
}

/// Loads configuration, discovering `config.yaml` under `base_dir`.
///
/// # Errors
/// - `ConfigError::Source` when a file is unreadable or malformed.
/// - `ConfigError::InvalidStorageType` for an unknown backend name.
/// - `ConfigError::WriteDefault` when the default file cannot be created.
pub fn load_config_from(base_dir: &Path, explicit: Option<&Path>) -> ConfigResult<Config> {
    let source = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(base_dir),
    };

    if source.is_none() {
        let path = base_dir.join(DEFAULT_CONFIG_FILE_NAME);
        warn!(
            "event=config_load module=config status=default_created path={}",
            path.display()
        );
        write_default_config(&path)?;
    }

    let mut builder = ConfigSource::builder();
    if let Some(path) = source.as_deref() {
        builder = builder.add_source(File::from(path).format(FileFormat::Yaml).required(true));
    }

    let raw: RawConfig = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?
        .try_deserialize()?;
    let config = raw.validate(source)?;

    info!(
        "event=config_load module=config status=ok storage_type={}",
        config.storage.kind
    );
    Ok(config)
}

/// Returns a human-readable description of the active storage backend.
pub fn config_info(config: &Config) -> String {
    let mut info = format!("Storage type: {}\n", config.storage.kind);
    match config.storage.kind {
        StorageType::Json => {
            info.push_str(&format!("JSON file: {}", config.storage.json_file.display()));
        }
        StorageType::Sqlite => {
            info.push_str(&format!(
                "SQLite database: {}",
                config.storage.db_path.display()
            ));
        }
        StorageType::Memory => {
            info.push_str("In-memory storage (data is lost on exit)");
        }
    }
    info
}

fn find_config_file(base_dir: &Path) -> Option<PathBuf> {
    CANDIDATE_FILES
        .iter()
        .map(|candidate| base_dir.join(candidate))
        .find(|path| path.is_file())
}

fn write_default_config(path: &Path) -> ConfigResult<()> {
    std::fs::write(path, DEFAULT_CONFIG_YAML).map_err(|err| ConfigError::WriteDefault {
        path: path.to_path_buf(),
        source: err,
    })
}

#[cfg(test)]
mod tests {
    use super::{config_info, load_config_from, ConfigError, StorageType, DEFAULT_CONFIG_FILE_NAME};
    use std::path::PathBuf;

    #[test]
    fn missing_file_applies_defaults_and_writes_default_config() {
        let dir = tempfile::tempdir().unwrap();

        let config = load_config_from(dir.path(), None).unwrap();

        assert_eq!(config.storage.kind, StorageType::Json);
        assert_eq!(config.storage.json_file, PathBuf::from("contacts.json"));
        assert_eq!(config.storage.db_path, PathBuf::from("contacts.db"));
        assert!(config.source.is_none());

        let written = dir.path().join(DEFAULT_CONFIG_FILE_NAME);
        assert!(written.is_file());
        let reloaded = load_config_from(dir.path(), None).unwrap();
        assert_eq!(reloaded.storage, config.storage);
        assert_eq!(reloaded.source, Some(written));
    }

    #[test]
    fn discovers_file_in_config_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("config")).unwrap();
        std::fs::write(
            dir.path().join("config").join("config.yaml"),
            "storage:\n  type: gorm\n  dbPath: crm.sqlite3\n",
        )
        .unwrap();

        let config = load_config_from(dir.path(), None).unwrap();
        assert_eq!(config.storage.kind, StorageType::Sqlite);
        assert_eq!(config.storage.db_path, PathBuf::from("crm.sqlite3"));
        assert_eq!(config.storage.json_file, PathBuf::from("contacts.json"));
    }

    #[test]
    fn explicit_file_overrides_discovery() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.yaml"), "storage:\n  type: json\n").unwrap();
        let explicit = dir.path().join("other.yaml");
        std::fs::write(
            &explicit,
            "storage:\n  type: memory\nlogging:\n  level: warn\n  dir: /tmp/crm-logs\n",
        )
        .unwrap();

        let config = load_config_from(dir.path(), Some(&explicit)).unwrap();
        assert_eq!(config.storage.kind, StorageType::Memory);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.dir, PathBuf::from("/tmp/crm-logs"));
    }

    #[test]
    fn unknown_storage_type_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.yaml"), "storage:\n  type: redis\n").unwrap();

        let err = load_config_from(dir.path(), None).unwrap_err();
        match err {
            ConfigError::InvalidStorageType { value, expected } => {
                assert_eq!(value, "redis");
                assert_eq!(expected, &["memory", "json", "gorm"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from(dir.path(), Some(&dir.path().join("absent.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Source(_)));
    }

    #[test]
    fn storage_type_accepts_sqlite_alias() {
        assert_eq!(StorageType::parse("SQLite").unwrap(), StorageType::Sqlite);
        assert_eq!(StorageType::Sqlite.as_str(), "gorm");
    }

    #[test]
    fn config_info_describes_active_backend() {
        let mut config = super::Config::default();
        assert!(config_info(&config).contains("JSON file: contacts.json"));

        config.storage.kind = StorageType::Memory;
        assert!(config_info(&config).contains("In-memory"));
    }
}
