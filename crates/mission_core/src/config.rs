//! File-based configuration.
//!
//! # Responsibility
//! - Describe where the store lives and how logging is set up.
//! - Load `mission.toml`, falling back to defaults for missing keys.
//! - Only the default config location may be absent; an explicit path must
//!   exist.
//!
//! Example:
//!
//! ```toml
//! [store]
//! path = "/home/me/.mission/mission.db"
//!
//! [logging]
//! level = "debug"
//! dir = "/home/me/.mission/logs"
//! ```

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DATA_DIR_NAME: &str = ".mission";
const DB_FILE_NAME: &str = "mission.db";
const CONFIG_FILE_NAME: &str = "mission.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MissionConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Location of the backing store.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// SQLite file. Ignored when `in_memory` is set.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    /// Keep all data in memory for the lifetime of the process.
    #[serde(default)]
    pub in_memory: bool,
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            in_memory: true,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            in_memory: false,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::file(default_db_path())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`.
    #[serde(default = "default_log_level_string")]
    pub level: String,
    /// Absolute directory for rolling log files.
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level_string(),
            dir: default_log_dir(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

impl MissionConfig {
    /// Loads configuration from an explicitly chosen `path`.
    ///
    /// A missing, unreadable or malformed file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the config at the default location, or the defaults when no
    /// file has been written there yet.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_or_default(&default_config_path())
    }

    /// Like `load`, but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// `~/.mission`, or `./.mission` when no home directory is known.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(DATA_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(DATA_DIR_NAME))
}

pub fn default_config_path() -> PathBuf {
    default_data_dir().join(CONFIG_FILE_NAME)
}

fn default_db_path() -> PathBuf {
    default_data_dir().join(DB_FILE_NAME)
}

fn default_log_dir() -> PathBuf {
    default_data_dir().join("logs")
}

fn default_log_level_string() -> String {
    crate::logging::default_log_level().to_string()
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, MissionConfig, StoreConfig};
    use std::path::PathBuf;

    #[test]
    fn empty_document_uses_defaults() {
        let config = MissionConfig::from_toml_str("").expect("empty config should parse");
        assert!(!config.store.in_memory);
        assert!(config.store.path.ends_with("mission.db"));
        assert!(config.logging.dir.ends_with("logs"));
    }

    #[test]
    fn sections_override_defaults() {
        let config = MissionConfig::from_toml_str(
            r#"
            [store]
            path = "/tmp/board.db"

            [logging]
            level = "warn"
            dir = "/tmp/board-logs"
            "#,
        )
        .expect("config should parse");
        assert_eq!(config.store.path, PathBuf::from("/tmp/board.db"));
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.dir, PathBuf::from("/tmp/board-logs"));
    }

    #[test]
    fn missing_default_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = MissionConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert!(config.store.path.ends_with("mission.db"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = MissionConfig::load(&path).unwrap_err();
        assert!(matches!(
            &err,
            ConfigError::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        ));
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mission.toml");
        std::fs::write(&path, "[store\npath = 1").unwrap();
        let err = MissionConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn in_memory_helper_sets_flag() {
        assert!(StoreConfig::in_memory().in_memory);
    }
}
