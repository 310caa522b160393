//! Runtime configuration.
//!
//! # Responsibility
//! - Read an optional TOML file, then apply `CANTEEN_*` environment
//!   overrides on top of it.
//! - Reject unusable settings before any database or log file is touched.
//!
//! # Invariants
//! - Precedence is: environment, then file, then built-in defaults.
//! - Empty environment values are ignored.
//! - Logging stays disabled unless a log directory is configured.

use crate::logging::{default_log_level, init_logging, normalize_level};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "CANTEEN_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "CANTEEN_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CANTEEN_LOG_DIR";
pub const DEFAULT_DB_PATH: &str = "canteen.sqlite3";

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config file: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Settings shared by every entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanteenConfig {
    /// SQLite ledger file.
    pub db_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: Option<PathBuf>,
}

impl Default for CanteenConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CanteenConfig {
    /// Loads `path` (when given), applies process environment overrides and
    /// validates the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Same as [`CanteenConfig::load`] with overrides read from `lookup`.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml_str(&contents)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Overrides fields from `lookup`, which maps variable names to values.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(db_path) = read(ENV_DB_PATH) {
            self.db_path = PathBuf::from(db_path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        if let Some(log_dir) = read(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(log_dir));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("db_path cannot be empty".to_string()));
        }
        normalize_level(&self.log_level).map_err(ConfigError::Invalid)?;
        if let Some(log_dir) = &self.log_dir {
            if !log_dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "log_dir must be an absolute path, got `{}`",
                    log_dir.display()
                )));
            }
        }
        Ok(())
    }

    /// Starts file logging when a log directory is configured.
    ///
    /// Returns whether logging is active afterwards.
    pub fn init_logging(&self) -> Result<bool, String> {
        match &self.log_dir {
            Some(log_dir) => init_logging(&self.log_level, log_dir).map(|()| true),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_disable_logging_and_use_local_db_file() {
        let config = CanteenConfig::default();
        assert_eq!(config.db_path, PathBuf::from("canteen.sqlite3"));
        assert_eq!(config.log_level, default_log_level());
        assert!(config.log_dir.is_none());
        assert_eq!(config.init_logging(), Ok(false));
    }

    #[test]
    fn toml_file_fills_missing_fields_from_defaults() {
        let config = CanteenConfig::from_toml_str("db_path = \"/srv/canteen/ledger.sqlite3\"\n")
            .expect("partial config should parse");
        assert_eq!(config.db_path, PathBuf::from("/srv/canteen/ledger.sqlite3"));
        assert_eq!(config.log_level, default_log_level());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = CanteenConfig::from_toml_str("database = \"x\"\n").expect_err("unknown key");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn environment_overrides_file_values_and_skips_empty_ones() {
        let mut config = CanteenConfig::from_toml_str(
            "db_path = \"file.sqlite3\"\nlog_level = \"warn\"\n",
        )
        .expect("config should parse");
        config.apply_env_overrides(lookup_from(&[
            (ENV_DB_PATH, "env.sqlite3"),
            (ENV_LOG_LEVEL, "  "),
            (ENV_LOG_DIR, "/var/log/canteen"),
        ]));

        assert_eq!(config.db_path, PathBuf::from("env.sqlite3"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/canteen")));
    }

    #[test]
    fn validate_rejects_bad_level_relative_log_dir_and_empty_db_path() {
        let mut config = CanteenConfig {
            log_level: "loud".to_string(),
            ..CanteenConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.log_level = "info".to_string();
        config.log_dir = Some(PathBuf::from("logs"));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.log_dir = None;
        config.db_path = PathBuf::new();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn load_reads_file_and_reports_missing_one() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "log_level = \"error\"").expect("write config");

        let config = CanteenConfig::load_with(Some(file.path()), lookup_from(&[]))
            .expect("config should load");
        assert_eq!(config.log_level, "error");
        assert_eq!(config.db_path, PathBuf::from("canteen.sqlite3"));

        let config = CanteenConfig::load_with(
            Some(file.path()),
            lookup_from(&[(ENV_LOG_LEVEL, "debug")]),
        )
        .expect("config should load");
        assert_eq!(config.log_level, "debug");

        let err = CanteenConfig::load_with(
            Some(file.path()),
            lookup_from(&[(ENV_LOG_LEVEL, "bogus")]),
        )
        .expect_err("bad level from environment");
        assert!(matches!(err, ConfigError::Invalid(_)));

        let missing = file.path().with_extension("missing.toml");
        let err = CanteenConfig::load_with(Some(&missing), lookup_from(&[]))
            .expect_err("missing file");
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
