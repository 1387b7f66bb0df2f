use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::schedule::ScheduleError;

pub const DEFAULT_MAX_LINES: i64 = 55;
pub const DEFAULT_MAX_FUTURE_DAYS: i64 = 28;
pub const DEFAULT_PRINT_FUTURE_DAYS: i64 = 20;
pub const DEFAULT_HEADER_LINES: i64 = 3;
/// Longest window a view may ask for, roughly ten years.
pub const MAX_FUTURE_DAYS_LIMIT: i64 = 3660;

pub const CONFIG_PATH_ENV: &str = "HABIT_PLANNER_CONFIG";
pub const DATABASE_PATH_ENV: &str = "HABIT_PLANNER_DB";
pub const LISTEN_ADDR_ENV: &str = "HABIT_PLANNER_ADDR";
const DEFAULT_CONFIG_FILE: &str = "habit-planner.toml";

/// Tunables for one schedule view.
///
/// Values are signed so that a bad file or query string is reported as an
/// invalid configuration instead of failing to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Line budget per column.
    pub max_lines: i64,
    /// Days after today that are always shown.
    pub max_future_days: i64,
    /// Lines each day costs before its tasks: heading plus spacing.
    pub header_lines: i64,
    pub include_overdue: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            max_lines: DEFAULT_MAX_LINES,
            max_future_days: DEFAULT_MAX_FUTURE_DAYS,
            header_lines: DEFAULT_HEADER_LINES,
            include_overdue: true,
        }
    }
}

/// A [`ScheduleConfig`] that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutLimits {
    pub max_lines: usize,
    pub max_future_days: u32,
    pub header_lines: usize,
    pub include_overdue: bool,
}

impl ScheduleConfig {
    pub fn print_defaults() -> Self {
        Self {
            max_future_days: DEFAULT_PRINT_FUTURE_DAYS,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<LayoutLimits, ScheduleError> {
        if self.max_lines <= 0 {
            return Err(ScheduleError::InvalidConfiguration(format!(
                "max_lines must be positive (got {})",
                self.max_lines
            )));
        }
        if self.max_future_days <= 0 {
            return Err(ScheduleError::InvalidConfiguration(format!(
                "max_future_days must be positive (got {})",
                self.max_future_days
            )));
        }
        if self.max_future_days > MAX_FUTURE_DAYS_LIMIT {
            return Err(ScheduleError::InvalidConfiguration(format!(
                "max_future_days must be at most {MAX_FUTURE_DAYS_LIMIT} (got {})",
                self.max_future_days
            )));
        }
        if self.header_lines < 0 {
            return Err(ScheduleError::InvalidConfiguration(format!(
                "header_lines must not be negative (got {})",
                self.header_lines
            )));
        }
        Ok(LayoutLimits {
            max_lines: self.max_lines as usize,
            max_future_days: self.max_future_days as u32,
            header_lines: self.header_lines as usize,
            include_overdue: self.include_overdue,
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid [{section}] settings: {source}")]
    Invalid {
        section: &'static str,
        #[source]
        source: ScheduleError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub listen_addr: String,
    /// On-screen single column view.
    pub schedule: ScheduleConfig,
    /// Printable two column view.
    pub print: ScheduleConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/sevenhabits.db"),
            listen_addr: "0.0.0.0:3002".to_string(),
            schedule: ScheduleConfig::default(),
            print: ScheduleConfig::print_defaults(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.check()?;
        Ok(config)
    }

    /// Reads `path`, or `$HABIT_PLANNER_CONFIG`, or `./habit-planner.toml`.
    ///
    /// A missing default file yields the built-in defaults; an explicitly
    /// named file must exist. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));
        let config_path = explicit
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(raw) => Self::from_toml_str(&raw, &config_path)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
                tracing::debug!(path = %config_path.display(), "no config file, using defaults");
                Self::default()
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: config_path,
                    source,
                });
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(db) = std::env::var_os(DATABASE_PATH_ENV).filter(|v| !v.is_empty()) {
            self.database_path = PathBuf::from(db);
        }
        if let Ok(addr) = std::env::var(LISTEN_ADDR_ENV) {
            if !addr.trim().is_empty() {
                self.listen_addr = addr.trim().to_string();
            }
        }
    }

    fn check(&self) -> Result<(), ConfigError> {
        self.schedule
            .validate()
            .map_err(|source| ConfigError::Invalid {
                section: "schedule",
                source,
            })?;
        self.print.validate().map_err(|source| ConfigError::Invalid {
            section: "print",
            source,
        })?;
        Ok(())
    }
}
