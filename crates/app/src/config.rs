//! Application configuration loaded from environment variables.

use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Output format of the fmt logging layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" | "" => Ok(LogFormat::Plain),
            "json" => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!("unknown LOG_FORMAT: {other}"))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Plain => write!(f, "plain"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Workflow configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `plain` or `json` (default: `plain`)
/// - `SYSTEM_ACTOR`: actor recorded on service order updates (default: `"system"`)
/// - `DEFAULT_VALIDITY_DAYS`: validity of newly opened budgets (default: `7`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub log_level: String,
    pub log_format: LogFormat,
    pub system_actor: String,
    pub default_validity_days: u32,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// Unset variables take their default; set but malformed ones are an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();

        let log_format = match lookup("LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => defaults.log_format,
        };
        let default_validity_days = match lookup("DEFAULT_VALIDITY_DAYS") {
            Some(value) => value.trim().parse().map_err(|_| {
                AppError::Config(format!("DEFAULT_VALIDITY_DAYS is not a day count: {value}"))
            })?,
            None => defaults.default_validity_days,
        };

        Ok(Self {
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format,
            system_actor: lookup("SYSTEM_ACTOR").unwrap_or(defaults.system_actor),
            default_validity_days,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Plain,
            system_actor: saga::SYSTEM_ACTOR.to_string(),
            default_validity_days: 7,
        }
    }
}
