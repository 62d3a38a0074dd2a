//! Process settings, read from `ADDRESS_BOOK_*` environment variables.

use thiserror::Error;

pub const ENV_PREFIX: &str = "ADDRESS_BOOK_";

const DEFAULT_DATABASE_URL: &str = "sqlite://address_book.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_CHANNEL_BUFFER: usize = 100;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid { key: String, value: String, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub app_name: String,
    pub author_name: String,
    pub author_email: String,
    /// sqlx connection URL, e.g. `sqlite://address_book.db` or `sqlite::memory:`.
    pub database_url: String,
    pub max_connections: u32,
    /// Capacity of the service request channel.
    pub channel_buffer: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "Address Book API".to_string(),
            author_name: String::new(),
            author_email: String::new(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            channel_buffer: DEFAULT_CHANNEL_BUFFER,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from `lookup`, which receives the full variable name
    /// (`ADDRESS_BOOK_DATABASE_URL`, ...). Missing variables keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        let defaults = Self::default();

        Ok(Self {
            app_name: get("APP_NAME").unwrap_or(defaults.app_name),
            author_name: get("AUTHOR_NAME").unwrap_or(defaults.author_name),
            author_email: get("AUTHOR_EMAIL").unwrap_or(defaults.author_email),
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections: parse_positive("MAX_CONNECTIONS", get("MAX_CONNECTIONS"), defaults.max_connections)?,
            channel_buffer: parse_positive("CHANNEL_BUFFER", get("CHANNEL_BUFFER"), defaults.channel_buffer)?,
        })
    }

    /// In-memory store, used by tests and demos.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            ..Self::default()
        }
    }
}

fn parse_positive<T>(name: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let Some(raw) = raw else {
        return Ok(default);
    };
    let invalid = |reason: String| ConfigError::Invalid {
        key: format!("{ENV_PREFIX}{name}"),
        value: raw.clone(),
        reason,
    };
    let value = raw.trim().parse::<T>().map_err(|e| invalid(e.to_string()))?;
    if value <= T::default() {
        return Err(invalid("must be greater than zero".to_string()));
    }
    Ok(value)
}
