//! Relay configuration parsed from environment variables.
//!
//! SYSTEM CONTEXT
//! ==============
//! `main` loads an optional `.env` file, then calls [`RelayConfig::from_env`]
//! once at startup. Everything downstream receives typed values; nothing else
//! reads the environment.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_PERSIST_QUEUE_CAPACITY: usize = 1024;
pub const DEFAULT_PERSIST_FLUSH_MS: u64 = 25;
pub const DEFAULT_PERSIST_RETRIES: usize = 3;
pub const DEFAULT_PERSIST_RETRY_BASE_MS: u64 = 50;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Where board histories are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Postgres via sqlx.
    Postgres { url: String, max_connections: u32 },
    /// Process-local map. Boards vanish on restart.
    Memory,
}

/// Tuning knobs for the background history writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistConfig {
    /// Bounded queue between sessions and the writer.
    pub queue_capacity: usize,
    /// How long pending saves are coalesced before a flush.
    pub flush_interval: Duration,
    /// Attempts per board save, including the first.
    pub retries: usize,
    /// Linear back-off step between attempts.
    pub retry_base: Duration,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_PERSIST_QUEUE_CAPACITY,
            flush_interval: Duration::from_millis(DEFAULT_PERSIST_FLUSH_MS),
            retries: DEFAULT_PERSIST_RETRIES,
            retry_base: Duration::from_millis(DEFAULT_PERSIST_RETRY_BASE_MS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub port: u16,
    pub store: StoreConfig,
    pub persist: PersistConfig,
}

impl RelayConfig {
    /// Build typed config from the process environment.
    ///
    /// Optional:
    /// - `PORT`: default 5000
    /// - `DATABASE_URL`: Postgres URL; in-memory store when absent
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `HISTORY_PERSIST_QUEUE_CAPACITY`: default 1024
    /// - `HISTORY_PERSIST_FLUSH_MS`: default 25
    /// - `HISTORY_PERSIST_RETRIES`: default 3
    /// - `HISTORY_PERSIST_RETRY_BASE_MS`: default 50
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set but unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`RelayConfig::from_env`] over an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set but unparsable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;

        let store = match lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            Some(url) => StoreConfig::Postgres {
                url,
                max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            },
            None => StoreConfig::Memory,
        };

        let persist = PersistConfig {
            queue_capacity: parse_or(&lookup, "HISTORY_PERSIST_QUEUE_CAPACITY", DEFAULT_PERSIST_QUEUE_CAPACITY)?
                .max(1),
            flush_interval: Duration::from_millis(parse_or(
                &lookup,
                "HISTORY_PERSIST_FLUSH_MS",
                DEFAULT_PERSIST_FLUSH_MS,
            )?
            .max(1)),
            retries: parse_or(&lookup, "HISTORY_PERSIST_RETRIES", DEFAULT_PERSIST_RETRIES)?.max(1),
            retry_base: Duration::from_millis(parse_or(
                &lookup,
                "HISTORY_PERSIST_RETRY_BASE_MS",
                DEFAULT_PERSIST_RETRY_BASE_MS,
            )?),
        };

        Ok(Self { port, store, persist })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
