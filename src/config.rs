//! Environment-driven configuration.
//!
//! Values are read once at startup, after `.env` has been loaded. Parsing goes
//! through [`AppConfig::from_lookup`] so tests can feed a map instead of the
//! process environment.

use std::{net::SocketAddr, time::Duration};

use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Postgres URL. `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    /// Upper bound for a single storage operation.
    pub operation_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let bind_addr: SocketAddr = parse_or("BIND_ADDR", &lookup, || {
            DEFAULT_BIND_ADDR
                .parse::<SocketAddr>()
                .map_err(|err: std::net::AddrParseError| err.to_string())
        })?;

        let max_connections: u32 =
            parse_or("DB_MAX_CONNECTIONS", &lookup, || Ok(DEFAULT_MAX_CONNECTIONS))?;
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "DB_MAX_CONNECTIONS",
                value: max_connections.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let timeout_ms: u64 = parse_or("OPERATION_TIMEOUT_MS", &lookup, || {
            Ok(DEFAULT_OPERATION_TIMEOUT_MS)
        })?;
        if timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "OPERATION_TIMEOUT_MS",
                value: timeout_ms.to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(AppConfig {
            database_url,
            bind_addr,
            max_connections,
            operation_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

fn parse_or<T, F, D>(key: &'static str, lookup: &F, default: D) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
    D: FnOnce() -> Result<T, String>,
{
    let invalid = |value: String, reason: String| ConfigError::Invalid { key, value, reason };

    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|err| invalid(raw.clone(), err.to_string())),
        None => default().map_err(|reason| invalid(String::new(), reason)),
    }
}
