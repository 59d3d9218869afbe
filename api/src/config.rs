//! Runtime configuration, read from the environment.
//!
//! `main` loads a `.env` file with `dotenvy` first, so anything here can be
//! set either way.

use std::{fmt, time::Duration};

const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:4567";
const DEFAULT_MONGO_DB: &str = "dev";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    /// When unset the service keeps posts in memory.
    pub mongo_uri: Option<String>,
    pub mongo_db: String,
    pub request_timeout: Duration,
    pub max_concurrent_requests: usize,
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { key, value } => {
                write!(f, "Invalid value for {}: {:?}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            server_addr: get("SERVER_ADDR").unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string()),
            mongo_uri: get("MONGO_URI"),
            mongo_db: get("MONGO_DB").unwrap_or_else(|| DEFAULT_MONGO_DB.to_string()),
            request_timeout: Duration::from_secs(parse_or(
                "REQUEST_TIMEOUT_SECS",
                get("REQUEST_TIMEOUT_SECS"),
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            max_concurrent_requests: parse_or(
                "MAX_CONCURRENT_REQUESTS",
                get("MAX_CONCURRENT_REQUESTS"),
                DEFAULT_MAX_CONCURRENT_REQUESTS,
            )?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
