//! # Redis Configuration
//!
//! Static connection settings for the Redis client adapter.

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Startup ping deadline
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Redis connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: i64,
    #[serde(with = "duration_ms")]
    pub connect_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            password: None,
            db: 0,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl RedisConfig {
    /// Load configuration from environment variables
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Config`] when a numeric variable does not parse.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            host: env::var("REDIS_HOST").unwrap_or(defaults.host),
            port: parse_var("REDIS_PORT")?.unwrap_or(defaults.port),
            password: env::var("REDIS_PASSWORD").ok().filter(|p| !p.is_empty()),
            db: parse_var("REDIS_DB")?.unwrap_or(defaults.db),
            connect_timeout: parse_var("REDIS_CONNECT_TIMEOUT_MS")?
                .map_or(defaults.connect_timeout, Duration::from_millis),
        })
    }

    /// `host:port` form used for connecting and in error messages
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| CacheError::Config(format!("{name}={raw}: {e}"))),
        Err(_) => Ok(None),
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
