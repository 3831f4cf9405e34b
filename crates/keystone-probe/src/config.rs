//! # Probe Configuration
//!
//! Environment-based configuration, optionally overridden from the command line.

use keystone_cache::RedisConfig;
use keystone_logger::LoggerConfig;

/// Probe configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Redis connection settings
    pub redis: RedisConfig,

    /// Logger settings
    pub logger: LoggerConfig,
}

/// Command-line overrides; `None` keeps the environment value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub db: Option<i64>,
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Fails when a numeric `REDIS_*` variable is malformed.
    pub fn from_env() -> keystone_cache::Result<Self> {
        Ok(Self {
            redis: RedisConfig::from_env()?,
            logger: LoggerConfig::from_env(),
        })
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(host) = overrides.host {
            self.redis.host = host;
        }
        if let Some(port) = overrides.port {
            self.redis.port = port;
        }
        if let Some(db) = overrides.db {
            self.redis.db = db;
        }
        if let Some(level) = overrides.log_level {
            self.logger.level = level;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_only_given_fields() {
        let base = Config {
            redis: RedisConfig::default(),
            logger: LoggerConfig::default(),
        };

        let config = base.with_overrides(Overrides {
            port: Some(6380),
            log_level: Some("warn".into()),
            ..Overrides::default()
        });

        assert_eq!(config.redis.addr(), "127.0.0.1:6380");
        assert_eq!(config.redis.db, 0);
        assert_eq!(config.logger.level, "warn");
    }
}
