//! # Logger Configuration
//!
//! Environment-based configuration for the logger facade.

use std::env;
use std::str::FromStr;

/// Output encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Human-readable single line
    Text,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "pretty" | "plain" => Ok(Self::Text),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Timestamp rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampFormat {
    /// Whole seconds since the Unix epoch
    #[default]
    Unix,
    /// RFC 3339 wall-clock time
    Rfc3339,
}

impl FromStr for TimestampFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unix" => Ok(Self::Unix),
            "rfc3339" | "iso8601" => Ok(Self::Rfc3339),
            other => Err(format!("unknown timestamp format: {other}")),
        }
    }
}

/// Logger configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// `EnvFilter` directive string, e.g. `info` or `warn,keystone_cache=debug`.
    ///
    /// Records from the [`Logger`](crate::Logger) methods all carry the target
    /// `keystone_logger::logger`, whichever module calls them, so per-module
    /// directives like `warn,my_app=debug` do not reach them. Use a bare level,
    /// or `keystone_logger=<level>` to tune the facade on its own.
    pub level: String,

    pub format: LogFormat,

    pub timestamp: TimestampFormat,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
            format: LogFormat::default(),
            timestamp: TimestampFormat::default(),
        }
    }
}

impl LoggerConfig {
    /// Load configuration from environment variables
    ///
    /// Unrecognised `LOG_FORMAT` / `LOG_TIMESTAMP` values fall back to defaults.
    pub fn from_env() -> Self {
        Self {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "debug".to_string()),
            format: env::var("LOG_FORMAT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            timestamp: env::var("LOG_TIMESTAMP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    #[must_use]
    pub const fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: TimestampFormat) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!(" pretty ".parse::<LogFormat>(), Ok(LogFormat::Text));
        assert!("xml".parse::<LogFormat>().is_err());

        assert_eq!("unix".parse::<TimestampFormat>(), Ok(TimestampFormat::Unix));
        assert_eq!("RFC3339".parse::<TimestampFormat>(), Ok(TimestampFormat::Rfc3339));
    }

    #[test]
    fn test_builder() {
        let config = LoggerConfig::default()
            .with_level("warn")
            .with_format(LogFormat::Text)
            .with_timestamp(TimestampFormat::Rfc3339);

        assert_eq!(config.level, "warn");
        assert_eq!(config.format, LogFormat::Text);
        assert_eq!(config.timestamp, TimestampFormat::Rfc3339);
    }
}
