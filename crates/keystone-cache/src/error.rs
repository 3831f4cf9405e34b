//! Cache layer error types

use std::time::Duration;

use thiserror::Error;

/// Cache layer errors
///
/// Store and codec failures keep their source error untouched; only the
/// connection-time failures carry extra context.
#[derive(Debug, Error)]
pub enum CacheError {
    #[cfg(feature = "redis")]
    #[error("failed to connect to Redis at {addr}: {source}")]
    Connection {
        addr: String,
        #[source]
        source: redis::RedisError,
    },

    #[error("failed to connect to Redis at {addr}: ping timed out after {}ms", .timeout.as_millis())]
    ConnectTimeout { addr: String, timeout: Duration },

    #[cfg(feature = "redis")]
    #[error(transparent)]
    Redis(#[from] redis::RedisError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error("Cache miss for key: {0}")]
    Miss(String),

    #[error("Cache miss for field {field} of key {key}")]
    FieldMiss { key: String, field: String },

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("WRONGTYPE key {key} holds a {actual}, not a {expected}")]
    WrongType {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CacheError {
    /// Whether this error means the requested key or field was absent.
    #[must_use]
    pub const fn is_miss(&self) -> bool {
        matches!(self, Self::Miss(_) | Self::FieldMiss { .. })
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miss_classification() {
        assert!(CacheError::Miss("k".into()).is_miss());
        assert!(
            CacheError::FieldMiss {
                key: "k".into(),
                field: "f".into()
            }
            .is_miss()
        );
        assert!(!CacheError::InvalidKey(String::new()).is_miss());
    }

    #[test]
    fn test_timeout_message_carries_address() {
        let err = CacheError::ConnectTimeout {
            addr: "10.0.0.1:6379".into(),
            timeout: Duration::from_secs(5),
        };
        assert_eq!(
            err.to_string(),
            "failed to connect to Redis at 10.0.0.1:6379: ping timed out after 5000ms"
        );
    }
}
