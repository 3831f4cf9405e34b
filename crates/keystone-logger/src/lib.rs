//! # Keystone Logger
//!
//! Structured logging facade: a message plus alternating field names and
//! values, rendered as flat JSON lines (or plain text) by `tracing-subscriber`.
//!
//! Loggers are plain values. Build one at startup and hand it to whatever
//! needs it:
//!
//! ```rust,ignore
//! use keystone_logger::{fields, Logger, LoggerConfig};
//!
//! let logger = Logger::new(&LoggerConfig::from_env())?;
//! logger.info("cache warmed", &fields!["keys", 1024, "took_ms", 37]);
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod config;
pub mod format;
pub mod error;
pub mod logger;

pub use config::{LogFormat, LoggerConfig, TimestampFormat};
pub use error::{LoggerError, Result};
pub use format::{FlatJson, UnixSeconds};
pub use logger::{Logger, pair_fields};

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}

/// Build a logger argument list from any serializable expressions.
///
/// ```rust,ignore
/// logger.warn("slow query", &fields!["table", "users", "ms", elapsed]);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        ::std::vec::Vec::<$crate::__private::serde_json::Value>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::__private::serde_json::json!($arg)),+]
    };
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
