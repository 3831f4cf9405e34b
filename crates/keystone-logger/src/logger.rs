//! # Logger
//!
//! Key/value structured logger. Each instance owns its own `tracing`
//! dispatcher, so several loggers with different sinks can coexist and
//! none of them touches the global default subscriber.

use serde_json::{Map, Value};
use tracing::Dispatch;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::{LogFormat, LoggerConfig, TimestampFormat};
use crate::error::{LoggerError, Result};
use crate::format::{FlatJson, UnixSeconds};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug, Clone, Copy)]
enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

macro_rules! emit_at {
    ($level:expr, $fields:expr, $msg:expr) => {
        match $fields {
            Some(fields) => tracing::event!($level, fields = %fields, "{}", $msg),
            None => tracing::event!($level, "{}", $msg),
        }
    };
}

/// Collect alternating name/value arguments into a field map.
///
/// String names are used as-is; any other JSON value is rendered to text.
/// A trailing name without a value is dropped.
#[must_use]
pub fn pair_fields(args: &[Value]) -> Map<String, Value> {
    args.chunks_exact(2)
        .map(|pair| {
            let name = match &pair[0] {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (name, pair[1].clone())
        })
        .collect()
}

/// Structured logger facade
#[derive(Clone, Debug)]
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    /// Logger writing to stdout.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::InvalidLevel`] if `config.level` is not a valid
    /// filter directive.
    pub fn new(config: &LoggerConfig) -> Result<Self> {
        Self::with_writer(config, std::io::stdout)
    }

    /// Logger writing wherever `writer` points.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::InvalidLevel`] if `config.level` is not a valid
    /// filter directive.
    pub fn with_writer<W>(config: &LoggerConfig, writer: W) -> Result<Self>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let filter = EnvFilter::try_new(&config.level).map_err(|e| LoggerError::InvalidLevel {
            level: config.level.clone(),
            reason: e.to_string(),
        })?;

        let layer: BoxedLayer = match (config.format, config.timestamp) {
            (LogFormat::Json, timestamp) => fmt::layer()
                .event_format(FlatJson::new(timestamp))
                .with_writer(writer)
                .boxed(),
            (LogFormat::Text, TimestampFormat::Unix) => fmt::layer()
                .with_ansi(false)
                .with_timer(UnixSeconds)
                .with_writer(writer)
                .boxed(),
            (LogFormat::Text, TimestampFormat::Rfc3339) => {
                fmt::layer().with_ansi(false).with_writer(writer).boxed()
            }
        };

        let subscriber = Registry::default().with(layer).with(filter);
        Ok(Self {
            dispatch: Dispatch::new(subscriber),
        })
    }

    /// Dispatcher backing this logger, for routing plain `tracing` macros
    /// through the same sink.
    pub const fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    pub fn debug(&self, msg: &str, args: &[Value]) {
        self.emit(Severity::Debug, msg, args);
    }

    pub fn info(&self, msg: &str, args: &[Value]) {
        self.emit(Severity::Info, msg, args);
    }

    pub fn warn(&self, msg: &str, args: &[Value]) {
        self.emit(Severity::Warn, msg, args);
    }

    pub fn error(&self, msg: &str, args: &[Value]) {
        self.emit(Severity::Error, msg, args);
    }

    fn emit(&self, severity: Severity, msg: &str, args: &[Value]) {
        let fields = pair_fields(args);
        let fields = (!fields.is_empty()).then(|| Value::Object(fields));

        tracing::dispatcher::with_default(&self.dispatch, || match severity {
            Severity::Debug => emit_at!(tracing::Level::DEBUG, fields, msg),
            Severity::Info => emit_at!(tracing::Level::INFO, fields, msg),
            Severity::Warn => emit_at!(tracing::Level::WARN, fields, msg),
            Severity::Error => emit_at!(tracing::Level::ERROR, fields, msg),
        });
    }
}
