//! # Record Format
//!
//! Flat JSON lines: `time`, `level`, `message`, `target` and every event
//! field sit side by side in one object. Key/value pairs passed to the
//! [`Logger`](crate::Logger) facade are merged in as ordinary top-level keys,
//! keeping their JSON types.

use serde_json::{Map, Number, Value};
use std::fmt::{self, Write as _};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::time::{self, FormatTime};
use tracing_subscriber::registry::LookupSpan;

use crate::config::TimestampFormat;

/// Event field carrying the facade's pairs as a JSON object.
const PAIRS_FIELD: &str = "fields";

const RESERVED: [&str; 4] = ["time", "level", "message", "target"];

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

/// Whole seconds since the Unix epoch, for the text format.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixSeconds;

impl FormatTime for UnixSeconds {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", unix_seconds())
    }
}

/// Event formatter producing one flat JSON object per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatJson {
    timestamp: TimestampFormat,
}

impl FlatJson {
    pub const fn new(timestamp: TimestampFormat) -> Self {
        Self { timestamp }
    }

    fn time(self) -> Result<Value, fmt::Error> {
        match self.timestamp {
            TimestampFormat::Unix => Ok(Value::from(unix_seconds())),
            TimestampFormat::Rfc3339 => {
                let mut buf = String::new();
                time::SystemTime.format_time(&mut Writer::new(&mut buf))?;
                Ok(Value::String(buf))
            }
        }
    }
}

impl<S, N> FormatEvent<S, N> for FlatJson
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut record = visitor.fields;
        record.insert("time".to_string(), self.time()?);
        record.insert(
            "level".to_string(),
            Value::from(meta.level().to_string().to_ascii_lowercase()),
        );
        record.insert("target".to_string(), Value::from(meta.target()));
        for (name, value) in visitor.pairs {
            if !RESERVED.contains(&name.as_str()) {
                record.insert(name, value);
            }
        }

        let line = serde_json::to_string(&record).map_err(|_| fmt::Error)?;
        writeln!(writer, "{line}")
    }
}

#[derive(Default)]
struct FieldVisitor {
    fields: Map<String, Value>,
    pairs: Map<String, Value>,
}

impl FieldVisitor {
    fn put(&mut self, field: &Field, value: Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field, Number::from_f64(value).map_or(Value::Null, Value::Number));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.put(field, Value::from(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let text = format!("{value:?}");
        if field.name() == PAIRS_FIELD {
            if let Ok(Value::Object(pairs)) = serde_json::from_str(&text) {
                self.pairs = pairs;
                return;
            }
        }
        self.put(field, Value::String(text));
    }
}
