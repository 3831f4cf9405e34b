//! # Probe Commands
//!
//! Each subcommand maps onto one cache facade call and renders a short,
//! `redis-cli`-like reply.

use anyhow::Result;
use clap::Subcommand;
use keystone_cache::CacheService;
use serde_json::Value;
use std::time::Duration;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Check the server answers
    Ping,

    /// Print the JSON value stored at KEY
    Get { key: String },

    /// Store VALUE at KEY; VALUE is parsed as JSON, falling back to a string
    Set {
        key: String,
        value: String,
        /// Expire after this many seconds
        #[arg(long)]
        ttl: Option<u64>,
    },

    /// Delete one or more keys
    Del {
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Report whether KEY exists
    Exists { key: String },

    /// Set a TTL in seconds on an existing KEY
    Expire { key: String, seconds: u64 },

    /// Print the JSON value of FIELD in the hash at KEY
    Hget { key: String, field: String },

    /// Store VALUE in FIELD of the hash at KEY
    Hset {
        key: String,
        field: String,
        value: String,
    },

    /// Add members to the set at KEY
    Sadd {
        key: String,
        #[arg(required = true)]
        members: Vec<String>,
    },

    /// List members of the set at KEY
    Members { key: String },
}

impl Command {
    /// Short name used in log records
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Get { .. } => "get",
            Self::Set { .. } => "set",
            Self::Del { .. } => "del",
            Self::Exists { .. } => "exists",
            Self::Expire { .. } => "expire",
            Self::Hget { .. } => "hget",
            Self::Hset { .. } => "hset",
            Self::Sadd { .. } => "sadd",
            Self::Members { .. } => "members",
        }
    }
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn render(value: Option<&Value>) -> Result<String> {
    Ok(match value {
        Some(v) => serde_json::to_string_pretty(v)?,
        None => "(nil)".to_string(),
    })
}

/// Execute `command` against `cache` and return the reply text.
///
/// # Errors
///
/// Propagates cache errors unchanged, except that a missing hash field
/// renders as `(nil)`.
pub async fn run(cache: &CacheService, command: &Command) -> Result<String> {
    let reply = match command {
        Command::Ping => {
            cache.client().ping().await?;
            "PONG".to_string()
        }
        Command::Get { key } => render(cache.get_opt::<Value>(key).await?.as_ref())?,
        Command::Set { key, value, ttl } => {
            let ttl = ttl.map(Duration::from_secs);
            cache.set(key, &parse_value(value), ttl).await?;
            "OK".to_string()
        }
        Command::Del { keys } => {
            let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
            format!("(integer) {}", cache.delete(&keys).await?)
        }
        Command::Exists { key } => cache.exists(key).await?.to_string(),
        Command::Expire { key, seconds } => cache
            .set_expire(key, Duration::from_secs(*seconds))
            .await?
            .to_string(),
        Command::Hget { key, field } => match cache.hget::<Value>(key, field).await {
            Ok(value) => render(Some(&value))?,
            Err(e) if e.is_miss() => render(None)?,
            Err(e) => return Err(e.into()),
        },
        Command::Hset { key, field, value } => {
            cache.hset(key, field, &parse_value(value)).await?;
            "OK".to_string()
        }
        Command::Sadd { key, members } => {
            let members: Vec<&str> = members.iter().map(String::as_str).collect();
            format!("(integer) {}", cache.sadd(key, &members).await?)
        }
        Command::Members { key } => {
            let mut members = cache.smembers(key).await?;
            members.sort();
            if members.is_empty() {
                "(empty set)".to_string()
            } else {
                members.join("\n")
            }
        }
    };
    Ok(reply)
}
