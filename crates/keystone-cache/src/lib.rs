//! # Keystone Cache Library
//!
//! Typed JSON caching over a Redis-compatible key-value store.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Application Layer                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      CacheService                            │
//! │        (key checks, JSON encode/decode, miss mapping)        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Client trait                             │
//! └─────────────────────────────────────────────────────────────┘
//!                    │                   │
//!                    ▼                   ▼
//! ┌─────────────────────────┐   ┌──────────────────────────────┐
//! │      RedisClient        │   │        MemoryClient          │
//! │  (ConnectionManager)    │   │   (in-process, tokio clock)  │
//! └─────────────────────────┘   └──────────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - `redis`: Enable the Redis client adapter (default)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use keystone_cache::{CacheService, RedisClient, RedisConfig};
//!
//! let client = RedisClient::connect(&RedisConfig::from_env()?).await?;
//! let cache = CacheService::from_client(client);
//!
//! cache.set("user:42", &user, Some(Duration::from_secs(300))).await?;
//! let user: User = cache.get("user:42").await?;
//!
//! cache.sadd("user:42:roles", &["admin", "editor"]).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod service;

// Re-export commonly used types
#[cfg(feature = "redis")]
pub use client::RedisClient;
pub use client::{Client, MemoryClient, SharedClient};
pub use config::{DEFAULT_CONNECT_TIMEOUT, RedisConfig};
pub use error::{CacheError, Result};
pub use service::CacheService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Connect to Redis with configuration from the environment
///
/// # Errors
///
/// Returns an error if the configuration is malformed or Redis is unreachable.
#[cfg(feature = "redis")]
pub async fn init_from_env() -> Result<CacheService> {
    let config = RedisConfig::from_env()?;
    let client = RedisClient::connect(&config).await?;
    Ok(CacheService::from_client(client))
}
