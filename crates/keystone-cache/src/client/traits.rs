//! # Client Trait
//!
//! Command surface the cache facade needs from a key-value store.
//! Implementations can be swapped for different backends (Redis, in-memory, etc.)

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;

/// Minimal Redis-shaped command interface
///
/// Values are opaque strings here; JSON encoding happens one layer up.
#[async_trait]
pub trait Client: Send + Sync {
    // =========================================================================
    // STRINGS
    // =========================================================================

    /// GET; `None` when the key is absent
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// SET, with PSETEX semantics when a TTL is given
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<()>;

    /// DEL; number of keys removed
    async fn del(&self, keys: &[&str]) -> Result<u64>;

    /// EXISTS for a single key
    async fn exists(&self, key: &str) -> Result<bool>;

    /// PEXPIRE; `false` when the key does not exist
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool>;

    // =========================================================================
    // HASHES
    // =========================================================================

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>>;

    /// HSET; `true` when the field was newly created
    async fn hset(&self, key: &str, field: &str, value: String) -> Result<bool>;

    async fn hdel(&self, key: &str, fields: &[&str]) -> Result<u64>;

    async fn hexists(&self, key: &str, field: &str) -> Result<bool>;

    // =========================================================================
    // SETS
    // =========================================================================

    async fn sadd(&self, key: &str, members: &[&str]) -> Result<u64>;

    async fn srem(&self, key: &str, members: &[&str]) -> Result<u64>;

    async fn smembers(&self, key: &str) -> Result<Vec<String>>;

    // =========================================================================
    // SORTED SETS
    // =========================================================================

    async fn zadd(&self, key: &str, members: &[(f64, &str)]) -> Result<u64>;

    async fn zrem(&self, key: &str, members: &[&str]) -> Result<u64>;

    /// ZRANGE by index, ascending score, inclusive bounds
    async fn zrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>>;

    // =========================================================================
    // CONNECTION
    // =========================================================================

    async fn ping(&self) -> Result<()>;
}

/// Shared client handle
pub type SharedClient = Arc<dyn Client>;
