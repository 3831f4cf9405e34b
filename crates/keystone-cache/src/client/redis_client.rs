//! # Redis Client Adapter
//!
//! Thin pass-through from the [`Client`] trait to the `redis` driver.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use std::time::Duration;

use super::Client;
use crate::config::RedisConfig;
use crate::error::{CacheError, Result};

/// Redis client over a multiplexed, auto-reconnecting connection
#[derive(Clone)]
pub struct RedisClient {
    conn: ConnectionManager,
    addr: String,
}

impl RedisClient {
    /// Connect and verify the server answers a PING within
    /// `config.connect_timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Connection`] if the server refuses or fails the
    /// handshake, or [`CacheError::ConnectTimeout`] if it does not answer in time.
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let addr = config.addr();
        let info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(config.host.clone(), config.port),
            redis: RedisConnectionInfo {
                db: config.db,
                password: config.password.clone(),
                ..Default::default()
            },
        };

        let client = redis::Client::open(info).map_err(|source| CacheError::Connection {
            addr: addr.clone(),
            source,
        })?;

        // One plain connection and one PING before handing over to the
        // manager, whose own first connect retries with backoff.
        let handshake = async {
            let mut first = client.get_multiplexed_async_connection().await?;
            let _: String = redis::cmd("PING").query_async(&mut first).await?;
            ConnectionManager::new(client).await
        };

        let conn = match tokio::time::timeout(config.connect_timeout, handshake).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(source)) => return Err(CacheError::Connection { addr, source }),
            Err(_) => {
                return Err(CacheError::ConnectTimeout {
                    addr,
                    timeout: config.connect_timeout,
                });
            }
        };

        tracing::info!(%addr, db = config.db, "Redis connected");
        Ok(Self { conn, addr })
    }

    /// Get raw connection for advanced operations
    pub fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }

    /// Server address this client was built for
    pub fn addr(&self) -> &str {
        &self.addr
    }
}

/// Millisecond TTL for PSETEX/PEXPIRE; sub-millisecond durations round up.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl Client for RedisClient {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        Ok(conn.get(key).await?)
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn.clone();
        match ttl.filter(|t| !t.is_zero()) {
            Some(ttl) => conn.pset_ex::<_, _, ()>(key, value, ttl_millis(ttl)).await?,
            None => conn.set::<_, _, ()>(key, value).await?,
        }
        Ok(())
    }

    async fn del(&self, keys: &[&str]) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn.clone();
        Ok(conn.del(keys).await?)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        Ok(conn.exists(key).await?)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let mut conn = self.conn.clone();
        let millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        Ok(conn.pexpire(key, millis).await?)
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        Ok(conn.hget(key, field).await?)
    }

    async fn hset(&self, key: &str, field: &str, value: String) -> Result<bool> {
        let mut conn = self.conn.clone();
        let created: i64 = conn.hset(key, field, value).await?;
        Ok(created > 0)
    }

    async fn hdel(&self, key: &str, fields: &[&str]) -> Result<u64> {
        if fields.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn.clone();
        Ok(conn.hdel(key, fields).await?)
    }

    async fn hexists(&self, key: &str, field: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        Ok(conn.hexists(key, field).await?)
    }

    async fn sadd(&self, key: &str, members: &[&str]) -> Result<u64> {
        if members.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn.clone();
        Ok(conn.sadd(key, members).await?)
    }

    async fn srem(&self, key: &str, members: &[&str]) -> Result<u64> {
        if members.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn.clone();
        Ok(conn.srem(key, members).await?)
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        Ok(conn.smembers(key).await?)
    }

    async fn zadd(&self, key: &str, members: &[(f64, &str)]) -> Result<u64> {
        if members.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn.clone();
        Ok(conn.zadd_multiple(key, members).await?)
    }

    async fn zrem(&self, key: &str, members: &[&str]) -> Result<u64> {
        if members.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn.clone();
        Ok(conn.zrem(key, members).await?)
    }

    async fn zrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        Ok(conn.zrange(key, start, stop).await?)
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
