//! # Cache Service
//!
//! Typed JSON facade over a [`Client`]. Values are encoded with `serde_json`
//! on the way in and decoded into the caller's type on the way out; set
//! members and sorted-set members stay raw strings.

use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::client::{Client, SharedClient};
use crate::error::{CacheError, Result};

/// JSON cache facade
#[derive(Clone)]
pub struct CacheService {
    client: SharedClient,
}

fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key must not be empty".to_string()));
    }
    Ok(())
}

fn check_field(key: &str, field: &str) -> Result<()> {
    if field.is_empty() {
        return Err(CacheError::InvalidKey(format!(
            "hash field of {key} must not be empty"
        )));
    }
    Ok(())
}

impl CacheService {
    pub fn new(client: SharedClient) -> Self {
        Self { client }
    }

    /// Wrap a concrete client
    pub fn from_client(client: impl Client + 'static) -> Self {
        Self::new(Arc::new(client))
    }

    /// Underlying client, for commands the facade does not cover
    pub fn client(&self) -> &SharedClient {
        &self.client
    }

    // =========================================================================
    // BASIC OPERATIONS
    // =========================================================================

    /// Store `value` as JSON under `key`.
    ///
    /// `None` or a zero TTL stores the value without expiry.
    ///
    /// # Errors
    ///
    /// Fails if the key is empty, the value does not serialize, or the store
    /// rejects the write.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        check_key(key)?;
        let json = serde_json::to_string(value)?;
        self.client.set(key, json, ttl).await?;
        debug!(key, ttl = ?ttl, "Cached value");
        Ok(())
    }

    /// Fetch and decode the value under `key`.
    ///
    /// # Errors
    ///
    /// [`CacheError::Miss`] if the key is absent, [`CacheError::Serialization`]
    /// if the stored JSON does not fit `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        self.get_opt(key)
            .await?
            .ok_or_else(|| CacheError::Miss(key.to_string()))
    }

    /// Like [`get`](Self::get) but absence is `Ok(None)`.
    pub async fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        check_key(key)?;
        match self.client.get(key).await? {
            Some(json) => {
                debug!(key, "Cache hit");
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => {
                debug!(key, "Cache miss");
                Ok(None)
            }
        }
    }

    /// Delete keys; returns how many existed.
    pub async fn delete(&self, keys: &[&str]) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        for key in keys {
            check_key(key)?;
        }
        let deleted = self.client.del(keys).await?;
        debug!(requested = keys.len(), deleted, "Deleted keys");
        Ok(deleted)
    }

    pub async fn exists(&self, key: &str) -> Result<bool> {
        check_key(key)?;
        self.client.exists(key).await
    }

    /// Reset the TTL of an existing key. A zero TTL expires it immediately.
    ///
    /// Returns `false` when the key does not exist.
    pub async fn set_expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        check_key(key)?;
        let applied = self.client.expire(key, ttl).await?;
        debug!(key, ttl = ?ttl, applied, "Updated expiry");
        Ok(applied)
    }

    // =========================================================================
    // HASH OPERATIONS
    // =========================================================================

    /// Store `value` as JSON in `field` of the hash at `key`.
    pub async fn hset<T: Serialize + ?Sized>(&self, key: &str, field: &str, value: &T) -> Result<()> {
        check_key(key)?;
        check_field(key, field)?;
        let json = serde_json::to_string(value)?;
        self.client.hset(key, field, json).await?;
        debug!(key, field, "Cached hash field");
        Ok(())
    }

    /// Fetch and decode `field` of the hash at `key`.
    ///
    /// # Errors
    ///
    /// [`CacheError::FieldMiss`] if the key or field is absent.
    pub async fn hget<T: DeserializeOwned>(&self, key: &str, field: &str) -> Result<T> {
        check_key(key)?;
        check_field(key, field)?;
        match self.client.hget(key, field).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => {
                debug!(key, field, "Hash field miss");
                Err(CacheError::FieldMiss {
                    key: key.to_string(),
                    field: field.to_string(),
                })
            }
        }
    }

    pub async fn hdelete(&self, key: &str, fields: &[&str]) -> Result<u64> {
        check_key(key)?;
        if fields.is_empty() {
            return Ok(0);
        }
        self.client.hdel(key, fields).await
    }

    pub async fn hexists(&self, key: &str, field: &str) -> Result<bool> {
        check_key(key)?;
        check_field(key, field)?;
        self.client.hexists(key, field).await
    }

    // =========================================================================
    // SET OPERATIONS
    // =========================================================================

    /// Add raw string members; returns how many were new.
    pub async fn sadd(&self, key: &str, members: &[&str]) -> Result<u64> {
        check_key(key)?;
        if members.is_empty() {
            return Ok(0);
        }
        self.client.sadd(key, members).await
    }

    pub async fn sremove(&self, key: &str, members: &[&str]) -> Result<u64> {
        check_key(key)?;
        if members.is_empty() {
            return Ok(0);
        }
        self.client.srem(key, members).await
    }

    /// All members, in no particular order; empty when the key is absent.
    pub async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        check_key(key)?;
        self.client.smembers(key).await
    }

    // =========================================================================
    // SORTED SET OPERATIONS
    // =========================================================================

    pub async fn zadd(&self, key: &str, members: &[(f64, &str)]) -> Result<u64> {
        check_key(key)?;
        if members.is_empty() {
            return Ok(0);
        }
        self.client.zadd(key, members).await
    }

    pub async fn zremove(&self, key: &str, members: &[&str]) -> Result<u64> {
        check_key(key)?;
        if members.is_empty() {
            return Ok(0);
        }
        self.client.zrem(key, members).await
    }

    /// Members by ascending score between inclusive indices `start..=stop`.
    /// Negative indices count from the end.
    pub async fn zrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        check_key(key)?;
        self.client.zrange(key, start, stop).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MemoryClient;
    use fake::{Dummy, Fake, Faker};
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Dummy)]
    struct Session {
        user_id: u64,
        username: String,
        roles: Vec<String>,
        attributes: BTreeMap<String, String>,
        last_seen: Option<i64>,
    }

    fn service() -> CacheService {
        CacheService::from_client(MemoryClient::new())
    }

    #[tokio::test]
    async fn test_round_trip_structs() {
        let cache = service();

        for i in 0..25 {
            let session: Session = Faker.fake();
            let key = format!("session:{i}");
            cache.set(&key, &session, None).await.unwrap();

            let back: Session = cache.get(&key).await.unwrap();
            assert_eq!(back, session);
        }
    }

    #[tokio::test]
    async fn test_round_trip_scalars() {
        let cache = service();

        cache.set("n", &42_i64, None).await.unwrap();
        cache.set("s", "hello", None).await.unwrap();
        cache.set("v", &vec![1.5_f64, -2.0], None).await.unwrap();
        cache.set("unit", &(), None).await.unwrap();

        assert_eq!(cache.get::<i64>("n").await.unwrap(), 42);
        assert_eq!(cache.get::<String>("s").await.unwrap(), "hello");
        assert_eq!(cache.get::<Vec<f64>>("v").await.unwrap(), vec![1.5, -2.0]);
        cache.get::<()>("unit").await.unwrap();
    }

    #[tokio::test]
    async fn test_get_missing_key_is_miss() {
        let cache = service();

        let err = cache.get::<String>("absent").await.unwrap_err();
        assert!(matches!(err, CacheError::Miss(ref k) if k == "absent"));
        assert_eq!(cache.get_opt::<String>("absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_wrong_shape_is_serialization_error() {
        let cache = service();
        cache.set("n", &"not a number", None).await.unwrap();

        let err = cache.get::<u32>("n").await.unwrap_err();
        assert!(matches!(err, CacheError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let cache = service();

        assert!(matches!(
            cache.set("", &1, None).await,
            Err(CacheError::InvalidKey(_))
        ));
        assert!(matches!(cache.exists("").await, Err(CacheError::InvalidKey(_))));
        assert!(matches!(
            cache.delete(&["ok", ""]).await,
            Err(CacheError::InvalidKey(_))
        ));
        assert!(matches!(
            cache.hset("h", "", &1).await,
            Err(CacheError::InvalidKey(_))
        ));
        assert!(matches!(
            cache.sadd("", &["m"]).await,
            Err(CacheError::InvalidKey(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expires_value() {
        let cache = service();
        cache
            .set("token", &"abc", Some(Duration::from_secs(60)))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get::<String>("token").await.unwrap(), "abc");

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get::<String>("token").await.unwrap_err().is_miss());
        assert!(!cache.exists("token").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_means_no_expiry() {
        let cache = service();
        cache.set("k", &1, Some(Duration::ZERO)).await.unwrap();

        tokio::time::advance(Duration::from_secs(86_400)).await;
        assert!(cache.exists("k").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_expire() {
        let cache = service();
        cache.set("k", &1, None).await.unwrap();

        assert!(cache.set_expire("k", Duration::from_millis(500)).await.unwrap());
        assert!(!cache.set_expire("missing", Duration::from_secs(1)).await.unwrap());

        tokio::time::advance(Duration::from_millis(500)).await;
        assert!(!cache.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_unrepresentable_ttl_never_expires() {
        let cache = service();
        cache.set("forever", &"x", Some(Duration::MAX)).await.unwrap();
        cache.set("later", &"y", None).await.unwrap();

        assert!(cache.set_expire("later", Duration::from_secs(u64::MAX)).await.unwrap());

        assert_eq!(cache.get::<String>("forever").await.unwrap(), "x");
        assert_eq!(cache.get::<String>("later").await.unwrap(), "y");
    }

    #[tokio::test]
    async fn test_delete_counts_existing_keys() {
        let cache = service();
        cache.set("a", &1, None).await.unwrap();
        cache.set("b", &2, None).await.unwrap();

        assert_eq!(cache.delete(&[]).await.unwrap(), 0);
        assert_eq!(cache.delete(&["a", "b", "c"]).await.unwrap(), 2);
        assert!(!cache.exists("a").await.unwrap());
    }

    #[tokio::test]
    async fn test_hash_operations() {
        let cache = service();
        let session: Session = Faker.fake();

        cache.hset("user:1", "session", &session).await.unwrap();
        cache.hset("user:1", "theme", "dark").await.unwrap();

        assert!(cache.hexists("user:1", "session").await.unwrap());
        assert_eq!(cache.hget::<Session>("user:1", "session").await.unwrap(), session);
        assert_eq!(cache.hget::<String>("user:1", "theme").await.unwrap(), "dark");

        assert_eq!(cache.hdelete("user:1", &["theme", "nope"]).await.unwrap(), 1);
        assert!(!cache.hexists("user:1", "theme").await.unwrap());

        let err = cache.hget::<String>("user:1", "theme").await.unwrap_err();
        assert!(matches!(err, CacheError::FieldMiss { ref field, .. } if field == "theme"));
        assert!(cache.hget::<String>("user:2", "x").await.unwrap_err().is_miss());
    }

    #[tokio::test]
    async fn test_set_operations_have_no_duplicates() {
        let cache = service();

        assert_eq!(cache.sadd("perms", &["read", "write", "read"]).await.unwrap(), 2);
        assert_eq!(cache.sadd("perms", &["write", "admin"]).await.unwrap(), 1);

        let mut members = cache.smembers("perms").await.unwrap();
        members.sort();
        assert_eq!(members, vec!["admin", "read", "write"]);

        assert_eq!(cache.sremove("perms", &["admin", "ghost"]).await.unwrap(), 1);
        let mut members = cache.smembers("perms").await.unwrap();
        members.sort();
        assert_eq!(members, vec!["read", "write"]);

        assert!(cache.smembers("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sorted_set_operations() {
        let cache = service();

        cache
            .zadd("scores", &[(20.0, "bob"), (10.0, "alice"), (30.0, "carol")])
            .await
            .unwrap();
        assert_eq!(cache.zrange("scores", 0, 1).await.unwrap(), vec!["alice", "bob"]);

        assert_eq!(cache.zremove("scores", &["bob"]).await.unwrap(), 1);
        assert_eq!(cache.zrange("scores", 0, -1).await.unwrap(), vec!["alice", "carol"]);
    }

    #[tokio::test]
    async fn test_type_conflict_is_passed_through() {
        let cache = service();
        cache.set("plain", &"value", None).await.unwrap();

        let err = cache.sadd("plain", &["x"]).await.unwrap_err();
        assert!(matches!(err, CacheError::WrongType { .. }));
    }
}
