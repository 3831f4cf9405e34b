//! # In-Memory Client
//!
//! Process-local [`Client`] with Redis-like typing and lazy TTL expiry.
//! Deadlines are measured with `tokio::time::Instant`, so a paused tokio
//! clock drives expiry deterministically in tests.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::Client;
use crate::error::{CacheError, Result};

#[derive(Debug, Clone)]
enum Value {
    String(String),
    Hash(HashMap<String, String>),
    Set(BTreeSet<String>),
    SortedSet(Vec<(f64, String)>),
}

impl Value {
    const fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Hash(_) => "hash",
            Self::Set(_) => "set",
            Self::SortedSet(_) => "zset",
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::String(_) => false,
            Self::Hash(h) => h.is_empty(),
            Self::Set(s) => s.is_empty(),
            Self::SortedSet(z) => z.is_empty(),
        }
    }
}

#[derive(Debug)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-memory key-value store
#[derive(Debug, Default)]
pub struct MemoryClient {
    entries: Mutex<HashMap<String, Entry>>,
}

fn wrong_type(key: &str, expected: &'static str, actual: &Value) -> CacheError {
    CacheError::WrongType {
        key: key.to_string(),
        expected,
        actual: actual.type_name(),
    }
}

/// Drop `key` if its deadline has passed.
fn purge(entries: &mut HashMap<String, Entry>, key: &str) {
    let now = Instant::now();
    if entries.get(key).is_some_and(|e| e.is_expired(now)) {
        entries.remove(key);
    }
}

/// Remove collections left empty by a delete, as Redis does.
fn drop_if_empty(entries: &mut HashMap<String, Entry>, key: &str) {
    if entries.get(key).is_some_and(|e| e.value.is_empty()) {
        entries.remove(key);
    }
}

macro_rules! typed_mut {
    ($entries:expr, $key:expr, $variant:ident, $name:literal, $init:expr) => {{
        let entry = $entries.entry($key.to_string()).or_insert_with(|| Entry {
            value: Value::$variant($init),
            expires_at: None,
        });
        match &mut entry.value {
            Value::$variant(inner) => inner,
            other => return Err(wrong_type($key, $name, other)),
        }
    }};
}

impl MemoryClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.lock().await;
        entries.values().filter(|e| !e.is_expired(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remaining time to live, `None` for missing or persistent keys
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let mut entries = self.entries.lock().await;
        purge(&mut entries, key);
        entries
            .get(key)?
            .expires_at
            .map(|at| at.saturating_duration_since(Instant::now()))
    }
}

/// Deadline `ttl` from now; `None` when it lies beyond what `Instant` can
/// represent, which is as good as never expiring.
fn deadline(ttl: Duration) -> Option<Instant> {
    Instant::now().checked_add(ttl)
}

/// Resolve Redis-style inclusive, possibly negative, range bounds.
fn resolve_range(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = isize::try_from(len).ok()?;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if len == 0 || start > stop || start >= len {
        return None;
    }
    Some((start.unsigned_abs(), stop.unsigned_abs()))
}

#[async_trait]
impl Client for MemoryClient {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().await;
        purge(&mut entries, key);
        match entries.get(key).map(|e| &e.value) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(wrong_type(key, "string", other)),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<()> {
        let expires_at = ttl.filter(|t| !t.is_zero()).and_then(deadline);
        self.entries.lock().await.insert(
            key.to_string(),
            Entry {
                value: Value::String(value),
                expires_at,
            },
        );
        Ok(())
    }

    async fn del(&self, keys: &[&str]) -> Result<u64> {
        let mut entries = self.entries.lock().await;
        let mut removed = 0;
        for key in keys {
            purge(&mut entries, key);
            if entries.remove(*key).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.lock().await;
        purge(&mut entries, key);
        Ok(entries.contains_key(key))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let mut entries = self.entries.lock().await;
        purge(&mut entries, key);
        if ttl.is_zero() {
            return Ok(entries.remove(key).is_some());
        }
        match entries.get_mut(key) {
            Some(entry) => {
                entry.expires_at = deadline(ttl);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().await;
        purge(&mut entries, key);
        match entries.get(key).map(|e| &e.value) {
            None => Ok(None),
            Some(Value::Hash(h)) => Ok(h.get(field).cloned()),
            Some(other) => Err(wrong_type(key, "hash", other)),
        }
    }

    async fn hset(&self, key: &str, field: &str, value: String) -> Result<bool> {
        let mut entries = self.entries.lock().await;
        purge(&mut entries, key);
        let hash = typed_mut!(entries, key, Hash, "hash", HashMap::new());
        Ok(hash.insert(field.to_string(), value).is_none())
    }

    async fn hdel(&self, key: &str, fields: &[&str]) -> Result<u64> {
        let mut entries = self.entries.lock().await;
        purge(&mut entries, key);
        let removed = match entries.get_mut(key).map(|e| &mut e.value) {
            None => return Ok(0),
            Some(Value::Hash(h)) => fields.iter().filter(|f| h.remove(**f).is_some()).count(),
            Some(other) => return Err(wrong_type(key, "hash", other)),
        };
        drop_if_empty(&mut entries, key);
        Ok(removed as u64)
    }

    async fn hexists(&self, key: &str, field: &str) -> Result<bool> {
        let mut entries = self.entries.lock().await;
        purge(&mut entries, key);
        match entries.get(key).map(|e| &e.value) {
            None => Ok(false),
            Some(Value::Hash(h)) => Ok(h.contains_key(field)),
            Some(other) => Err(wrong_type(key, "hash", other)),
        }
    }

    async fn sadd(&self, key: &str, members: &[&str]) -> Result<u64> {
        if members.is_empty() {
            return Ok(0);
        }
        let mut entries = self.entries.lock().await;
        purge(&mut entries, key);
        let set = typed_mut!(entries, key, Set, "set", BTreeSet::new());
        let added = members
            .iter()
            .filter(|m| set.insert((**m).to_string()))
            .count();
        Ok(added as u64)
    }

    async fn srem(&self, key: &str, members: &[&str]) -> Result<u64> {
        let mut entries = self.entries.lock().await;
        purge(&mut entries, key);
        let removed = match entries.get_mut(key).map(|e| &mut e.value) {
            None => return Ok(0),
            Some(Value::Set(s)) => members.iter().filter(|m| s.remove(**m)).count(),
            Some(other) => return Err(wrong_type(key, "set", other)),
        };
        drop_if_empty(&mut entries, key);
        Ok(removed as u64)
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        let mut entries = self.entries.lock().await;
        purge(&mut entries, key);
        match entries.get(key).map(|e| &e.value) {
            None => Ok(Vec::new()),
            Some(Value::Set(s)) => Ok(s.iter().cloned().collect()),
            Some(other) => Err(wrong_type(key, "set", other)),
        }
    }

    async fn zadd(&self, key: &str, members: &[(f64, &str)]) -> Result<u64> {
        if members.is_empty() {
            return Ok(0);
        }
        let mut entries = self.entries.lock().await;
        purge(&mut entries, key);
        let zset = typed_mut!(entries, key, SortedSet, "zset", Vec::new());
        let mut added = 0;
        for (score, member) in members {
            match zset.iter_mut().find(|entry| entry.1 == *member) {
                Some(existing) => existing.0 = *score,
                None => {
                    zset.push((*score, (*member).to_string()));
                    added += 1;
                }
            }
        }
        zset.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        Ok(added)
    }

    async fn zrem(&self, key: &str, members: &[&str]) -> Result<u64> {
        let mut entries = self.entries.lock().await;
        purge(&mut entries, key);
        let removed = match entries.get_mut(key).map(|e| &mut e.value) {
            None => return Ok(0),
            Some(Value::SortedSet(z)) => {
                let before = z.len();
                z.retain(|(_, m)| !members.contains(&m.as_str()));
                before - z.len()
            }
            Some(other) => return Err(wrong_type(key, "zset", other)),
        };
        drop_if_empty(&mut entries, key);
        Ok(removed as u64)
    }

    async fn zrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        let mut entries = self.entries.lock().await;
        purge(&mut entries, key);
        match entries.get(key).map(|e| &e.value) {
            None => Ok(Vec::new()),
            Some(Value::SortedSet(z)) => Ok(resolve_range(z.len(), start, stop)
                .map(|(from, to)| z[from..=to].iter().map(|(_, m)| m.clone()).collect())
                .unwrap_or_default()),
            Some(other) => Err(wrong_type(key, "zset", other)),
        }
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_string_lifecycle() {
        let client = MemoryClient::new();

        assert_eq!(client.get("k").await.unwrap(), None);
        client.set("k", "v".into(), None).await.unwrap();
        assert_eq!(client.get("k").await.unwrap().as_deref(), Some("v"));
        assert!(client.exists("k").await.unwrap());

        assert_eq!(client.del(&["k", "missing"]).await.unwrap(), 1);
        assert!(!client.exists("k").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry() {
        let client = MemoryClient::new();
        client
            .set("session", "abc".into(), Some(Duration::from_secs(30)))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(client.exists("session").await.unwrap());
        assert_eq!(client.ttl("session").await, Some(Duration::from_secs(1)));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!client.exists("session").await.unwrap());
        assert!(client.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expire_existing_and_missing() {
        let client = MemoryClient::new();
        client.sadd("roles", &["admin"]).await.unwrap();

        assert!(client.expire("roles", Duration::from_secs(5)).await.unwrap());
        assert!(!client.expire("nope", Duration::from_secs(5)).await.unwrap());

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(client.smembers("roles").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_expire_deletes() {
        let client = MemoryClient::new();
        client.set("k", "v".into(), None).await.unwrap();
        assert!(client.expire("k", Duration::ZERO).await.unwrap());
        assert!(!client.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_huge_ttl_is_persistent() {
        let client = MemoryClient::new();
        client
            .set("k", "v".into(), Some(Duration::MAX))
            .await
            .unwrap();
        assert_eq!(client.ttl("k").await, None);

        client.set("j", "v".into(), None).await.unwrap();
        assert!(client.expire("j", Duration::MAX).await.unwrap());
        assert!(client.exists("j").await.unwrap());
        assert_eq!(client.ttl("j").await, None);
    }

    #[tokio::test]
    async fn test_wrong_type() {
        let client = MemoryClient::new();
        client.set("plain", "1".into(), None).await.unwrap();

        let err = client.sadd("plain", &["x"]).await.unwrap_err();
        assert!(matches!(
            err,
            CacheError::WrongType {
                expected: "set",
                actual: "string",
                ..
            }
        ));
        assert!(client.hget("plain", "f").await.is_err());
    }

    #[tokio::test]
    async fn test_emptied_collections_disappear() {
        let client = MemoryClient::new();
        client.hset("h", "a", "1".into()).await.unwrap();
        assert_eq!(client.hdel("h", &["a"]).await.unwrap(), 1);
        assert!(!client.exists("h").await.unwrap());

        client.sadd("s", &["x", "y"]).await.unwrap();
        assert_eq!(client.srem("s", &["x", "y", "z"]).await.unwrap(), 2);
        assert!(!client.exists("s").await.unwrap());
    }

    #[tokio::test]
    async fn test_sorted_set_ordering() {
        let client = MemoryClient::new();
        let added = client
            .zadd("board", &[(3.0, "c"), (1.0, "a"), (2.0, "b")])
            .await
            .unwrap();
        assert_eq!(added, 3);

        // Re-adding updates the score without counting as new.
        assert_eq!(client.zadd("board", &[(0.5, "c")]).await.unwrap(), 0);

        assert_eq!(client.zrange("board", 0, -1).await.unwrap(), vec!["c", "a", "b"]);
        assert_eq!(client.zrange("board", -2, -1).await.unwrap(), vec!["a", "b"]);
        assert_eq!(client.zrange("board", 1, 100).await.unwrap(), vec!["a", "b"]);
        assert!(client.zrange("board", 5, 10).await.unwrap().is_empty());

        assert_eq!(client.zrem("board", &["a", "zz"]).await.unwrap(), 1);
        assert_eq!(client.zrange("board", 0, -1).await.unwrap(), vec!["c", "b"]);
    }

    #[test]
    fn test_resolve_range() {
        assert_eq!(resolve_range(5, 0, -1), Some((0, 4)));
        assert_eq!(resolve_range(5, -10, 1), Some((0, 1)));
        assert_eq!(resolve_range(5, 3, 2), None);
        assert_eq!(resolve_range(0, 0, -1), None);
        assert_eq!(resolve_range(3, 0, -5), None);
    }
}
