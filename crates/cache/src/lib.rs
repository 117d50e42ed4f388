//! TTL keyed stores for the Solace pipeline.
//!
//! Three caches hang off the pipeline: compiled prompt templates (24 h,
//! with an eager sweeper), full generated responses (5 min), and intent
//! classifications (2 min). All are instances of [`TtlCache`].
//!
//! Caches are constructor-injected services, never global singletons,
//! so tests get isolated instances. Expiry is passive on read; template
//! caches additionally run an eager sweeper task. Caches are
//! process-local; no cross-process coherency is assumed.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Time source, injectable for deterministic tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock tests can advance by hand.
pub struct ManualClock {
    now: std::sync::RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self { now: std::sync::RwLock::new(now) }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().expect("clock lock poisoned");
        *now += ChronoDuration::from_std(by).unwrap_or_else(|_| ChronoDuration::zero());
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().expect("clock lock poisoned")
    }
}

struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// A TTL cache keyed by string.
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    ttl: ChronoDuration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone + Send + Sync> TtlCache<V> {
    /// A cache with the given TTL on the system clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// A cache with an injected clock.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        // Out-of-range TTLs collapse to "effectively forever".
        let ttl = ChronoDuration::from_std(ttl).unwrap_or_else(|_| ChronoDuration::days(36_500));
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Look up a key. Expired entries are evicted on read.
    pub async fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        // Entry was expired under the read lock; re-check and evict
        // under the write lock (a writer may have refreshed it since).
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert a value with `expires_at = now + ttl`.
    pub async fn insert(&self, key: impl Into<String>, value: V) {
        let expires_at = self.clock.now() + self.ttl;
        self.entries
            .write()
            .await
            .insert(key.into(), CacheEntry { value, expires_at });
    }

    pub async fn remove(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

/// Start an eager sweeper for a cache (used for template caches; the
/// short-lived caches rely on passive expiry alone).
pub fn spawn_sweeper<V>(cache: Arc<TtlCache<V>>, every: Duration) -> tokio::task::JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let purged = cache.purge_expired().await;
            if purged > 0 {
                debug!(purged, "Cache sweeper evicted expired entries");
            }
        }
    })
}

/// A stable cache key: sha256 over the normalized (trimmed, lowercased)
/// parts, joined with a separator so part boundaries stay unambiguous.
pub fn stable_key(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.trim().to_lowercase().as_bytes());
        hasher.update([0x1f]);
    }
    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual() -> (Arc<ManualClock>, TtlCache<String>) {
        let clock = Arc::new(ManualClock::starting_at(Utc::now()));
        let cache = TtlCache::with_clock(Duration::from_secs(60), clock.clone() as Arc<dyn Clock>);
        (clock, cache)
    }

    #[tokio::test]
    async fn insert_and_get() {
        let (_clock, cache) = manual();
        cache.insert("k", "v".to_string()).await;
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn passive_expiry_on_read() {
        let (clock, cache) = manual();
        cache.insert("k", "v".to_string()).await;

        clock.advance(Duration::from_secs(61));
        assert!(cache.get("k").await.is_none());
        // The expired entry was evicted, not just hidden.
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn entry_valid_just_under_ttl() {
        let (clock, cache) = manual();
        cache.insert("k", "v".to_string()).await;
        clock.advance(Duration::from_secs(59));
        assert!(cache.get("k").await.is_some());
    }

    #[tokio::test]
    async fn purge_removes_only_expired() {
        let (clock, cache) = manual();
        cache.insert("old", "a".to_string()).await;
        clock.advance(Duration::from_secs(45));
        cache.insert("new", "b".to_string()).await;
        clock.advance(Duration::from_secs(20));

        let purged = cache.purge_expired().await;
        assert_eq!(purged, 1);
        assert!(cache.get("new").await.is_some());
    }

    #[tokio::test]
    async fn reinsert_refreshes_expiry() {
        let (clock, cache) = manual();
        cache.insert("k", "v1".to_string()).await;
        clock.advance(Duration::from_secs(45));
        cache.insert("k", "v2".to_string()).await;
        clock.advance(Duration::from_secs(45));
        assert_eq!(cache.get("k").await.as_deref(), Some("v2"));
    }

    #[test]
    fn stable_key_normalizes() {
        assert_eq!(stable_key(&["  Hello ", "World"]), stable_key(&["hello", "world"]));
        assert_ne!(stable_key(&["ab", "c"]), stable_key(&["a", "bc"]));
    }

    #[test]
    fn stable_key_is_hex_sha256() {
        let key = stable_key(&["x"]);
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn sweeper_evicts_in_background() {
        tokio::time::pause();
        let clock = Arc::new(ManualClock::starting_at(Utc::now()));
        let cache = Arc::new(TtlCache::<String>::with_clock(
            Duration::from_secs(1),
            clock.clone() as Arc<dyn Clock>,
        ));
        cache.insert("k", "v".to_string()).await;

        clock.advance(Duration::from_secs(2));
        let handle = spawn_sweeper(cache.clone(), Duration::from_secs(5));
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_secs(6)).await;
        tokio::task::yield_now().await;

        assert_eq!(cache.len().await, 0);
        handle.abort();
    }
}
