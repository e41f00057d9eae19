//! Moka-backed cache store with per-entry expiration.

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::sync::Cache;

use super::CacheStore;

/// Default maximum number of entries.
const DEFAULT_CAPACITY: u64 = 10_000;

/// Internal envelope carrying each value's own time-to-live.
///
/// `ttl: None` means the entry never expires ("forever" writes).
#[derive(Clone)]
struct Entry<V> {
    value: V,
    ttl: Option<Duration>,
}

/// Expiry policy that reads the TTL stored alongside each value.
struct PerEntryExpiry;

impl<V> Expiry<String, Entry<V>> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry<V>,
        _created_at: Instant,
    ) -> Option<Duration> {
        entry.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        entry.ttl
    }
}

/// A [`CacheStore`] built on `moka::sync::Cache`.
///
/// - Thread-safe, LRU-based, with per-entry TTL
/// - Clone-friendly (cloning shares the same underlying cache)
pub struct MokaStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    inner: Cache<String, Entry<V>>,
    name: Arc<str>,
}

impl<V> Clone for MokaStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            name: Arc::clone(&self.name),
        }
    }
}

impl<V> MokaStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a named store with the default capacity.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self::with_capacity(name, DEFAULT_CAPACITY)
    }

    /// Create a named store bounded to `max_capacity` entries.
    pub fn with_capacity(name: impl Into<Arc<str>>, max_capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryExpiry)
            .build();

        Self {
            inner,
            name: name.into(),
        }
    }

    /// Get the name of this store.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of live entries.
    ///
    /// Note: may lag behind concurrent operations.
    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }

    /// Remove all entries.
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

impl<V> CacheStore<V> for MokaStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &str) -> Option<V> {
        self.inner.get(key).map(|entry| entry.value)
    }

    fn put(&self, key: &str, value: V, ttl: Duration) {
        self.inner
            .insert(key.to_string(), Entry { value, ttl: Some(ttl) });
    }

    fn put_forever(&self, key: &str, value: V) {
        self.inner.insert(key.to_string(), Entry { value, ttl: None });
    }

    fn forget(&self, key: &str) {
        self.inner.invalidate(key);
    }
}

impl<V> std::fmt::Debug for MokaStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaStore")
            .field("name", &self.name)
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[test]
    fn test_put_get_forget() {
        let store: MokaStore<String> = MokaStore::new("test");
        store.put("widgets:1", "A".into(), TTL);

        assert_eq!(store.get("widgets:1"), Some("A".to_string()));
        assert_eq!(store.get("widgets:2"), None);

        store.forget("widgets:1");
        assert_eq!(store.get("widgets:1"), None);
    }

    #[test]
    fn test_put_overwrites() {
        let store: MokaStore<i32> = MokaStore::new("test");
        store.put("k", 1, TTL);
        store.put("k", 2, TTL);
        assert_eq!(store.get("k"), Some(2));
    }

    #[test]
    fn test_entries_expire_after_ttl() {
        let store: MokaStore<i32> = MokaStore::new("test");
        store.put("short", 1, Duration::from_millis(50));
        store.put_forever("forever", 2);

        assert_eq!(store.get("short"), Some(1));
        std::thread::sleep(Duration::from_millis(150));

        assert_eq!(store.get("short"), None);
        assert_eq!(store.get("forever"), Some(2));
    }

    #[test]
    fn test_remember_caches_producer_result() {
        let store: MokaStore<i32> = MokaStore::new("test");

        let value = store.remember("k", TTL, || Ok(41)).unwrap();
        assert_eq!(value, 41);

        // Second call must not invoke the producer.
        let value = store
            .remember("k", TTL, || panic!("producer re-invoked"))
            .unwrap();
        assert_eq!(value, 41);
    }

    #[test]
    fn test_remember_does_not_cache_errors() {
        let store: MokaStore<i32> = MokaStore::new("test");

        let result = store.remember("k", TTL, || {
            Err(crate::error::ServiceError::ModelNotLoaded)
        });
        assert!(result.is_err());
        assert_eq!(store.get("k"), None);

        let value = store.remember("k", TTL, || Ok(7)).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_remember_forever_survives() {
        let store: MokaStore<i32> = MokaStore::new("test");
        let value = store.remember_forever("k", || Ok(9)).unwrap();
        assert_eq!(value, 9);
        assert_eq!(store.get("k"), Some(9));
    }

    #[test]
    fn test_clone_shares_entries() {
        let store: MokaStore<i32> = MokaStore::new("shared");
        let handle = store.clone();

        store.put("k", 1, TTL);
        assert_eq!(handle.get("k"), Some(1));
        assert_eq!(handle.name(), "shared");
    }
}
