//! The cache adapter contract.

use std::time::Duration;

use crate::error::ServiceError;

/// Thin interface over a TTL-capable key-value store.
///
/// Misses are `None`, never errors: the service branches on the `Option`
/// and falls back to the backing store. No cross-key transactionality is
/// assumed; concurrent writers to the same key race with last-put-wins.
pub trait CacheStore<V: Clone> {
    /// Get the value at `key`, or `None` if absent or expired.
    fn get(&self, key: &str) -> Option<V>;

    /// Store `value` at `key` with the given time-to-live.
    fn put(&self, key: &str, value: V, ttl: Duration);

    /// Store `value` at `key` without expiration.
    fn put_forever(&self, key: &str, value: V);

    /// Remove the value at `key`, if any.
    fn forget(&self, key: &str);

    /// Read-through: return the cached value, or invoke `producer`, store
    /// its result with `ttl`, and return it. Producer errors are not cached.
    fn remember<F>(&self, key: &str, ttl: Duration, producer: F) -> Result<V, ServiceError>
    where
        F: FnOnce() -> Result<V, ServiceError>,
        Self: Sized,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = producer()?;
        self.put(key, value.clone(), ttl);
        Ok(value)
    }

    /// Like [`remember`](Self::remember), without expiration.
    fn remember_forever<F>(&self, key: &str, producer: F) -> Result<V, ServiceError>
    where
        F: FnOnce() -> Result<V, ServiceError>,
        Self: Sized,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = producer()?;
        self.put_forever(key, value.clone());
        Ok(value)
    }
}
