//! Cache adapter - thin interface over a TTL key-value store.
//!
//! The service talks to the cache exclusively through the [`CacheStore`]
//! trait, so any TTL-capable key-value backend (in-process, Redis, ...) can
//! sit behind it. Cached payloads are typed via [`CacheValue`]: an entity
//! snapshot, a reference (the primary key string a secondary key points at),
//! or a whole collection snapshot.
//!
//! [`MokaStore`] is the bundled implementation, built on `moka::sync::Cache`
//! with a per-entry expiration policy.

mod moka;
mod store;

pub use moka::MokaStore;
pub use store::CacheStore;

/// A cached payload.
///
/// Secondary (query) keys never store the entity itself; they store the
/// entity's primary key string (`Reference`), so the payload lives in exactly
/// one slot. A value of the wrong variant at a key is treated as a miss.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue<T> {
    /// An individual entity snapshot, stored under its primary key.
    Entity(T),
    /// A primary key string, stored under a secondary (query) key.
    Reference(String),
    /// An ordered collection snapshot.
    Collection(Vec<T>),
}

impl<T> CacheValue<T> {
    /// The entity snapshot, if this is an `Entity` value.
    pub fn into_entity(self) -> Option<T> {
        match self {
            Self::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// The referenced primary key, if this is a `Reference` value.
    pub fn into_reference(self) -> Option<String> {
        match self {
            Self::Reference(key) => Some(key),
            _ => None,
        }
    }

    /// The collection snapshot, if this is a `Collection` value.
    pub fn into_collection(self) -> Option<Vec<T>> {
        match self {
            Self::Collection(items) => Some(items),
            _ => None,
        }
    }
}
