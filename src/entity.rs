//! Contract implemented by every cacheable record type.
//!
//! An entity is owned by the backing store; the cache only ever holds
//! copies of it. The contract is the minimum the service needs to derive
//! cache keys and error messages: a collection name, a stable identifier,
//! and (optionally) the relations to eager-load before caching.

use std::fmt::Display;

use crate::key;

/// A record with a stable identity that can be cached.
///
/// `collection_name` and `cacheable_relations` are associated functions so
/// the service can derive keys and load hints without an instance in hand.
pub trait Entity: Clone {
    /// Stable identifier type (`i64`, `u64`, `String`, `Uuid`...).
    type Id: Clone + PartialEq + Display;

    /// Logical collection (table) name, e.g. `"widgets"`.
    fn collection_name() -> &'static str;

    /// The entity's stable identifier.
    fn identifier(&self) -> Self::Id;

    /// Cache key of this entity's individual slot.
    ///
    /// Always `lowercase(collection):identifier`; override only if the
    /// backing store uses a non-standard slot layout.
    fn primary_cache_key(&self) -> String {
        key::primary(Self::collection_name(), &self.identifier())
    }

    /// Relations to eager-load before the entity is cached.
    fn cacheable_relations() -> &'static [&'static str] {
        &[]
    }

    /// Human-readable type name used in error messages.
    ///
    /// Defaults to the last segment of the Rust type path, so `Widget`
    /// yields `"Widget"`.
    fn model_name() -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}
