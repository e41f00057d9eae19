//! Deterministic cache-key construction and decomposition.
//!
//! Three key shapes exist:
//!
//! - primary: `<collection>:<id>` - an entity's individual cache slot
//! - secondary: `<collection>:<field>:<value>` - a query key whose cached
//!   value is the *primary key string* of the matching entity
//! - whole-collection: `<collection>:all`
//!
//! Decomposing a secondary key must be the exact inverse of constructing
//! it; invalidation and error-message generation re-derive `(field, value)`
//! from the key string.

use std::fmt::Display;

/// Suffix of the whole-collection key.
const ALL_SUFFIX: &str = "all";

/// Primary cache key for an entity: `lowercase(collection):id`.
pub fn primary(collection: &str, id: &impl Display) -> String {
    format!("{}:{}", collection.to_lowercase(), id)
}

/// Secondary (query) cache key: `lowercase(collection):field:value`.
pub fn secondary(collection: &str, field: &str, value: &impl Display) -> String {
    format!("{}:{}:{}", collection.to_lowercase(), field, value)
}

/// Whole-collection cache key: `lowercase(collection):all`.
pub fn all_records(collection: &str) -> String {
    format!("{}:{}", collection.to_lowercase(), ALL_SUFFIX)
}

/// Decompose a secondary key into `(collection, field, value)`.
///
/// Exact inverse of [`secondary`]: splits on the first two `:` so a value
/// containing `:` survives the round trip. Returns `None` when the key does
/// not have three parts.
pub fn split_secondary(key: &str) -> Option<(&str, &str, &str)> {
    let mut parts = key.splitn(3, ':');
    let collection = parts.next()?;
    let field = parts.next()?;
    let value = parts.next()?;
    Some((collection, field, value))
}
