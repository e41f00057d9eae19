//! Backing-store adapter - the seam to the authoritative record store.
//!
//! The service never talks to a database driver directly; it goes through
//! [`BackingStore`]. Adapters return `anyhow::Result` so any driver error
//! propagates unchanged (it surfaces at the service as a `Store` failure and
//! is never recovered locally).
//!
//! [`MemoryStore`] is the bundled in-memory implementation, used by the test
//! suite and as a template for real adapters.

mod memory;

pub use memory::MemoryStore;

use anyhow::Result;

use crate::entity::Entity;

/// ORM-style record store consumed by the service.
///
/// The `relations` arguments are eager-load hints; stores that keep whole
/// rows (or have no relation concept) may ignore them. Write methods return
/// `Ok(false)` when the store itself reports the operation failed, e.g. no
/// matching row for an update.
pub trait BackingStore<E: Entity> {
    /// Find one entity by identifier.
    fn find_by_id(&self, id: &E::Id, relations: &[&str]) -> Result<Option<E>>;

    /// Find the first entity with `field = value`.
    fn find_one_by_field(&self, field: &str, value: &str, relations: &[&str])
    -> Result<Option<E>>;

    /// Find all entities with `field = value`.
    fn find_all_by_field(&self, field: &str, value: &str) -> Result<Vec<E>>;

    /// Load every entity in the collection.
    fn find_all(&self, relations: &[&str]) -> Result<Vec<E>>;

    /// Persist a new entity.
    fn save(&self, entity: &E) -> Result<bool>;

    /// Persist changes to an existing entity.
    fn update(&self, entity: &E) -> Result<bool>;

    /// Remove an entity.
    fn delete(&self, entity: &E) -> Result<bool>;
}
