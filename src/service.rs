//! The cache-aside record service.
//!
//! One service instance fronts one entity collection. Reads go through the
//! cache and fall back to the backing store on miss; writes hit the backing
//! store first (source of truth) and only then invalidate or patch the
//! affected cache entries, so a failed write never pollutes the cache.
//!
//! The cached whole-collection snapshot is patched in place on update and
//! delete (targeted element replace/remove) rather than invalidated
//! wholesale. Read-then-write sequences against a shared cache backend are
//! not atomic; concurrent writers to the same collection key race with
//! last-put-wins, while the backing store stays authoritative.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::cache::{CacheStore, CacheValue};
use crate::entity::Entity;
use crate::error::{ServiceError, WriteOp};
use crate::key;
use crate::store::BackingStore;

/// How long cached entries live: 24 hours.
pub const CACHE_DURATION: Duration = Duration::from_secs(86_400);

/// Generic cache-aside service over one entity type.
///
/// Takes its collaborators by explicit injection; nothing is resolved from
/// ambient global state. Holds the optional "current working entity" slot
/// set by the last insert/update and cleared by delete.
pub struct RecordService<E, S, C>
where
    E: Entity,
    S: BackingStore<E>,
    C: CacheStore<CacheValue<E>>,
{
    store: S,
    cache: C,
    model: Option<E>,
}

impl<E, S, C> RecordService<E, S, C>
where
    E: Entity,
    S: BackingStore<E>,
    C: CacheStore<CacheValue<E>>,
{
    /// Create a service over the given backing store and cache.
    pub fn new(store: S, cache: C) -> Self {
        Self {
            store,
            cache,
            model: None,
        }
    }

    /// The backing store handle.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The cache handle.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// The current working entity.
    ///
    /// Set by the last [`insert`](Self::insert)/[`update`](Self::update),
    /// cleared by [`delete`](Self::delete).
    pub fn model(&self) -> Result<&E, ServiceError> {
        self.model.as_ref().ok_or(ServiceError::ModelNotLoaded)
    }

    /// Set the working entity.
    pub fn set_model(&mut self, model: E) {
        self.model = Some(model);
    }

    /// Clear the working entity.
    pub fn unset_model(&mut self) {
        self.model = None;
    }

    /// Read-through lookup by identifier.
    ///
    /// On miss the backing store is queried (eager-loading cacheable
    /// relations) and the individual cache slot repopulated with
    /// [`CACHE_DURATION`].
    pub fn find_by_id(&self, id: &E::Id) -> Result<E, ServiceError> {
        let cache_key = key::primary(E::collection_name(), id);

        match self.cache.get(&cache_key) {
            Some(CacheValue::Entity(entity)) => {
                debug!("{} served from cache", cache_key);
                return Ok(entity);
            }
            // A value of another shape occupies the slot; drop it.
            Some(_) => self.cache.forget(&cache_key),
            None => {}
        }

        debug!("{} missed, falling back to backing store", cache_key);
        let found = self.store.find_by_id(id, E::cacheable_relations())?;
        let entity = found.ok_or_else(|| ServiceError::not_found(E::model_name(), "id", id))?;

        self.cache
            .put(&cache_key, CacheValue::Entity(entity.clone()), CACHE_DURATION);
        Ok(entity)
    }

    /// Lookup by an arbitrary field, through secondary-key indirection.
    ///
    /// The secondary key resolves to a primary key string, which resolves to
    /// the entity: two cache reads. A miss at either level falls back to the
    /// backing store and reseeds both keys with a one-day expiration.
    pub fn find_by_field(&self, field: &str, value: &str) -> Result<E, ServiceError> {
        let secondary_key = key::secondary(E::collection_name(), field, &value);

        if let Some(CacheValue::Reference(primary_key)) = self.cache.get(&secondary_key)
            && let Some(CacheValue::Entity(entity)) = self.cache.get(&primary_key)
        {
            debug!("{} resolved through cached reference", secondary_key);
            return Ok(entity);
        }

        debug!("{} missed, falling back to backing store", secondary_key);
        let found = self
            .store
            .find_one_by_field(field, value, E::cacheable_relations())?;
        self.save_reference(&secondary_key, found)
    }

    /// Seed both levels of a secondary-key lookup, or raise not-found.
    ///
    /// `(field, value)` for the error message are re-derived by decomposing
    /// the secondary key, the canonical form of the predicate.
    fn save_reference(&self, secondary_key: &str, model: Option<E>) -> Result<E, ServiceError> {
        let (field, value) = match key::split_secondary(secondary_key) {
            Some((_, field, value)) => (field, value),
            None => ("", ""),
        };

        let Some(model) = model else {
            return Err(ServiceError::not_found(E::model_name(), field, value));
        };

        let primary_key = model.primary_cache_key();
        self.cache
            .put(&primary_key, CacheValue::Entity(model.clone()), CACHE_DURATION);
        self.cache.put(
            secondary_key,
            CacheValue::Reference(primary_key),
            CACHE_DURATION,
        );
        Ok(model)
    }

    /// Read-through lookup of every entity with `field = value`.
    ///
    /// The fetched rows are cached under the query-scoped key (an empty
    /// result included, per remember semantics) before an empty result
    /// raises.
    pub fn get_collection(&self, field: &str, value: &str) -> Result<Vec<E>, ServiceError> {
        let cache_key = key::secondary(E::collection_name(), field, &value);

        let cached = self
            .cache
            .get(&cache_key)
            .and_then(CacheValue::into_collection);
        let rows = match cached {
            Some(rows) => {
                debug!("{} collection served from cache", cache_key);
                rows
            }
            None => {
                let rows = self.store.find_all_by_field(field, value)?;
                self.cache.put(
                    &cache_key,
                    CacheValue::Collection(rows.clone()),
                    CACHE_DURATION,
                );
                rows
            }
        };

        if rows.is_empty() {
            return Err(ServiceError::collection_not_found(
                E::model_name(),
                field,
                value,
            ));
        }
        Ok(rows)
    }

    /// Cache the whole collection under `<collection>:all`.
    ///
    /// Read-through remember: rebuilds from the backing store (with
    /// relations) only when the snapshot is absent. Idempotent.
    pub fn cache_all_records(&self) -> Result<Vec<E>, ServiceError> {
        let cache_key = key::all_records(E::collection_name());

        let value = self.cache.remember(&cache_key, CACHE_DURATION, || {
            debug!("{} rebuilding collection snapshot", cache_key);
            let rows = self.store.find_all(E::cacheable_relations())?;
            Ok(CacheValue::Collection(rows))
        })?;

        match value.into_collection() {
            Some(rows) => Ok(rows),
            None => {
                // The slot held a value of another shape; rebuild it.
                self.cache.forget(&cache_key);
                let rows = self.store.find_all(E::cacheable_relations())?;
                self.cache.put(
                    &cache_key,
                    CacheValue::Collection(rows.clone()),
                    CACHE_DURATION,
                );
                Ok(rows)
            }
        }
    }

    /// Insert a new entity.
    ///
    /// The backing store is written first; on success the relation-refreshed
    /// row is appended to the cached collection snapshot (or the snapshot is
    /// rebuilt when absent), the working slot is set, and the entity is
    /// returned through [`find_by_id`](Self::find_by_id) so its individual
    /// cache slot is populated.
    pub fn insert(&mut self, entity: E) -> Result<E, ServiceError> {
        if !self.store.save(&entity)? {
            return Err(ServiceError::WriteFailed(WriteOp::Insert));
        }

        let id = entity.identifier();
        let fresh = self
            .store
            .find_by_id(&id, E::cacheable_relations())?
            .unwrap_or_else(|| entity.clone());
        self.update_cached_collection(|mut rows| {
            rows.push(fresh);
            rows
        })?;

        self.set_model(entity);
        self.find_by_id(&id)
    }

    /// Update an existing entity.
    ///
    /// The backing store is written first; on success the entity's primary
    /// cache key is forgotten (forcing a future re-read) and the matching
    /// collection element is replaced by a full re-fetch, not an in-place
    /// field merge.
    pub fn update(&mut self, entity: E) -> Result<E, ServiceError> {
        if !self.store.update(&entity)? {
            return Err(ServiceError::WriteFailed(WriteOp::Update));
        }

        self.cache.forget(&entity.primary_cache_key());

        let id = entity.identifier();
        let fresh = self
            .store
            .find_by_id(&id, E::cacheable_relations())?
            .unwrap_or_else(|| entity.clone());
        self.update_cached_collection(|rows| {
            rows.into_iter()
                .map(|item| {
                    if item.identifier() == fresh.identifier() {
                        fresh.clone()
                    } else {
                        item
                    }
                })
                .collect()
        })?;

        self.set_model(entity);
        self.find_by_id(&id)
    }

    /// Delete an entity.
    ///
    /// The backing store is written first; on success the primary cache key
    /// is forgotten, the matching collection element removed, and the
    /// working slot cleared.
    pub fn delete(&mut self, entity: &E) -> Result<(), ServiceError> {
        if !self.store.delete(entity)? {
            return Err(ServiceError::WriteFailed(WriteOp::Delete));
        }

        self.cache.forget(&entity.primary_cache_key());

        let id = entity.identifier();
        self.update_cached_collection(|rows| {
            rows.into_iter()
                .filter(|item| item.identifier() != id)
                .collect()
        })?;

        self.unset_model();
        Ok(())
    }

    /// Patch the cached whole-collection snapshot, if one exists.
    ///
    /// When the snapshot is absent (never built, expired) the patch cannot
    /// apply, so the snapshot is rebuilt from the backing store instead.
    fn update_cached_collection<F>(&self, apply: F) -> Result<(), ServiceError>
    where
        F: FnOnce(Vec<E>) -> Vec<E>,
    {
        let cache_key = key::all_records(E::collection_name());

        match self.cache.get(&cache_key).and_then(CacheValue::into_collection) {
            Some(rows) => {
                debug!("{} patched in place", cache_key);
                self.cache.put(
                    &cache_key,
                    CacheValue::Collection(apply(rows)),
                    CACHE_DURATION,
                );
            }
            None => {
                self.cache_all_records()?;
            }
        }
        Ok(())
    }
}

/// One page of a collection, 1-based.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub per_page: usize,
    pub current_page: usize,
}

impl<T> Page<T> {
    /// Index of the last page (at least 1).
    pub fn last_page(&self) -> usize {
        self.total.div_ceil(self.per_page).max(1)
    }
}

/// Slice a collection into one page.
///
/// Pages are 1-based; out-of-range pages yield an empty item list with the
/// total preserved.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let current_page = page.max(1);
    let start = (current_page - 1).saturating_mul(per_page);

    Page {
        items: items.iter().skip(start).take(per_page).cloned().collect(),
        total: items.len(),
        per_page,
        current_page,
    }
}
