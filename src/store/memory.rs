//! In-memory backing store for tests and adapter prototyping.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::BackingStore;
use crate::entity::Entity;

/// Order-preserving in-memory record store.
///
/// Rows live in an `RwLock<Vec<_>>` so `find_all` returns them in insertion
/// order, which the service relies on for collection snapshots. Field
/// predicates are evaluated against the entity's serde representation, so
/// any `Entity + Serialize` type works without a per-type query API.
///
/// Cloning yields a handle to the same rows, letting tests mutate the store
/// behind a service's back.
pub struct MemoryStore<E> {
    rows: Arc<RwLock<Vec<E>>>,
    fail_writes: Arc<AtomicBool>,
}

impl<E> Clone for MemoryStore<E> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
            fail_writes: Arc::clone(&self.fail_writes),
        }
    }
}

impl<E> Default for MemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> MemoryStore<E> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(Vec::new())),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make every subsequent write report failure (returns `Ok(false)`).
    ///
    /// Lets callers exercise the service's write-failure paths.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Remove all rows.
    pub fn clear(&self) {
        self.rows.write().clear();
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Whether the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    fn writes_fail(&self) -> bool {
        self.fail_writes.load(Ordering::SeqCst)
    }
}

/// Stringified value of `field` in the entity's serde representation.
fn field_value<E: Serialize>(entity: &E, field: &str) -> Option<String> {
    let json = serde_json::to_value(entity).ok()?;
    match json.get(field)? {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn matches_field<E: Serialize>(entity: &E, field: &str, value: &str) -> bool {
    field_value(entity, field).is_some_and(|v| v == value)
}

impl<E> BackingStore<E> for MemoryStore<E>
where
    E: Entity + Serialize,
{
    fn find_by_id(&self, id: &E::Id, _relations: &[&str]) -> Result<Option<E>> {
        let rows = self.rows.read();
        Ok(rows.iter().find(|row| row.identifier() == *id).cloned())
    }

    fn find_one_by_field(
        &self,
        field: &str,
        value: &str,
        _relations: &[&str],
    ) -> Result<Option<E>> {
        let rows = self.rows.read();
        Ok(rows
            .iter()
            .find(|row| matches_field(*row, field, value))
            .cloned())
    }

    fn find_all_by_field(&self, field: &str, value: &str) -> Result<Vec<E>> {
        let rows = self.rows.read();
        Ok(rows
            .iter()
            .filter(|row| matches_field(*row, field, value))
            .cloned()
            .collect())
    }

    fn find_all(&self, _relations: &[&str]) -> Result<Vec<E>> {
        Ok(self.rows.read().clone())
    }

    fn save(&self, entity: &E) -> Result<bool> {
        if self.writes_fail() {
            return Ok(false);
        }

        let mut rows = self.rows.write();
        let id = entity.identifier();
        if let Some(existing) = rows.iter_mut().find(|row| row.identifier() == id) {
            *existing = entity.clone();
        } else {
            rows.push(entity.clone());
        }
        debug!("Saved {} row {}", E::collection_name(), id);
        Ok(true)
    }

    fn update(&self, entity: &E) -> Result<bool> {
        if self.writes_fail() {
            return Ok(false);
        }

        let mut rows = self.rows.write();
        let id = entity.identifier();
        match rows.iter_mut().find(|row| row.identifier() == id) {
            Some(existing) => {
                *existing = entity.clone();
                debug!("Updated {} row {}", E::collection_name(), id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, entity: &E) -> Result<bool> {
        if self.writes_fail() {
            return Ok(false);
        }

        let mut rows = self.rows.write();
        let id = entity.identifier();
        let before = rows.len();
        rows.retain(|row| row.identifier() != id);
        let deleted = rows.len() < before;
        if deleted {
            debug!("Deleted {} row {}", E::collection_name(), id);
        }
        Ok(deleted)
    }
}

impl<E> std::fmt::Debug for MemoryStore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("rows", &self.rows.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Clone, Debug, PartialEq, Serialize)]
    struct User {
        id: u64,
        email: String,
    }

    impl Entity for User {
        type Id = u64;

        fn collection_name() -> &'static str {
            "users"
        }

        fn identifier(&self) -> u64 {
            self.id
        }
    }

    fn user(id: u64, email: &str) -> User {
        User {
            id,
            email: email.to_string(),
        }
    }

    #[test]
    fn test_save_and_find_by_id() {
        let store = MemoryStore::new();
        assert!(store.save(&user(1, "a@x.com")).unwrap());

        let found = store.find_by_id(&1, &[]).unwrap();
        assert_eq!(found, Some(user(1, "a@x.com")));
        assert_eq!(store.find_by_id(&2, &[]).unwrap(), None);
    }

    #[test]
    fn test_find_by_field_via_serde() {
        let store = MemoryStore::new();
        store.save(&user(1, "a@x.com")).unwrap();
        store.save(&user(2, "b@x.com")).unwrap();

        let found = store.find_one_by_field("email", "b@x.com", &[]).unwrap();
        assert_eq!(found, Some(user(2, "b@x.com")));

        // Numeric fields match through their string form.
        let found = store.find_one_by_field("id", "1", &[]).unwrap();
        assert_eq!(found, Some(user(1, "a@x.com")));

        assert_eq!(store.find_one_by_field("email", "nope", &[]).unwrap(), None);
        assert_eq!(store.find_one_by_field("missing", "x", &[]).unwrap(), None);
    }

    #[test]
    fn test_find_all_preserves_insertion_order() {
        let store = MemoryStore::new();
        store.save(&user(3, "c@x.com")).unwrap();
        store.save(&user(1, "a@x.com")).unwrap();
        store.save(&user(2, "b@x.com")).unwrap();

        let ids: Vec<u64> = store
            .find_all(&[])
            .unwrap()
            .iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_find_all_by_field() {
        let store = MemoryStore::new();
        store.save(&user(1, "dup@x.com")).unwrap();
        store.save(&user(2, "other@x.com")).unwrap();
        store.save(&user(3, "dup@x.com")).unwrap();

        let matched = store.find_all_by_field("email", "dup@x.com").unwrap();
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].id, 1);
        assert_eq!(matched[1].id, 3);
    }

    #[test]
    fn test_update_requires_existing_row() {
        let store = MemoryStore::new();
        assert!(!store.update(&user(1, "a@x.com")).unwrap());

        store.save(&user(1, "a@x.com")).unwrap();
        assert!(store.update(&user(1, "new@x.com")).unwrap());
        assert_eq!(
            store.find_by_id(&1, &[]).unwrap(),
            Some(user(1, "new@x.com"))
        );
    }

    #[test]
    fn test_delete() {
        let store = MemoryStore::new();
        store.save(&user(1, "a@x.com")).unwrap();

        assert!(store.delete(&user(1, "a@x.com")).unwrap());
        assert!(store.is_empty());
        assert!(!store.delete(&user(1, "a@x.com")).unwrap());
    }

    #[test]
    fn test_fail_writes_toggle() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);

        assert!(!store.save(&user(1, "a@x.com")).unwrap());
        assert!(store.is_empty());

        store.set_fail_writes(false);
        assert!(store.save(&user(1, "a@x.com")).unwrap());
    }

    #[test]
    fn test_clone_shares_rows() {
        let store = MemoryStore::new();
        let handle = store.clone();
        store.save(&user(1, "a@x.com")).unwrap();

        assert_eq!(handle.len(), 1);
        handle.clear();
        assert!(store.is_empty());
    }
}
