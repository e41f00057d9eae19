//! Cacheside - Cache-Aside Record Services
//!
//! A reusable cache-aside data-access layer that sits in front of a
//! record-oriented backing store. Individual records and derived collections
//! are cached transparently, kept coherent on writes, and re-read from the
//! backing store on miss.
//!
//! ## Architecture
//!
//! - `entity` - Contract implemented by every cacheable record type
//! - `key` - Deterministic cache-key construction and decomposition
//! - `cache` - TTL key-value adapter (with a Moka-backed implementation)
//! - `store` - Backing-store adapter (with an in-memory reference store)
//! - `service` - The cache-aside record service itself
//! - `error` - Typed failures with boundary-facing status codes
//! - `response` - Converts core results into an external response envelope
//!
//! ## Usage
//!
//! ```rust,ignore
//! let store = MemoryStore::new();
//! let cache = MokaStore::new("widgets");
//! let mut widgets = RecordService::new(store, cache);
//!
//! let widget = widgets.insert(Widget { id: 1, name: "A".into() })?;
//! let same = widgets.find_by_id(&1)?; // served from cache
//! ```

pub mod cache;
pub mod entity;
pub mod error;
pub mod key;
pub mod response;
pub mod service;
pub mod store;

pub use cache::{CacheStore, CacheValue, MokaStore};
pub use entity::Entity;
pub use error::{ServiceError, WriteOp};
pub use response::ApiResponse;
pub use service::{CACHE_DURATION, Page, RecordService, paginate};
pub use store::{BackingStore, MemoryStore};
