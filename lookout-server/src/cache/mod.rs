//! Cache layer
//!
//! Keyed lookup results with per-entry expiry. The store is injected into
//! the profile service as a trait object so a bounded implementation can
//! replace the in-memory one.

mod store;

pub use store::{CacheEntry, CacheStore, CachedLookup, InMemoryCacheStore, spawn_sweeper};
