//! Cache store
//!
//! Entries expire lazily: a read of a stale entry removes it and reports a
//! miss. A periodic sweep keeps keys that are never read again from piling up.

use lookout_core::domain::failure::FailureKind;
use lookout_core::domain::profile::Profile;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// What a cache entry remembers about a key
#[derive(Debug, Clone, PartialEq)]
pub enum CachedLookup {
    /// The profile exists and these were its details
    Positive(Profile),
    /// The lookup failed in a way that is stable (only "not found" today)
    Negative(FailureKind),
}

/// One cached lookup
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub value: CachedLookup,
    pub expires_at: Instant,
}

impl CacheEntry {
    /// Whether the entry is still live at `now`
    pub fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Keyed store of lookup results
///
/// Implementations serialize access internally; every method takes `&self`
/// and is safe to call from concurrent lookups.
pub trait CacheStore: Send + Sync {
    /// Returns the entry for `key` if present and not expired
    fn get(&self, key: &str) -> Option<CacheEntry>;

    /// Inserts or fully replaces the entry for `key`, expiring after `ttl`
    fn put(&self, key: &str, value: CachedLookup, ttl: Duration);

    /// Number of live entries
    fn size(&self) -> usize;

    /// Physically removes expired entries
    ///
    /// # Returns
    /// The number of entries removed
    fn purge_expired(&self) -> usize;
}

/// Unbounded in-memory store guarded by a single mutex
#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl InMemoryCacheStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        // A panic while holding the lock cannot leave a half-written entry
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CacheStore for InMemoryCacheStore {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        let now = Instant::now();
        let mut entries = self.entries();

        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Some(entry.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn put(&self, key: &str, value: CachedLookup, ttl: Duration) {
        let entry = CacheEntry {
            key: key.to_string(),
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries().insert(key.to_string(), entry);
    }

    fn size(&self) -> usize {
        let now = Instant::now();
        self.entries()
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }
}

/// Spawns a task purging expired entries every `interval`
pub fn spawn_sweeper(store: Arc<dyn CacheStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = store.purge_expired();
            if removed > 0 {
                tracing::debug!("Purged {} expired cache entries", removed);
            }
        }
    })
}
