//! Profile service
//!
//! Resolves a username to a profile: validate, consult the cache, and on a
//! miss run the actor and cache what is stable. Successful lookups are cached
//! for the positive TTL, confirmed absences for the longer negative TTL.
//! Every other failure is alerted and never cached.
//!
//! Concurrent misses for the same username each run their own actor job; the
//! last one to finish overwrites the cache entry.

use lookout_core::Username;
use lookout_core::domain::failure::FailureKind;
use lookout_core::domain::profile::Profile;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::alert::{AlertSink, format_alert};
use super::error::{LookupError, Result};
use super::poller::JobPoller;
use super::stats::{LookupStats, StatsSnapshot};
use crate::cache::{CacheStore, CachedLookup};

/// Cache lifetimes of the two kinds of entries
#[derive(Debug, Clone, Copy)]
pub struct CacheTtl {
    pub positive: Duration,
    pub negative: Duration,
}

/// Request coordinator for profile lookups
pub struct ProfileService {
    cache: Arc<dyn CacheStore>,
    poller: Arc<JobPoller>,
    alerts: Arc<dyn AlertSink>,
    stats: LookupStats,
    ttl: CacheTtl,
}

impl ProfileService {
    /// Creates a new profile service
    pub fn new(
        cache: Arc<dyn CacheStore>,
        poller: JobPoller,
        alerts: Arc<dyn AlertSink>,
        ttl: CacheTtl,
    ) -> Self {
        Self {
            cache,
            poller: Arc::new(poller),
            alerts,
            stats: LookupStats::default(),
            ttl,
        }
    }

    /// Resolves a raw username to a profile
    ///
    /// Invalid usernames are rejected before the cache or the actor is touched.
    pub async fn resolve(&self, raw: &str) -> Result<Profile> {
        let username = Username::parse(raw)?;

        if let Some(entry) = self.cache.get(username.as_str()) {
            self.stats.record_hit();
            debug!("Cache hit for @{}", username);

            return match entry.value {
                CachedLookup::Positive(profile) => Ok(profile),
                CachedLookup::Negative(kind) => {
                    Err(LookupError::new(kind, "cached: profile does not exist"))
                }
            };
        }

        self.stats.record_miss();
        debug!("Cache miss for @{}", username);

        match self.run_lookup(&username).await {
            Ok(profile) => {
                self.cache.put(
                    username.as_str(),
                    CachedLookup::Positive(profile.clone()),
                    self.ttl.positive,
                );
                info!("Resolved @{}", username);
                Ok(profile)
            }
            Err(err) if err.kind.is_cacheable() => {
                self.cache.put(
                    username.as_str(),
                    CachedLookup::Negative(err.kind),
                    self.ttl.negative,
                );
                info!("Profile @{} not found", username);
                Err(err)
            }
            Err(err) => {
                warn!("Lookup of @{} failed: {}", username, err);
                if err.kind.is_incident() {
                    self.alerts
                        .notify(format_alert(&headline(err.kind), username.as_str(), &err.detail));
                }
                Err(err)
            }
        }
    }

    /// Current cache size and hit/miss counters
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.cache.size())
    }

    /// Runs the actor in its own task so a panic there becomes a classified error
    async fn run_lookup(&self, username: &Username) -> Result<Profile> {
        let poller = Arc::clone(&self.poller);
        let task_username = username.clone();

        let outcome = tokio::spawn(async move { poller.run(&task_username).await })
            .await
            .unwrap_or_else(|e| {
                Err(LookupError::new(
                    FailureKind::InternalError,
                    format!("lookup task failed: {e}"),
                ))
            });

        outcome.map(|item| Profile::from_item(&item))
    }
}

fn headline(kind: FailureKind) -> String {
    kind.code().replace('_', " ")
}
