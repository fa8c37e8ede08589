//! Service layer
//!
//! Business logic of the profile lookup:
//! - `poller`: drives one actor run and classifies its outcome
//! - `profile`: validates, caches and coordinates lookups
//! - `alert`: best-effort operator notifications
//! - `stats`: cache hit/miss counters

pub mod alert;
pub mod error;
pub mod poller;
pub mod profile;
pub mod stats;

pub use alert::{AlertSink, QueuedAlertSink, RecordedAlert};
pub use error::LookupError;
pub use poller::{JobPoller, PollSettings};
pub use profile::{CacheTtl, ProfileService};
pub use stats::StatsSnapshot;
