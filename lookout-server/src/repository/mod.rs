//! Repository layer
//!
//! Repositories are thin adapters over the remote actor API. They carry no
//! business logic; classification of their errors happens in the poller.
//!
//! All repositories are trait-based to enable testing and mocking.

mod actor;

#[cfg(test)]
pub mod fake;

// Re-export traits
pub use actor::ActorRepository;

// Re-export implementations
pub use actor::HttpActorRepository;
