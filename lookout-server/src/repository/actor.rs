//! Actor repository
//!
//! Handles communication with the scraping actor:
//! - Starting a run for one username
//! - Reading the status of a run
//! - Reading the result dataset of a finished run

use async_trait::async_trait;
use lookout_client::{ActorClient, Result};
use lookout_core::domain::run::{RunHandle, RunStatus};
use serde_json::Value;

/// Repository trait for the three phases of an actor run
#[async_trait]
pub trait ActorRepository: Send + Sync {
    /// Starts a run for a single username
    ///
    /// # Arguments
    /// * `username` - A username that already passed validation
    async fn start_run(&self, username: &str) -> Result<RunHandle>;

    /// Reads the current status of a run
    async fn run_status(&self, run_id: &str) -> Result<RunStatus>;

    /// Reads the items of a run's result dataset, in order
    async fn dataset_items(&self, dataset_id: &str) -> Result<Vec<Value>>;
}

/// HTTP implementation of ActorRepository
pub struct HttpActorRepository {
    client: ActorClient,
}

impl HttpActorRepository {
    /// Creates a new HTTP actor repository
    pub fn new(client: ActorClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ActorRepository for HttpActorRepository {
    async fn start_run(&self, username: &str) -> Result<RunHandle> {
        self.client.start_run(username).await
    }

    async fn run_status(&self, run_id: &str) -> Result<RunStatus> {
        self.client.run_status(run_id).await
    }

    async fn dataset_items(&self, dataset_id: &str) -> Result<Vec<Value>> {
        self.client.dataset_items(dataset_id).await
    }
}
