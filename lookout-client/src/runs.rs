//! Actor run endpoints

use crate::error::{ClientError, Result};
use crate::{ActorClient, error_from_response, parse_json};
use lookout_core::domain::run::{RunHandle, RunStatus};
use lookout_core::dto::run::{Envelope, RunData, StartRun};
use reqwest::StatusCode;

impl ActorClient {
    // =============================================================================
    // Run Lifecycle
    // =============================================================================

    /// Start a new actor run for a single username
    ///
    /// Only `201 Created` counts as success; any other status is returned as
    /// `ClientError::ApiError` so the caller can tell it apart from transport
    /// failures.
    ///
    /// # Returns
    /// The run and dataset identifiers of the new run
    pub async fn start_run(&self, username: &str) -> Result<RunHandle> {
        let url = format!("{}/v2/acts/{}/runs", self.base_url, self.actor_id);
        let response = self
            .client
            .post(&url)
            .query(&[("token", &self.token)])
            .json(&StartRun::single(username))
            .send()
            .await?;

        if response.status() != StatusCode::CREATED {
            return Err(error_from_response(response).await);
        }

        let envelope: Envelope<RunData> = parse_json(response).await?;
        let run_id = envelope.data.id.ok_or(ClientError::MissingField("id"))?;
        let dataset_id = envelope
            .data
            .default_dataset_id
            .ok_or(ClientError::MissingField("defaultDatasetId"))?;

        tracing::debug!("Started actor run {} (dataset {})", run_id, dataset_id);

        Ok(RunHandle { run_id, dataset_id })
    }

    /// Get the current status of a run
    ///
    /// # Arguments
    /// * `run_id` - The run identifier returned by `start_run`
    pub async fn run_status(&self, run_id: &str) -> Result<RunStatus> {
        let url = format!("{}/v2/actor-runs/{}", self.base_url, run_id);
        let response = self
            .client
            .get(&url)
            .query(&[("token", &self.token)])
            .send()
            .await?;

        let envelope: Envelope<RunData> = self.handle_response(response).await?;
        let status = envelope
            .data
            .status
            .ok_or(ClientError::MissingField("status"))?;

        Ok(RunStatus::from_upstream(&status))
    }
}
