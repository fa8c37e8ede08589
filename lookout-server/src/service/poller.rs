//! Job poller
//!
//! Drives one actor run through submit, poll-until-terminal and fetch,
//! classifying every failure it observes. The wait budget bounds the whole
//! polling phase; when it runs out the remote run is abandoned, not aborted.

use lookout_client::ClientError;
use lookout_core::Username;
use lookout_core::domain::failure::FailureKind;
use lookout_core::domain::profile::is_not_found_item;
use lookout_core::domain::run::{RunHandle, RunStatus};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant};
use tracing::{debug, info};

use super::error::{LookupError, Result};
use crate::repository::ActorRepository;

/// Timing of the polling phase
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    /// Constant pause between two status queries
    pub interval: Duration,
    /// Total time allowed from the first status query to a terminal status
    pub max_wait: Duration,
}

/// Runs the three-phase actor protocol for one username
pub struct JobPoller {
    repository: Arc<dyn ActorRepository>,
    settings: PollSettings,
}

impl JobPoller {
    /// Creates a new job poller
    pub fn new(repository: Arc<dyn ActorRepository>, settings: PollSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    /// Runs the protocol and returns the raw result item
    ///
    /// # Returns
    /// The first dataset item, or a classified `LookupError`. `NotFound`
    /// is returned when the dataset is empty or its first item carries the
    /// "not found" marker.
    pub async fn run(&self, username: &Username) -> Result<Value> {
        let run = self.submit(username).await?;
        self.wait_for_success(&run).await?;
        self.fetch_result(&run).await
    }

    async fn submit(&self, username: &Username) -> Result<RunHandle> {
        let run = self
            .repository
            .start_run(username.as_str())
            .await
            .map_err(|e| classify(e, FailureKind::SubmitFailed, "submit"))?;

        info!("Started run {} for @{}", run.run_id, username);
        Ok(run)
    }

    async fn wait_for_success(&self, run: &RunHandle) -> Result<()> {
        let started = Instant::now();

        loop {
            let elapsed = started.elapsed();
            if elapsed >= self.settings.max_wait {
                return Err(self.timeout_error(run));
            }

            let remaining = self.settings.max_wait - elapsed;
            let status = match time::timeout(remaining, self.repository.run_status(&run.run_id)).await
            {
                Err(_) => return Err(self.timeout_error(run)),
                Ok(result) => result.map_err(classify_status_error)?,
            };

            match status {
                RunStatus::Succeeded => {
                    debug!("Run {} succeeded after {:?}", run.run_id, started.elapsed());
                    return Ok(());
                }
                RunStatus::Failed | RunStatus::Aborted | RunStatus::TimedOut => {
                    return Err(LookupError::new(
                        FailureKind::RunFailed,
                        format!("run {} ended with status {}", run.run_id, status),
                    ));
                }
                RunStatus::Created | RunStatus::Running => {
                    debug!("Run {} is {}", run.run_id, status);
                }
            }

            // Never sleep past the deadline
            let left = self.settings.max_wait.saturating_sub(started.elapsed());
            time::sleep(self.settings.interval.min(left)).await;
        }
    }

    async fn fetch_result(&self, run: &RunHandle) -> Result<Value> {
        let items = self
            .repository
            .dataset_items(&run.dataset_id)
            .await
            .map_err(|e| classify(e, FailureKind::FetchFailed, "dataset fetch"))?;

        let Some(first) = items.into_iter().next() else {
            debug!("Dataset {} is empty", run.dataset_id);
            return Err(LookupError::not_found());
        };

        if is_not_found_item(&first) {
            debug!("Dataset {} reports profile not found", run.dataset_id);
            return Err(LookupError::not_found());
        }

        Ok(first)
    }

    fn timeout_error(&self, run: &RunHandle) -> LookupError {
        LookupError::new(
            FailureKind::PollTimeout,
            format!(
                "run {} reached no terminal status within {}s",
                run.run_id,
                self.settings.max_wait.as_secs()
            ),
        )
    }
}

/// Transport failures are `Unreachable`; everything else gets the phase's kind
fn classify(err: ClientError, kind: FailureKind, phase: &str) -> LookupError {
    if err.is_transport() {
        LookupError::new(FailureKind::Unreachable, format!("{phase}: {err}"))
    } else {
        LookupError::new(kind, format!("{phase}: {err}"))
    }
}

fn classify_status_error(err: ClientError) -> LookupError {
    match err {
        ClientError::ApiError { .. } => classify(err, FailureKind::RunFailed, "status"),
        ClientError::ParseError(_) | ClientError::MissingField(_) => {
            LookupError::new(FailureKind::InternalError, format!("status: {err}"))
        }
        ClientError::RequestFailed(_) => classify(err, FailureKind::Unreachable, "status"),
    }
}
