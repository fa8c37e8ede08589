//! Remote run domain types

use serde::{Deserialize, Serialize};

/// Identifiers returned by the actor when a run is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunHandle {
    pub run_id: String,
    pub dataset_id: String,
}

/// Remote run status
///
/// Transitions are only ever observed by polling the actor; the local side
/// never moves a run between states on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Created,
    Running,
    Succeeded,
    Failed,
    Aborted,
    TimedOut,
}

impl RunStatus {
    /// Maps the actor's status string onto a run status.
    ///
    /// Transitional upstream states (`ABORTING`, `TIMING-OUT`) and anything
    /// unrecognised are treated as still running.
    pub fn from_upstream(status: &str) -> Self {
        match status {
            "READY" => RunStatus::Created,
            "SUCCEEDED" => RunStatus::Succeeded,
            "FAILED" => RunStatus::Failed,
            "ABORTED" => RunStatus::Aborted,
            "TIMED-OUT" => RunStatus::TimedOut,
            _ => RunStatus::Running,
        }
    }

    /// Whether no further transition can occur
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunStatus::Succeeded | RunStatus::Failed | RunStatus::Aborted | RunStatus::TimedOut
        )
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunStatus::Created => "created",
            RunStatus::Running => "running",
            RunStatus::Succeeded => "succeeded",
            RunStatus::Failed => "failed",
            RunStatus::Aborted => "aborted",
            RunStatus::TimedOut => "timed-out",
        };
        write!(f, "{}", s)
    }
}
