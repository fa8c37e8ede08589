//! Lookup failure classification

use serde::{Deserialize, Serialize};

/// Why a profile lookup did not produce a profile
///
/// Every kind has a stable code so callers can tell client mistakes,
/// transient upstream trouble and stable absence apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// The key does not match the username grammar
    InvalidKey,
    /// The actor confirmed the profile does not exist
    NotFound,
    /// The actor API could not be reached at all
    Unreachable,
    /// Run creation was rejected or returned no identifiers
    SubmitFailed,
    /// The run finished in a failed, aborted or timed-out state
    RunFailed,
    /// No terminal status was observed within the wait budget
    PollTimeout,
    /// The result dataset could not be retrieved
    FetchFailed,
    /// Anything not otherwise classified
    InternalError,
}

impl FailureKind {
    /// Stable, externally visible code
    pub fn code(self) -> &'static str {
        match self {
            FailureKind::InvalidKey => "INVALID_USERNAME",
            FailureKind::NotFound => "PROFILE_NOT_FOUND",
            FailureKind::Unreachable => "UPSTREAM_UNREACHABLE",
            FailureKind::SubmitFailed => "RUN_SUBMIT_FAILED",
            FailureKind::RunFailed => "RUN_FAILED",
            FailureKind::PollTimeout => "UPSTREAM_TIMEOUT",
            FailureKind::FetchFailed => "DATASET_FETCH_FAILED",
            FailureKind::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Only a confirmed absence is stable enough to cache
    pub fn is_cacheable(self) -> bool {
        matches!(self, FailureKind::NotFound)
    }

    /// Upstream incidents and internal errors are reported to the operator
    pub fn is_incident(self) -> bool {
        !matches!(self, FailureKind::InvalidKey | FailureKind::NotFound)
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
