//! Lookup error type

use lookout_core::InvalidUsername;
use lookout_core::domain::failure::FailureKind;
use thiserror::Error;

/// A classified lookup failure with the detail that explains it
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {detail}")]
pub struct LookupError {
    pub kind: FailureKind,
    pub detail: String,
}

impl LookupError {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new(FailureKind::NotFound, "profile does not exist")
    }
}

impl From<InvalidUsername> for LookupError {
    fn from(err: InvalidUsername) -> Self {
        Self::new(FailureKind::InvalidKey, err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;
