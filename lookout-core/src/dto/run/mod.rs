//! Actor run DTOs

use serde::{Deserialize, Serialize};

/// Input for a new actor run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRun {
    pub usernames: Vec<String>,
}

impl StartRun {
    pub fn single(username: impl Into<String>) -> Self {
        Self {
            usernames: vec![username.into()],
        }
    }
}

/// Every actor API object response is wrapped in `{"data": ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Run object as returned by run creation and run status queries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunData {
    pub id: Option<String>,
    pub default_dataset_id: Option<String>,
    pub status: Option<String>,
}
