//! Health and Stats API Handlers

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};

use super::AppState;
use crate::service::{RecordedAlert, StatsSnapshot};

/// GET /health
/// Health check endpoint
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "time": Utc::now().to_rfc3339(),
    }))
}

/// Body of the stats endpoint
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub cache: StatsSnapshot,
    pub recent_alerts: Vec<RecordedAlert>,
}

/// GET /stats
/// Cache size, hit/miss counters and the latest alerts
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        cache: state.profiles.stats(),
        recent_alerts: state.alerts.recent(),
    })
}
