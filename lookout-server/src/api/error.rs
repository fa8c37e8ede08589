//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lookout_core::domain::failure::FailureKind;

use crate::service::LookupError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    Lookup(LookupError),
    NotFound(String),
    BadRequest(String),
    BadGateway(String),
    RateLimited,
}

/// Status code reported for each lookup failure
pub fn status_for(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::InvalidKey => StatusCode::BAD_REQUEST,
        FailureKind::NotFound => StatusCode::NOT_FOUND,
        FailureKind::Unreachable => StatusCode::SERVICE_UNAVAILABLE,
        FailureKind::SubmitFailed | FailureKind::RunFailed | FailureKind::FetchFailed => {
            StatusCode::BAD_GATEWAY
        }
        FailureKind::PollTimeout => StatusCode::GATEWAY_TIMEOUT,
        FailureKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Lookup(err) => {
                if err.kind == FailureKind::InternalError {
                    tracing::error!("Internal error: {}", err.detail);
                }
                (status_for(err.kind), err.kind.code().to_string())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMIT_EXCEEDED".to_string(),
            ),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        ApiError::Lookup(err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
