//! API Error Responses

use alerting::AlertError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use storage::StorageError;
use thiserror::Error;
use tracing::{error, warn};

/// Errors returned by handlers, rendered as `{"error": "..."}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Alert(#[from] AlertError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Alert(AlertError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            ApiError::Alert(AlertError::ChannelUnavailable) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Alert(AlertError::SendFailed)
            | ApiError::Alert(AlertError::Storage(_))
            | ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match status {
            StatusCode::INTERNAL_SERVER_ERROR => error!("Request failed: {}", self),
            StatusCode::SERVICE_UNAVAILABLE => warn!("Request rejected: {}", self),
            _ => {}
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
