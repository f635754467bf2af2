//! Server List Routes

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use storage::ServerListStore;

use crate::error::ApiError;
use crate::AppState;

const INVALID_FORMAT: &str = "Invalid data format";

/// Response for a successful save
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub success: bool,
    pub message: String,
}

/// Get the whole server-list document
pub async fn get_servers(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.servers.load()?))
}

/// Replace the server-list document
pub async fn save_servers(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SaveResponse>, ApiError> {
    let Json(document) = payload.map_err(|_| ApiError::BadRequest(INVALID_FORMAT.to_string()))?;
    if !ServerListStore::is_valid(&document) {
        return Err(ApiError::BadRequest(INVALID_FORMAT.to_string()));
    }

    state.servers.save(&document)?;

    Ok(Json(SaveResponse {
        success: true,
        message: "Servers saved successfully".to_string(),
    }))
}
