//! Alert Routes

use alerting::{AlertConfig, AlertConfigUpdate, AlertError, AlertState, Outcome, StatusEvent};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::AppState;

/// Process a server status report
pub async fn post_alert(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StatusEvent>, JsonRejection>,
) -> Result<Json<Outcome>, ApiError> {
    let Json(event) = payload.map_err(|e| AlertError::InvalidRequest(e.body_text()))?;

    let outcome = state.coordinator.process(&event).await?;
    debug!(
        "Status {} for {}: {}",
        event.status,
        event.server_id,
        outcome.label()
    );
    Ok(Json(outcome))
}

/// Get the alert configuration
pub async fn get_config(State(state): State<Arc<AppState>>) -> Result<Json<AlertConfig>, ApiError> {
    Ok(Json(state.coordinator.config().load()?))
}

/// Merge recognized fields into the alert configuration
pub async fn update_config(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AlertConfigUpdate>, JsonRejection>,
) -> Result<Json<AlertConfig>, ApiError> {
    let Json(update) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    Ok(Json(state.coordinator.config().update(&update)?))
}

/// List currently open alerts
pub async fn get_state(State(state): State<Arc<AppState>>) -> Result<Json<AlertState>, ApiError> {
    Ok(Json(state.coordinator.open_alerts().await?))
}
