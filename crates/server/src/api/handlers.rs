use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use matchgrid_core::{SanitizedConfig, StateStore};

use crate::metrics;
use crate::state::AppState;

use super::error::ApiError;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Probe the backing store through the dedicated health pool.
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, ApiError> {
    state.store().health_check().await?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

pub async fn get_metrics() -> String {
    metrics::encode_metrics()
}
