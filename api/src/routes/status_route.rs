//! GET /api/status: index lifecycle as the status payload.

use std::sync::Arc;

use axum::{Json, extract::State};

use contextor::StatusReport;

use crate::core::app_state::AppState;

/// Same payload as the `system_check` question; never calls the model.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusReport> {
    Json(state.pipeline.status_report().await)
}
