//! GET /health: backend probes plus index state.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use ai_llm_service::HealthStatus;
use contextor::InitStatus;

use crate::core::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// `ok` when every backend answered, `degraded` otherwise.
    pub status: &'static str,
    pub index: IndexHealth,
    pub backends: Vec<HealthStatus>,
}

#[derive(Debug, Serialize)]
pub struct IndexHealth {
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passages: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl From<InitStatus> for IndexHealth {
    fn from(s: InitStatus) -> Self {
        let (state, passages, last_error) = match s {
            InitStatus::Uninitialized => ("uninitialized", None, None),
            InitStatus::Initializing => ("initializing", None, None),
            InitStatus::Ready { passages } => ("ready", Some(passages), None),
            InitStatus::Error(e) => ("error", None, Some(e)),
        };
        Self {
            state,
            passages,
            last_error,
        }
    }
}

/// Always 200; read `status` for the verdict.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    let backends = state.llm.health_all().await;
    let index = IndexHealth::from(state.pipeline.guard().status().await);
    let status = if backends.iter().all(|b| b.ok) {
        "ok"
    } else {
        "degraded"
    };
    Json(HealthReport {
        status,
        index,
        backends,
    })
}
