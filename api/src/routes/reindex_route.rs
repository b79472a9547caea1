//! POST /api/reindex: drop the cached index and rebuild it in the background.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::info;

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
};

#[derive(Debug, Serialize)]
pub struct ReindexResponse {
    pub status: &'static str,
}

/// 202 once the rebuild is scheduled, 409 while a build is running.
pub async fn reindex(
    State(state): State<Arc<AppState>>,
) -> AppResult<(StatusCode, Json<ReindexResponse>)> {
    if !state.pipeline.reset().await {
        return Err(AppError::Conflict(
            "an index build is already in progress".into(),
        ));
    }
    state.pipeline.warm_up();
    info!("reindex scheduled");
    Ok((
        StatusCode::ACCEPTED,
        Json(ReindexResponse {
            status: "initializing",
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::state;

    #[tokio::test]
    async fn reindex_schedules_a_fresh_build() {
        let st = Arc::new(state(Some("unused")));
        st.pipeline.guard().ensure_ready().await.unwrap();

        let (code, Json(body)) = reindex(State(st.clone())).await.unwrap();
        assert_eq!(code, StatusCode::ACCEPTED);
        assert_eq!(body.status, "initializing");

        st.pipeline.guard().ensure_ready().await.unwrap();
        assert_eq!(st.pipeline.guard().builds_started().await, 2);
    }

    #[test]
    fn busy_guard_maps_to_conflict() {
        use axum::response::IntoResponse;
        let res = AppError::Conflict("an index build is already in progress".into()).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }
}
