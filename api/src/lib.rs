use std::{env, sync::Arc};

mod core;
mod error_handler;
mod routes;
#[cfg(test)]
mod test_support;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tracing::{error, info};

pub use crate::error_handler::AppError;

use crate::{
    core::app_state::AppState,
    routes::{
        chat::chat_route::chat, health_route::health, reindex_route::reindex,
        status_route::status,
    },
};

const DEFAULT_API_ADDRESS: &str = "0.0.0.0:8080";

/// Builds the state from the environment and serves until Ctrl+C.
///
/// # Errors
/// Configuration errors, or a listener that cannot bind.
pub async fn start() -> Result<(), AppError> {
    let host_url = env::var("API_ADDRESS")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_ADDRESS.to_string());

    let state = Arc::new(AppState::from_env()?);
    if state.warmup_on_start {
        state.pipeline.warm_up();
    }

    let app = router(state);

    // Bind to address
    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %host_url, "persona chat api listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/status", get(status))
        .route("/api/reindex", post(reindex))
        .route("/health", get(health))
        .with_state(state)
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        // Without a signal handler the server runs until killed.
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
