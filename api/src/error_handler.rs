use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use ai_llm_service::AiLlmError;
use contextor::ContextorError;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("configuration error: {0}")]
    Config(String),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    // --- Pipeline ---
    #[error(transparent)]
    Pipeline(#[from] ContextorError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Config(_) | AppError::Bind(_) | AppError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Pipeline(e) => match e {
                ContextorError::EmptyQuestion => StatusCode::BAD_REQUEST,
                ContextorError::Initialization(_) => StatusCode::SERVICE_UNAVAILABLE,
                ContextorError::Generation(_) | ContextorError::Rag(_) => StatusCode::BAD_GATEWAY,
                ContextorError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                ContextorError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Conflict(_) => "BUILD_IN_PROGRESS",
            AppError::Pipeline(e) => match e {
                ContextorError::EmptyQuestion => "EMPTY_QUESTION",
                ContextorError::Initialization(_) => "INITIALIZATION_FAILED",
                ContextorError::Generation(_) => "GENERATION_FAILED",
                ContextorError::Rag(_) => "RETRIEVAL_FAILED",
                ContextorError::Timeout(_) => "GENERATION_TIMEOUT",
                ContextorError::Config(_) => "CONFIG_ERROR",
            },
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = self.error_code(), error = %self, "request failed");
        } else {
            warn!(code = self.error_code(), error = %self, "request rejected");
        }
        let body = ErrorBody {
            error: self.to_string(),
            code: self.error_code(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

impl From<AiLlmError> for AppError {
    fn from(err: AiLlmError) -> Self {
        AppError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn body_json(res: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn pipeline_errors_map_to_distinct_statuses() {
        let cases = [
            (ContextorError::EmptyQuestion, StatusCode::BAD_REQUEST, "EMPTY_QUESTION"),
            (
                ContextorError::Initialization("document not found".into()),
                StatusCode::SERVICE_UNAVAILABLE,
                "INITIALIZATION_FAILED",
            ),
            (
                ContextorError::Generation("HTTP 500".into()),
                StatusCode::BAD_GATEWAY,
                "GENERATION_FAILED",
            ),
            (
                ContextorError::Timeout(Duration::from_secs(90)),
                StatusCode::GATEWAY_TIMEOUT,
                "GENERATION_TIMEOUT",
            ),
        ];
        for (err, status, code) in cases {
            let res = AppError::from(err).into_response();
            assert_eq!(res.status(), status);
            let body = body_json(res).await;
            assert_eq!(body["code"], code);
            assert!(body["error"].as_str().is_some_and(|s| !s.is_empty()));
        }
    }

    #[tokio::test]
    async fn timeout_message_names_the_deadline() {
        let res = AppError::from(ContextorError::Timeout(Duration::from_secs(90))).into_response();
        let body = body_json(res).await;
        assert_eq!(body["error"], "generation timed out after 90s");
    }
}
