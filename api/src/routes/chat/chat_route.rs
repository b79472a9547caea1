//! POST /api/chat: answers a visitor's question as the persona.

use std::{convert::Infallible, sync::Arc};

use axum::{
    Json,
    body::{Body, Bytes},
    extract::{State, rejection::JsonRejection},
    http::{HeaderName, header},
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use tracing::{debug, info};

use contextor::Reply;

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    routes::chat::chat_request::{ChatRequest, ChatResponse},
};

/// Handler: POST /api/chat
///
/// # Example
/// ```bash
/// curl -N -X POST http://127.0.0.1:8080/api/chat \
///   -H 'content-type: application/json' \
///   -d '{"question":"What do you work on?","stream":true}'
/// ```
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(req) = payload?;
    info!(chars = req.question.len(), stream = req.stream, "chat request");

    let text = match state.pipeline.ask(&req.question).await? {
        Reply::Status(report) => return Ok(Json(report).into_response()),
        Reply::Answer(text) => text,
    };

    if !req.stream {
        return Ok(Json(ChatResponse { response: text }).into_response());
    }

    debug!(chars = text.chars().count(), "streaming answer");
    // Client disconnect drops the body, which drops the stream.
    let (units, _cancel) = state.pipeline.stream(text);
    let body = Body::from_stream(units.map(|ch| Ok::<_, Infallible>(Bytes::from(ch.to_string()))));

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
            (HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{body_json, body_string, state};
    use axum::http::StatusCode;

    fn request(question: &str, stream: bool) -> Result<Json<ChatRequest>, JsonRejection> {
        Ok(Json(ChatRequest {
            question: question.into(),
            stream,
        }))
    }

    #[tokio::test]
    async fn plain_answer_is_a_json_payload() {
        let st = Arc::new(state(Some("Answer: Alex builds backend systems in Rust.")));
        let res = chat(State(st), request("What do you build?", false)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["response"], "I build backend systems in Rust.");
    }

    #[tokio::test]
    async fn streamed_answer_matches_the_plain_one() {
        let st = Arc::new(state(Some("Alex builds backend systems in Rust.")));

        let plain = chat(State(st.clone()), request("What do you build?", false)).await.unwrap();
        let plain = body_json(plain).await["response"].as_str().unwrap().to_string();

        let res = chat(State(st), request("What do you build?", true)).await.unwrap();
        assert_eq!(res.headers()[header::CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(res.headers()[header::CACHE_CONTROL], "no-cache");
        assert_eq!(res.headers()["x-accel-buffering"], "no");
        assert_eq!(body_string(res).await, plain);
    }

    #[tokio::test]
    async fn blank_question_is_a_client_error() {
        let st = Arc::new(state(Some("unused")));
        let err = chat(State(st.clone()), request("  ", false)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(st.pipeline.guard().builds_started().await, 0);
    }

    #[tokio::test]
    async fn status_sentinel_returns_the_status_payload() {
        let st = Arc::new(state(Some("unused")));
        st.pipeline.guard().ensure_ready().await.unwrap();
        let res = chat(State(st), request("system_check", true)).await.unwrap();
        let body = body_json(res).await;
        assert_eq!(body["status"], "ready");
        assert_eq!(body["model"], "canned");
    }

    #[tokio::test]
    async fn generation_failure_is_a_bad_gateway() {
        let st = Arc::new(state(None));
        let err = chat(State(st), request("What do you build?", false)).await.unwrap_err();
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(res).await["code"], "GENERATION_FAILED");
    }
}
