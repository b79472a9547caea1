use std::sync::Arc;

use ai_llm_service::{
    LlmServiceProfiles,
    config::default_config::{config_ollama_chat, config_ollama_embedding},
};
use contextor::{ContextorConfig, RagPipeline};
use tracing::info;

use crate::error_handler::AppError;

/// Timeout of the `/api/tags` availability probe.
const HEALTH_TIMEOUT_SECS: u64 = 5;

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RagPipeline>,
    /// Model backends, probed by `/health`.
    pub llm: Arc<LlmServiceProfiles>,
    /// Build the index in the background right after startup.
    pub warmup_on_start: bool,
}

impl AppState {
    /// Load shared state from environment variables.
    ///
    /// # Errors
    /// [`AppError::Config`] for missing or invalid backend, retrieval or
    /// persona settings.
    pub fn from_env() -> Result<Self, AppError> {
        let llm = Arc::new(LlmServiceProfiles::new(
            config_ollama_chat()?,
            config_ollama_embedding()?,
            Some(HEALTH_TIMEOUT_SECS),
        )?);
        let cfg = ContextorConfig::from_env()?;
        let pipeline = RagPipeline::from_config(&cfg, Arc::clone(&llm))?;

        let (chat, embedding) = llm.profiles();
        info!(
            endpoint = %chat.endpoint,
            chat_model = %chat.model,
            embedding_model = %embedding.model,
            warmup = cfg.warmup_on_start,
            "app state ready"
        );

        Ok(Self {
            pipeline: Arc::new(pipeline),
            llm,
            warmup_on_start: cfg.warmup_on_start,
        })
    }
}
