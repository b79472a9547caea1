//! Shared LLM service with two active profiles: `chat` and `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Caches underlying HTTP clients per config (endpoint+model+timeout).
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::LlmServiceProfiles;
//! use ai_llm_service::config::default_config::{config_ollama_chat, config_ollama_embedding};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let svc = Arc::new(LlmServiceProfiles::new(
//!         config_ollama_chat()?,
//!         config_ollama_embedding()?,
//!         Some(10),
//!     )?);
//!
//!     let txt = svc.generate("Hello world", None).await?;
//!     let emb = svc.embed("Ferris").await?;
//!     println!("{txt} / dim = {}", emb.len());
//!     Ok(())
//! }
//! ```

use std::{
    collections::HashMap,
    hash::{Hash, Hasher},
    sync::Arc,
};

use tokio::sync::RwLock;

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, validate_range_f32},
    health_service::{HealthService, HealthStatus},
    services::ollama_service::OllamaService,
};

/// Shared service that manages the **chat** and **embedding** profiles.
///
/// Internally, it caches Ollama clients keyed by their configuration to
/// avoid recreating HTTP clients on each call.
#[derive(Debug)]
pub struct LlmServiceProfiles {
    chat: LlmModelConfig,
    embedding: LlmModelConfig,

    ollama: RwLock<HashMap<ClientKey, Arc<OllamaService>>>,

    health: HealthService,
}

impl LlmServiceProfiles {
    /// Creates a new service with two profiles.
    ///
    /// - `chat`: model answering questions.
    /// - `embedding`: model embedding passages and questions.
    /// - `health_timeout_secs`: optional timeout for the health checker.
    ///
    /// # Errors
    /// Returns [`AiLlmError::Config`] for an empty model name or an out-of-range
    /// `temperature`/`top_p`, and
    /// [`AiLlmError::HttpTransport`] if the health client cannot be built.
    pub fn new(
        chat: LlmModelConfig,
        embedding: LlmModelConfig,
        health_timeout_secs: Option<u64>,
    ) -> Result<Self, AiLlmError> {
        for cfg in [&chat, &embedding] {
            if cfg.model.trim().is_empty() {
                return Err(crate::error_handler::ConfigError::EmptyModel.into());
            }
            if let Some(t) = cfg.temperature {
                validate_range_f32("temperature", t, 0.0, 2.0)?;
            }
            if let Some(p) = cfg.top_p {
                validate_range_f32("top_p", p, 0.0, 1.0)?;
            }
        }

        Ok(Self {
            chat,
            embedding,
            ollama: RwLock::new(HashMap::new()),
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Generates text using the **chat** profile.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if generation fails.
    pub async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, AiLlmError> {
        match self.chat.provider {
            LlmProvider::Ollama => {
                let cli = self.get_or_init_ollama(&self.chat).await?;
                Ok(cli.generate(prompt, system).await?)
            }
        }
    }

    /// Computes embeddings using the **embedding** profile.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if embedding fails.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        match self.embedding.provider {
            LlmProvider::Ollama => {
                let cli = self.get_or_init_ollama(&self.embedding).await?;
                Ok(cli.embeddings(input).await?)
            }
        }
    }

    /// Returns a health snapshot for all distinct profiles.
    ///
    /// If the embedding profile equals the chat profile, it is checked only once.
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let mut list = Vec::<LlmModelConfig>::with_capacity(2);
        list.push(self.chat.clone());
        if self.embedding != self.chat {
            list.push(self.embedding.clone());
        }
        self.health.check_many(&list).await
    }

    /// Returns references to the current profiles `(chat, embedding)`.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig) {
        (&self.chat, &self.embedding)
    }

    /// Name of the chat model, reported by status endpoints.
    pub fn chat_model(&self) -> &str {
        &self.chat.model
    }

    /* --------------------- Internals --------------------- */

    async fn get_or_init_ollama(
        &self,
        cfg: &LlmModelConfig,
    ) -> Result<Arc<OllamaService>, AiLlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.ollama.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.ollama.write().await;
        if let Some(cli) = w.get(&key).cloned() {
            return Ok(cli);
        }
        let cli = Arc::new(OllamaService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }
}

/// Internal cache key to identify unique client configs.
#[derive(Debug, Clone, Eq)]
struct ClientKey {
    provider: LlmProvider,
    endpoint: String,
    model: String,
    timeout: Option<u64>,
}

impl From<&LlmModelConfig> for ClientKey {
    fn from(cfg: &LlmModelConfig) -> Self {
        Self {
            provider: cfg.provider,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            timeout: cfg.timeout_secs,
        }
    }
}

impl PartialEq for ClientKey {
    fn eq(&self, other: &Self) -> bool {
        self.provider == other.provider
            && self.endpoint == other.endpoint
            && self.model == other.model
            && self.timeout == other.timeout
    }
}

impl Hash for ClientKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.provider.hash(state);
        self.endpoint.hash(state);
        self.model.hash(state);
        self.timeout.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(model: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: model.into(),
            endpoint: "http://localhost:11434".into(),
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(30),
        }
    }

    #[test]
    fn empty_model_is_rejected() {
        let err = LlmServiceProfiles::new(cfg(" "), cfg("nomic-embed-text"), None).unwrap_err();
        assert!(matches!(err, AiLlmError::Config(_)));
    }

    #[tokio::test]
    async fn clients_are_cached_per_config() {
        let svc = LlmServiceProfiles::new(cfg("llama3.1:8b"), cfg("nomic-embed-text"), None)
            .unwrap();
        let a = svc.get_or_init_ollama(&cfg("llama3.1:8b")).await.unwrap();
        let b = svc.get_or_init_ollama(&cfg("llama3.1:8b")).await.unwrap();
        let c = svc
            .get_or_init_ollama(&cfg("nomic-embed-text"))
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(svc.chat_model(), "llama3.1:8b");
    }
}
