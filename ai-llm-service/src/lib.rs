//! Model backend access for the persona chat backend.
//!
//! One Ollama runtime serves two profiles: the chat model that answers
//! questions and the embedding model behind retrieval. Both are configured
//! from the environment (see [`config::default_config`]) and reached through
//! [`LlmServiceProfiles`].

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::{AiLlmError, ConfigError, HealthError, OllamaError};
pub use health_service::{HealthService, HealthStatus};
pub use service_profiles::LlmServiceProfiles;
pub use services::ollama_service::OllamaService;
