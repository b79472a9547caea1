//! Runtime configuration loaded from environment variables.

use std::{path::PathBuf, time::Duration};

use answer_normalizer::NormalizerConfig;
use rag_store::RagConfig;

use crate::error::ContextorError;

pub const DEFAULT_CORPUS_PATH: &str = "data/profile.txt";
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 90;
pub const DEFAULT_STREAM_DELAY_MS: u64 = 15;
pub const DEFAULT_MAX_CTX_CHARS: usize = 6000;

/// Knobs the pipeline reads on every request.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineSettings {
    /// Passages retrieved per question.
    pub top_k: usize,
    /// Char budget for the context block of the prompt.
    pub max_ctx_chars: usize,
    /// Deadline for a single generation call.
    pub generation_timeout: Duration,
    /// Pause between two streamed units.
    pub stream_delay: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            top_k: RagConfig::default().top_k,
            max_ctx_chars: DEFAULT_MAX_CTX_CHARS,
            generation_timeout: Duration::from_secs(DEFAULT_GENERATION_TIMEOUT_SECS),
            stream_delay: Duration::from_millis(DEFAULT_STREAM_DELAY_MS),
        }
    }
}

/// Config bag for the pipeline. All fields have defaults via `from_env`.
#[derive(Clone, Debug)]
pub struct ContextorConfig {
    /// Profile document: a file or a directory of `.txt`/`.md` files.
    pub corpus_path: PathBuf,
    pub rag: RagConfig,
    pub normalizer: NormalizerConfig,
    pub settings: PipelineSettings,
    /// Build the index in the background at process start.
    pub warmup_on_start: bool,
}

impl ContextorConfig {
    /// Build from environment variables with sensible defaults.
    ///
    /// # Errors
    /// Returns [`ContextorError::Config`] if chunking or retrieval values are
    /// inconsistent (e.g. `CHUNK_OVERLAP >= CHUNK_SIZE`).
    pub fn from_env() -> Result<Self, ContextorError> {
        let rag = RagConfig::from_env().map_err(|e| ContextorError::Config(e.to_string()))?;

        let settings = PipelineSettings {
            top_k: rag.top_k,
            max_ctx_chars: parse_or("MAX_CTX_CHARS", DEFAULT_MAX_CTX_CHARS),
            generation_timeout: Duration::from_secs(parse_or(
                "GENERATION_TIMEOUT_SECS",
                DEFAULT_GENERATION_TIMEOUT_SECS,
            )),
            stream_delay: Duration::from_millis(parse_or("STREAM_DELAY_MS", DEFAULT_STREAM_DELAY_MS)),
        };
        if settings.generation_timeout.is_zero() {
            return Err(ContextorError::Config(
                "GENERATION_TIMEOUT_SECS must be > 0".into(),
            ));
        }

        Ok(Self {
            corpus_path: PathBuf::from(env_or("CORPUS_PATH", DEFAULT_CORPUS_PATH)),
            rag,
            normalizer: NormalizerConfig::from_env(),
            settings,
            warmup_on_start: flag("WARMUP_ON_START", true),
        })
    }
}

fn env_or(k: &str, dflt: &str) -> String {
    std::env::var(k)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| dflt.to_string())
}

fn flag(k: &str, dflt: bool) -> bool {
    match std::env::var(k).map(|v| v.trim().to_ascii_lowercase()) {
        Ok(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Ok(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => dflt,
    }
}

fn parse_or<T: std::str::FromStr>(k: &str, dflt: T) -> T {
    std::env::var(k)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(dflt)
}
