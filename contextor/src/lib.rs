//! Persona RAG pipeline.
//!
//! [`RagPipeline::ask`] takes a visitor's question and returns the final
//! answer text: it waits for the retrieval index (built once, on demand, by
//! the [`InitializationGuard`]), retrieves top-K passages from `rag-store`,
//! builds a persona prompt, calls the chat model under a deadline and runs
//! the raw completion through the `answer-normalizer` stages.
//!
//! The reserved question [`STATUS_SENTINEL`] reports the index state instead
//! of calling the model. Streaming callers feed the final text to the
//! [`StreamEmitter`].

mod api_types;
mod cfg;
mod emitter;
mod error;
mod guard;
mod llm;
pub mod prompt;

use std::{sync::Arc, time::Instant};

use futures::stream::BoxStream;
use tracing::{debug, info, instrument};

use ai_llm_service::LlmServiceProfiles;
use answer_normalizer::{PersonaProfile, ResponseNormalizer};
use rag_store::{EmbeddingsProvider, FileCorpus, OllamaConfig, OllamaEmbedder};

pub use api_types::{Reply, StatusReport};
pub use cfg::{ContextorConfig, PipelineSettings};
pub use emitter::{CancelHandle, StreamEmitter};
pub use error::ContextorError;
pub use guard::{IndexBuilder, InitStatus, InitializationGuard, RagIndexBuilder};
pub use llm::ChatModel;

/// Question value that returns the initialization status.
pub const STATUS_SENTINEL: &str = "system_check";

/// Collaborators of a pipeline. Tests swap each of them for a fake.
pub struct PipelineDeps {
    pub builder: Arc<dyn IndexBuilder>,
    /// Embeds questions; must match the model the index was built with.
    pub embedder: Arc<dyn EmbeddingsProvider>,
    pub chat: Arc<dyn ChatModel>,
    pub persona: PersonaProfile,
    pub normalizer: ResponseNormalizer,
}

pub struct RagPipeline {
    guard: InitializationGuard,
    embedder: Arc<dyn EmbeddingsProvider>,
    chat: Arc<dyn ChatModel>,
    persona: PersonaProfile,
    normalizer: ResponseNormalizer,
    emitter: StreamEmitter,
    settings: PipelineSettings,
}

impl RagPipeline {
    pub fn new(deps: PipelineDeps, settings: PipelineSettings) -> Self {
        Self {
            guard: InitializationGuard::new(deps.builder),
            embedder: deps.embedder,
            chat: deps.chat,
            persona: deps.persona,
            normalizer: deps.normalizer,
            emitter: StreamEmitter::new(settings.stream_delay),
            settings,
        }
    }

    /// Production wiring: file corpus, Ollama embeddings and chat through
    /// `svc`, persona from `PERSONA_FILE` or the built-in profile.
    ///
    /// # Errors
    /// [`ContextorError::Config`] for an invalid persona profile.
    pub fn from_config(cfg: &ContextorConfig, svc: Arc<LlmServiceProfiles>) -> Result<Self, ContextorError> {
        let persona = PersonaProfile::from_env()?;
        let normalizer = ResponseNormalizer::new(&persona, &cfg.normalizer)?;

        let embedder: Arc<dyn EmbeddingsProvider> = Arc::new(OllamaEmbedder::new(OllamaConfig {
            svc: Arc::clone(&svc),
            dim: cfg.rag.embedding_dim,
        }));
        let builder = RagIndexBuilder::new(
            cfg.rag.clone(),
            Arc::new(FileCorpus::new(&cfg.corpus_path)),
            Arc::clone(&embedder),
        )
        .with_probe(Arc::clone(&svc));

        info!(
            persona = %persona.full_name,
            corpus = %cfg.corpus_path.display(),
            model = svc.chat_model(),
            top_k = cfg.settings.top_k,
            "rag pipeline configured"
        );

        Ok(Self::new(
            PipelineDeps {
                builder: Arc::new(builder),
                embedder,
                chat: svc,
                persona,
                normalizer,
            },
            cfg.settings.clone(),
        ))
    }

    /// Answers `question`, or reports status for [`STATUS_SENTINEL`].
    ///
    /// # Errors
    /// - [`ContextorError::EmptyQuestion`] before anything else runs.
    /// - [`ContextorError::Initialization`] when the index build failed.
    /// - [`ContextorError::Generation`] / [`ContextorError::Timeout`] from the model call.
    /// - [`ContextorError::Rag`] when the question cannot be embedded.
    pub async fn ask(&self, question: &str) -> Result<Reply, ContextorError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ContextorError::EmptyQuestion);
        }
        if question == STATUS_SENTINEL {
            return Ok(Reply::Status(self.status_report().await));
        }

        let raw = self.answer(question).await?;
        let text = self.normalizer.normalize(&raw, question);
        debug!(raw_chars = raw.len(), chars = text.len(), "answer normalized");
        Ok(Reply::Answer(text))
    }

    /// Raw completion for `question`: retrieve, prompt, generate.
    #[instrument(level = "debug", skip(self))]
    pub async fn answer(&self, question: &str) -> Result<String, ContextorError> {
        let index = self.guard.ensure_ready().await?;
        let hits = index
            .query(question, self.settings.top_k, self.embedder.as_ref())
            .await?;
        debug!(hits = hits.len(), "context retrieved");

        let prompt = prompt::build_prompt(&self.persona, question, &hits, self.settings.max_ctx_chars);

        let t0 = Instant::now();
        let deadline = self.settings.generation_timeout;
        let raw = tokio::time::timeout(deadline, self.chat.complete(&prompt))
            .await
            .map_err(|_| ContextorError::Timeout(deadline))??;
        info!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            prompt_chars = prompt.len(),
            "generation done"
        );
        Ok(raw)
    }

    /// Current index state as the status payload. Kicks off a background
    /// build when nothing is built or running.
    pub async fn status_report(&self) -> StatusReport {
        match self.guard.status().await {
            InitStatus::Ready { .. } => StatusReport::Ready {
                model: self.chat.model_name(),
            },
            InitStatus::Initializing => StatusReport::Initializing,
            InitStatus::Uninitialized => {
                self.guard.warm_up();
                StatusReport::Initializing
            }
            InitStatus::Error(error) => {
                self.guard.warm_up();
                StatusReport::Error { error }
            }
        }
    }

    /// Paced char stream of an already normalized answer.
    pub fn stream(&self, text: String) -> (BoxStream<'static, char>, CancelHandle) {
        self.emitter.emit(text)
    }

    pub fn guard(&self) -> &InitializationGuard {
        &self.guard
    }

    pub fn model_name(&self) -> String {
        self.chat.model_name()
    }

    pub fn warm_up(&self) {
        self.guard.warm_up();
    }

    /// See [`InitializationGuard::reset`].
    pub async fn reset(&self) -> bool {
        self.guard.reset().await
    }
}
