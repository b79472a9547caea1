//! In-process app state with fake backends for handler tests.

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use ai_llm_service::{LlmModelConfig, LlmProvider, LlmServiceProfiles};
use answer_normalizer::{FixedClock, NormalizerConfig, PersonaProfile, ResponseNormalizer};
use axum::{body::Body, response::Response};
use contextor::{
    ChatModel, ContextorError, PipelineDeps, PipelineSettings, RagIndexBuilder, RagPipeline,
};
use rag_store::{EmbeddingsProvider, RagConfig, RagError, StaticCorpus};

use crate::core::app_state::AppState;

struct LengthEmbedder;

impl EmbeddingsProvider for LengthEmbedder {
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, RagError>> + Send + 'a>> {
        Box::pin(async move { Ok(vec![1.0, text.len() as f32 / 100.0]) })
    }
}

/// Chat model replying with a fixed completion, or failing when `None`.
pub struct CannedChat(pub Option<&'static str>);

impl ChatModel for CannedChat {
    fn complete<'a>(
        &'a self,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ContextorError>> + Send + 'a>> {
        Box::pin(async move {
            self.0
                .map(str::to_string)
                .ok_or_else(|| ContextorError::Generation("HTTP 503: model is loading".into()))
        })
    }

    fn model_name(&self) -> String {
        "canned".into()
    }
}

fn unreachable_backend(model: &str) -> LlmModelConfig {
    LlmModelConfig {
        provider: LlmProvider::Ollama,
        model: model.into(),
        endpoint: "http://127.0.0.1:9".into(),
        max_tokens: None,
        temperature: None,
        top_p: None,
        timeout_secs: Some(1),
    }
}

pub fn state_with(chat: CannedChat, corpus: StaticCorpus) -> AppState {
    let persona = PersonaProfile::default();
    let clock = FixedClock::at(2026, 10, 19, 14, 5).unwrap();
    let normalizer =
        ResponseNormalizer::with_clock(&persona, &NormalizerConfig::default(), Arc::new(clock)).unwrap();
    let embedder: Arc<dyn EmbeddingsProvider> = Arc::new(LengthEmbedder);
    let builder = RagIndexBuilder::new(RagConfig::default(), Arc::new(corpus), Arc::clone(&embedder));

    let pipeline = RagPipeline::new(
        PipelineDeps {
            builder: Arc::new(builder),
            embedder,
            chat: Arc::new(chat),
            persona,
            normalizer,
        },
        PipelineSettings {
            stream_delay: Duration::from_millis(1),
            ..PipelineSettings::default()
        },
    );

    let llm = LlmServiceProfiles::new(unreachable_backend("chat"), unreachable_backend("embed"), Some(1))
        .unwrap();
    AppState {
        pipeline: Arc::new(pipeline),
        llm: Arc::new(llm),
        warmup_on_start: false,
    }
}

pub fn state(reply: Option<&'static str>) -> AppState {
    state_with(
        CannedChat(reply),
        StaticCorpus::new(["I build reliable backend systems in Rust and Go."]),
    )
}

pub async fn body_string(res: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(res: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(res).await).unwrap()
}
