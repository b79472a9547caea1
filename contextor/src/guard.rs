//! Single-flight lifecycle of the retrieval index.
//!
//! The guard owns the only mutable shared state of the pipeline. A build is
//! published as a shared future under the lock, so concurrent callers that
//! arrive while it runs await that same future instead of starting another.
//! The build itself runs on a spawned task: a caller that gives up does not
//! cancel the work the other waiters depend on.

use std::{future::Future, pin::Pin, sync::Arc, time::Instant};

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use ai_llm_service::LlmServiceProfiles;
use rag_store::{CorpusSource, EmbeddingsProvider, RagConfig, RetrievalIndex};

use crate::error::ContextorError;

/// Produces a fresh index. Called at most once per in-flight build.
pub trait IndexBuilder: Send + Sync + 'static {
    fn build(&self) -> Pin<Box<dyn Future<Output = Result<RetrievalIndex, ContextorError>> + Send + '_>>;
}

/// Loads the corpus, chunks it and embeds it with `rag-store`.
pub struct RagIndexBuilder {
    cfg: RagConfig,
    corpus: Arc<dyn CorpusSource>,
    embedder: Arc<dyn EmbeddingsProvider>,
    probe: Option<Arc<LlmServiceProfiles>>,
}

impl RagIndexBuilder {
    pub fn new(
        cfg: RagConfig,
        corpus: Arc<dyn CorpusSource>,
        embedder: Arc<dyn EmbeddingsProvider>,
    ) -> Self {
        Self {
            cfg,
            corpus,
            embedder,
            probe: None,
        }
    }

    /// Probe these backends before every build. A failed probe is logged only.
    pub fn with_probe(mut self, svc: Arc<LlmServiceProfiles>) -> Self {
        self.probe = Some(svc);
        self
    }
}

impl IndexBuilder for RagIndexBuilder {
    fn build(&self) -> Pin<Box<dyn Future<Output = Result<RetrievalIndex, ContextorError>> + Send + '_>> {
        Box::pin(async move {
            if let Some(svc) = &self.probe {
                for h in svc.health_all().await {
                    if h.ok {
                        debug!(endpoint = %h.endpoint, latency_ms = h.latency_ms as u64, "backend probe ok");
                    } else {
                        warn!(endpoint = %h.endpoint, message = %h.message, "backend probe failed; building anyway");
                    }
                }
            }
            info!(source = %self.corpus.describe(), "building retrieval index");
            let index =
                rag_store::build_index(&self.cfg, self.corpus.as_ref(), self.embedder.as_ref()).await?;
            Ok(index)
        })
    }
}

type BuildResult = Result<Arc<RetrievalIndex>, String>;
type InFlight = Shared<BoxFuture<'static, BuildResult>>;

enum State {
    Uninitialized,
    Initializing(InFlight),
    Ready(Arc<RetrievalIndex>),
}

struct Inner {
    state: State,
    last_error: Option<String>,
    builds: u64,
}

/// Observable lifecycle state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InitStatus {
    Uninitialized,
    Initializing,
    Ready { passages: usize },
    /// Not built; the last attempt failed with this message.
    Error(String),
}

#[derive(Clone)]
pub struct InitializationGuard {
    inner: Arc<Mutex<Inner>>,
    builder: Arc<dyn IndexBuilder>,
}

impl InitializationGuard {
    pub fn new(builder: Arc<dyn IndexBuilder>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: State::Uninitialized,
                last_error: None,
                builds: 0,
            })),
            builder,
        }
    }

    /// Returns the cached index, joining or starting the single build.
    ///
    /// # Errors
    /// [`ContextorError::Initialization`] when the build this call waited on
    /// failed. The guard is back to uninitialized by then, so the next call
    /// retries.
    pub async fn ensure_ready(&self) -> Result<Arc<RetrievalIndex>, ContextorError> {
        let in_flight = {
            let mut inner = self.inner.lock().await;
            if let State::Ready(index) = &inner.state {
                return Ok(Arc::clone(index));
            }
            if let State::Initializing(fut) = &inner.state {
                debug!("joining in-flight index build");
                fut.clone()
            } else {
                self.start_build(&mut inner)
            }
        };
        in_flight.await.map_err(ContextorError::Initialization)
    }

    /// Starts a build in the background unless one is running or done.
    pub fn warm_up(&self) {
        let guard = self.clone();
        tokio::spawn(async move {
            if let Err(e) = guard.ensure_ready().await {
                debug!(error = %e, "warm-up build did not succeed");
            }
        });
    }

    pub async fn status(&self) -> InitStatus {
        let inner = self.inner.lock().await;
        match &inner.state {
            State::Ready(index) => InitStatus::Ready {
                passages: index.len(),
            },
            State::Initializing(_) => InitStatus::Initializing,
            State::Uninitialized => match &inner.last_error {
                Some(e) => InitStatus::Error(e.clone()),
                None => InitStatus::Uninitialized,
            },
        }
    }

    /// Drops the cached index so the next call rebuilds.
    ///
    /// Returns `false` and changes nothing while a build is in flight.
    pub async fn reset(&self) -> bool {
        let mut inner = self.inner.lock().await;
        if matches!(inner.state, State::Initializing(_)) {
            return false;
        }
        inner.state = State::Uninitialized;
        inner.last_error = None;
        info!("retrieval index reset");
        true
    }

    /// Number of builds started since creation.
    pub async fn builds_started(&self) -> u64 {
        self.inner.lock().await.builds
    }

    fn start_build(&self, inner: &mut Inner) -> InFlight {
        inner.builds += 1;
        let attempt = inner.builds;
        info!(attempt, "index build started");

        let builder = Arc::clone(&self.builder);
        let shared = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let t0 = Instant::now();
            let result = builder
                .build()
                .await
                .map(Arc::new)
                .map_err(|e| e.to_string());

            // Publish before the shared future resolves.
            let mut inner = shared.lock().await;
            match &result {
                Ok(index) => {
                    info!(
                        attempt,
                        passages = index.len(),
                        elapsed_ms = t0.elapsed().as_millis() as u64,
                        "index ready"
                    );
                    inner.state = State::Ready(Arc::clone(index));
                    inner.last_error = None;
                }
                Err(e) => {
                    error!(attempt, error = %e, "index build failed; state reset");
                    inner.state = State::Uninitialized;
                    inner.last_error = Some(e.clone());
                }
            }
            result
        });

        let shared = Arc::clone(&self.inner);
        let fut: BoxFuture<'static, BuildResult> = async move {
            match task.await {
                Ok(result) => result,
                Err(e) => {
                    let msg = format!("index build task aborted: {e}");
                    error!(attempt, error = %msg, "index build failed; state reset");
                    let mut inner = shared.lock().await;
                    inner.state = State::Uninitialized;
                    inner.last_error = Some(msg.clone());
                    Err(msg)
                }
            }
        }
        .boxed();

        let fut = fut.shared();
        inner.state = State::Initializing(fut.clone());
        fut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::{LlmModelConfig, LlmProvider};
    use rag_store::{Passage, PassageOffset, RagError, StaticCorpus};
    use std::{
        sync::atomic::{AtomicBool, AtomicUsize, Ordering},
        time::Duration,
    };

    fn tiny_index() -> RetrievalIndex {
        let passage = Passage {
            ordinal: 0,
            text: "I write Rust.".into(),
            offset: PassageOffset { segment: 0, start: 0 },
        };
        RetrievalIndex::from_entries(vec![(passage, vec![1.0, 0.0])]).unwrap()
    }

    /// Counts calls; fails while `failing` is set.
    struct CountingBuilder {
        calls: AtomicUsize,
        failing: AtomicBool,
    }

    impl CountingBuilder {
        fn new(failing: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                failing: AtomicBool::new(failing),
            })
        }
    }

    impl IndexBuilder for CountingBuilder {
        fn build(
            &self,
        ) -> Pin<Box<dyn Future<Output = Result<RetrievalIndex, ContextorError>> + Send + '_>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(30)).await;
                if self.failing.load(Ordering::SeqCst) {
                    Err(RagError::Unavailable("embedding backend refused connection".into()).into())
                } else {
                    Ok(tiny_index())
                }
            })
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_share_one_build() {
        let builder = CountingBuilder::new(false);
        let guard = InitializationGuard::new(builder.clone());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let g = guard.clone();
                tokio::spawn(async move { g.ensure_ready().await })
            })
            .collect();
        for h in handles {
            assert_eq!(h.await.unwrap().unwrap().len(), 1);
        }

        assert_eq!(builder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(guard.builds_started().await, 1);
        assert_eq!(guard.status().await, InitStatus::Ready { passages: 1 });

        guard.ensure_ready().await.unwrap();
        assert_eq!(builder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failure_resets_state_and_next_call_rebuilds() {
        let builder = CountingBuilder::new(true);
        let guard = InitializationGuard::new(builder.clone());

        let err = guard.ensure_ready().await.unwrap_err();
        assert!(matches!(err, ContextorError::Initialization(ref m) if m.contains("refused connection")));
        match guard.status().await {
            InitStatus::Error(msg) => assert!(msg.contains("refused connection")),
            other => panic!("unexpected status {other:?}"),
        }

        builder.failing.store(false, Ordering::SeqCst);
        guard.ensure_ready().await.unwrap();
        assert_eq!(builder.calls.load(Ordering::SeqCst), 2);
        assert_eq!(guard.status().await, InitStatus::Ready { passages: 1 });
    }

    #[tokio::test]
    async fn waiters_receive_the_same_failure() {
        let builder = CountingBuilder::new(true);
        let guard = InitializationGuard::new(builder.clone());

        let (a, b) = tokio::join!(guard.ensure_ready(), guard.ensure_ready());
        let (a, b) = (a.unwrap_err().to_string(), b.unwrap_err().to_string());
        assert_eq!(a, b);
        assert_eq!(builder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reset_is_refused_while_building_and_forces_a_rebuild_after() {
        let builder = CountingBuilder::new(false);
        let guard = InitializationGuard::new(builder.clone());
        assert_eq!(guard.status().await, InitStatus::Uninitialized);

        guard.warm_up();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(guard.status().await, InitStatus::Initializing);
        assert!(!guard.reset().await);

        guard.ensure_ready().await.unwrap();
        assert!(guard.reset().await);
        assert_eq!(guard.status().await, InitStatus::Uninitialized);

        guard.ensure_ready().await.unwrap();
        assert_eq!(builder.calls.load(Ordering::SeqCst), 2);
    }

    struct UnitEmbedder;

    impl EmbeddingsProvider for UnitEmbedder {
        fn embed<'a>(
            &'a self,
            text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, RagError>> + Send + 'a>> {
            Box::pin(async move { Ok(vec![text.len() as f32, 1.0]) })
        }
    }

    fn closed_port(model: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: model.into(),
            endpoint: "http://127.0.0.1:1".into(),
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(1),
        }
    }

    #[tokio::test]
    async fn unreachable_backends_do_not_block_the_build() {
        let svc = LlmServiceProfiles::new(closed_port("chat"), closed_port("embed"), Some(1)).unwrap();
        let builder = RagIndexBuilder::new(
            RagConfig::default(),
            Arc::new(StaticCorpus::new(["I build reliable backend systems in Rust."])),
            Arc::new(UnitEmbedder),
        )
        .with_probe(Arc::new(svc));
        let guard = InitializationGuard::new(Arc::new(builder));

        let index = guard.ensure_ready().await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(guard.status().await, InitStatus::Ready { passages: 1 });
    }
}
