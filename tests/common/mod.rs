//! Test doubles shared by the integration tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use gikirag::embeddings::Embedder;
use gikirag::llm::BackendError;
use gikirag::llm::CompletionBackend;
use gikirag::llm::GenerationClient;
use gikirag::llm::Prompt;
use gikirag::llm::RetryPolicy;
use gikirag::llm::Sleeper;
use gikirag::models::Document;
use gikirag::models::EmbeddingVector;
use gikirag::models::Match;
use gikirag::models::MetadataValue;
use gikirag::rag::PipelineConfig;
use gikirag::rag::QueryPipeline;
use gikirag::vector_store::Metric;
use gikirag::vector_store::VectorStore;
use gikirag::RagError;
use gikirag::Result;

pub const DIM: usize = 8;

/// Embedder returning a constant unit vector
#[derive(Default)]
pub struct FakeEmbedder {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl FakeEmbedder {
    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    fn name(&self) -> &str {
        "fake"
    }

    fn dimension(&self) -> usize {
        DIM
    }

    async fn embed(&self, text: &str) -> Result<EmbeddingVector> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RagError::HttpError("connection refused".to_string()));
        }
        gikirag::embeddings::normalize_input(text)?;
        Ok(EmbeddingVector::new(vec![1.0; DIM]))
    }
}

/// Store returning a fixed ranked list, truncated to `top_k`
pub struct FakeStore {
    pub matches: Vec<Match>,
    pub calls: AtomicUsize,
    pub last_top_k: AtomicUsize,
    pub unavailable: bool,
}

impl FakeStore {
    pub fn with_matches(matches: Vec<Match>) -> Self {
        Self {
            matches,
            calls: AtomicUsize::new(0),
            last_top_k: AtomicUsize::new(0),
            unavailable: false,
        }
    }

    pub fn empty() -> Self {
        Self::with_matches(Vec::new())
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::empty()
        }
    }
}

#[async_trait]
impl VectorStore for FakeStore {
    fn name(&self) -> &str {
        "fake"
    }

    fn dimension(&self) -> usize {
        DIM
    }

    fn metric(&self) -> Metric {
        Metric::Cosine
    }

    async fn search(&self, vector: &EmbeddingVector, top_k: usize) -> Result<Vec<Match>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_top_k.store(top_k, Ordering::SeqCst);
        vector.ensure_dimension(DIM)?;
        if self.unavailable {
            return Err(RagError::StoreUnavailable("401 Unauthorized".to_string()));
        }
        Ok(self.matches.iter().take(top_k).cloned().collect())
    }
}

/// Backend replaying scripted replies, then repeating `fallback`
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<std::result::Result<String, BackendError>>>,
    fallback: std::result::Result<String, BackendError>,
    prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<std::result::Result<String, BackendError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fallback: Err(BackendError::Unclassified("script exhausted".to_string())),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn always(reply: std::result::Result<String, BackendError>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: reply,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        prompt: &Prompt,
        _max_output_tokens: u32,
    ) -> std::result::Result<String, BackendError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        let scripted = self.replies.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Sleeper that records requested delays and returns at once
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

/// Sleeper that never wakes, for cancellation tests
pub struct StalledSleeper;

#[async_trait]
impl Sleeper for StalledSleeper {
    async fn sleep(&self, _duration: Duration) {
        std::future::pending::<()>().await;
    }
}

pub fn policy() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(100), Duration::from_secs(2)).unwrap()
}

pub fn generator(backend: Arc<ScriptedBackend>, sleeper: Arc<dyn Sleeper>) -> GenerationClient {
    GenerationClient::new(backend, policy(), "GIKI").with_sleeper(sleeper)
}

pub fn doc(id: &str, text: &str) -> Document {
    let mut document = Document::new(id, text);
    document.metadata.insert(
        "url".to_string(),
        MetadataValue::Text(format!("https://giki.edu.pk/{id}")),
    );
    document
}

pub fn hit(id: &str, text: &str, score: f32) -> Match {
    Match::new(doc(id, text), score)
}

/// Pipeline over fakes with a plain-text answer format
pub fn pipeline(
    embedder: Arc<FakeEmbedder>,
    store: Arc<FakeStore>,
    backend: Arc<ScriptedBackend>,
) -> QueryPipeline {
    let config = PipelineConfig {
        format: gikirag::rag::AnswerFormat::Plain,
        ..PipelineConfig::default()
    };
    QueryPipeline::new(
        embedder,
        store,
        generator(backend, Arc::new(RecordingSleeper::default())),
        config,
    )
}
