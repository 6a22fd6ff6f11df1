//! Mock embedding backend for deterministic testing.
//!
//! Embeds text as a normalized bag of hashed words, so texts sharing words
//! land close together under cosine distance. No network, no randomness.
//!
//! ```rust,ignore
//! use noetic_inference::mock::MockEmbeddingBackend;
//! use noetic_core::EmbeddingBackend;
//!
//! # async fn run() {
//! let backend = MockEmbeddingBackend::new().with_dimension(64);
//! let v = backend.embed("tokio runtime").await.unwrap();
//! assert_eq!(v.as_slice().len(), 64);
//! # }
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use noetic_core::{EmbeddingBackend, Error, Result, Vector};

/// Default dimension for mock embeddings.
pub const MOCK_DIMENSION: usize = 128;

/// Deterministic embedding backend for tests.
#[derive(Clone)]
pub struct MockEmbeddingBackend {
    dimension: usize,
    fail: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl Default for MockEmbeddingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEmbeddingBackend {
    pub fn new() -> Self {
        Self {
            dimension: MOCK_DIMENSION,
            fail: Arc::new(AtomicBool::new(false)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension.max(1);
        self
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of `embed_texts` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Embed one text synchronously.
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dimension];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let slot = (hasher.finish() % self.dimension as u64) as usize;
            v[slot] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        } else {
            // Empty text still needs a valid, non-zero vector
            v[0] = 1.0;
        }
        v
    }
}

#[async_trait]
impl EmbeddingBackend for MockEmbeddingBackend {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Embedding("Mock embedding failure".to_string()));
        }
        Ok(texts
            .iter()
            .map(|t| Vector::from(self.embed_sync(t)))
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "mock-bag-of-words"
    }
}
