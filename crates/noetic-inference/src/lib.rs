//! # noetic-inference
//!
//! Embedding backends for noetic.
//!
//! This crate provides:
//! - OpenAI-compatible embedding backend (feature `openai`, default)
//! - Deterministic mock backend for tests (feature `mock`)
//!
//! Both implement [`noetic_core::EmbeddingBackend`].
//!
//! # Example
//!
//! ```rust,no_run
//! use noetic_inference::OpenAIBackend;
//! use noetic_core::EmbeddingBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OpenAIBackend::from_env().unwrap();
//!     let texts = vec!["Hello".to_string()];
//!     let embeddings = backend.embed_texts(&texts).await.unwrap();
//! }
//! ```

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use noetic_core::*;

#[cfg(feature = "openai")]
pub use openai::{OpenAIBackend, OpenAIConfig};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbeddingBackend;
