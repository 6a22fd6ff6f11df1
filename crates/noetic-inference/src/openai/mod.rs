//! OpenAI-compatible embedding backend.
//!
//! Works with any endpoint that implements `POST /embeddings` in the OpenAI
//! shape: OpenAI itself, Azure OpenAI, Ollama in compatibility mode, vLLM,
//! LocalAI.
//!
//! # Example
//!
//! ```rust,no_run
//! use noetic_inference::openai::{OpenAIBackend, OpenAIConfig};
//! use noetic_core::EmbeddingBackend;
//!
//! # async fn run() -> noetic_core::Result<()> {
//! let backend = OpenAIBackend::new(OpenAIConfig {
//!     base_url: "http://localhost:11434/v1".to_string(),
//!     embed_model: "nomic-embed-text".to_string(),
//!     embed_dimension: 768,
//!     ..Default::default()
//! })?;
//! let vector = backend.embed("Hello, world!").await?;
//! # Ok(())
//! # }
//! ```

mod backend;
mod error;
mod types;

pub use backend::{OpenAIBackend, OpenAIConfig, DEFAULT_MAX_RETRIES};
pub use error::{to_embedding_error, OpenAIErrorCode};
pub use types::*;
