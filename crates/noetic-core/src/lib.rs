//! # noetic-core
//!
//! Core types, traits, and abstractions for the noetic knowledge backend.
//!
//! This crate provides the foundational data structures, the shared error
//! taxonomy, and the collaborator traits (stores, session cache, embedding
//! backend, vector index, notifier) that other noetic crates depend on.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, ErrorKind, Result, UniqueField};
pub use models::*;
pub use traits::*;

/// Generate a new time-ordered UUIDv7.
pub fn new_v7() -> uuid::Uuid {
    uuid::Uuid::now_v7()
}
