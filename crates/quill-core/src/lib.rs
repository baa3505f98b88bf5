//! quill-core - Core library for Quill
//!
//! This crate provides the shared building blocks of the persona evolution
//! engine:
//!
//! - **db**: SQLite-backed vector collections (add / get / query / delete)
//! - **types**: Domain records (STM, LTM, persona snapshot, context items)
//!   and the metadata codec that maps them onto scalar-only store metadata
//! - **llm**: The generative text provider contract and an
//!   OpenAI-compatible HTTP client
//! - **error**: The error taxonomy shared by every crate in the workspace

pub mod db;
pub mod error;
pub mod llm;
pub mod types;

// Re-export commonly used types
pub use db::{Database, MetadataRecord, VectorStore};
pub use error::{Error, Result};
pub use llm::{CompletionRequest, TextGenerator};
