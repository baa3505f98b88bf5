//! Quill SDK - Persona Evolution Engine
//!
//! This crate provides the pipeline that evolves a user's writing persona
//! from the engagement of their posts, and uses it to generate new posts:
//!
//! # Core Modules (from quill-core)
//!
//! - **db** - Vector collections over SQLite
//! - **types** - Memory, context and reference records
//! - **llm** - Text generation contract and chat-completions client
//!
//! # SDK Modules
//!
//! - **memory** - Short-term memory, compression into long-term memory and
//!   persona snapshots
//! - **context** - Personal, company and achievement context
//! - **generation** - Reference post library and content generation
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use quill_sdk::{GenerationRequest, RequestContext, SDKConfig, SDK};
//! use quill_sdk::llm::client::{ChatCompletionsClient, ClientConfig};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = ChatCompletionsClient::new(ClientConfig::from_env())?;
//!     let sdk = SDK::new(SDKConfig::new("quill.db"), Arc::new(client))?;
//!     let ctx = RequestContext::new("user-123")?;
//!
//!     let post = sdk
//!         .content()
//!         .generate(&ctx, GenerationRequest::new("Lessons from remote hiring", Default::default()))
//!         .await?;
//!     println!("{}", post.text);
//!
//!     Ok(())
//! }
//! ```

// ─────────────────────────────────────────────────────────────────────────────
// Re-export core modules from quill-core
// ─────────────────────────────────────────────────────────────────────────────

/// Vector collections over SQLite
pub use quill_core::db;

/// Memory, context and reference records
pub use quill_core::types;

/// Text generation contract and client
pub use quill_core::llm;

/// Error types from core
pub use quill_core::error as core_error;

// ─────────────────────────────────────────────────────────────────────────────
// SDK-specific modules
// ─────────────────────────────────────────────────────────────────────────────

pub mod context;
pub mod generation;
pub mod memory;
pub mod testing;
pub mod utils;

mod backends;
mod config;
mod error;
mod request;
mod sdk;

// Re-export main SDK types
pub use backends::Backends;
pub use config::{
    ConfigValidationError, EmbeddingConfig, EmbeddingProvider, GenerationConfig, MemoryConfig,
    SDKConfig,
};
pub use error::{SDKError, SDKResult};
pub use request::RequestContext;
pub use sdk::{IN_MEMORY_PATH, SDK};

pub use context::{
    ContextKind, ContextStore, ContextSummary, NewAchievement, NewCompanyInfo,
    NewPersonalContext, RelevantContext, StoreSummary,
};
pub use generation::{
    ContentGenerator, CreatorPreference, GeneratedPost, GenerationRequest, ReferenceLibrary,
    SimilarPost, UserProfile,
};
pub use memory::{
    CompressionEngine, CompressionOutcome, CompressionStatus, Embedder, EngagementInsights,
    EngagementScorer, InsightTrend, MemoryBuffer, NewPost, RecordedPost, SnapshotBuilder,
};
