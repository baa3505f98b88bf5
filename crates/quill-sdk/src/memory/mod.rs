//! Engagement-Weighted Persona Memory
//!
//! Implements a three-layer memory over a user's posts:
//! - Short-term: one analyzed entry per post, scored by engagement
//! - Long-term: engagement-weighted summaries of compressed batches
//! - Persona snapshot: the current evolved voice, one per user
//!
//! # Flow
//!
//! 1. `MemoryBuffer::record` analyzes a post and appends it to STM
//! 2. Once enough entries are unprocessed, `CompressionEngine` folds them
//!    into one LTM entry
//! 3. `SnapshotBuilder` rebuilds the snapshot from the most recent LTM
//!
//! Provider replies that cannot be decoded fall back to fixed defaults
//! (see [`fallbacks`]); provider failures are returned as errors.

pub mod collections;
pub mod embeddings;
pub mod fallbacks;
pub mod prompts;
pub mod scoring;
pub mod structured;

mod buffer;
mod compression;
mod snapshot;
mod types;

pub use buffer::{compute_insights, MemoryBuffer};
pub use compression::{render_ltm_document, CompressionEngine, TieredBatch};
pub use embeddings::{build_embedder, Embedder, HashingEmbedder, EMBEDDING_DIMENSIONS};
#[cfg(feature = "embeddings")]
pub use embeddings::FastEmbedder;
pub use scoring::{EngagementScorer, EngagementTier, TierThresholds};
pub use snapshot::{rank_for_snapshot, render_snapshot_document, SnapshotBuilder, SnapshotMetrics};
pub use structured::{parse_or_fallback, Parsed};
pub use types::{
    CompressionOutcome, CompressionStatus, EngagementInsights, InsightTrend, NewPost,
    RecordedPost,
};
