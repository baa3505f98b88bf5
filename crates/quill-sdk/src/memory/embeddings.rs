//! Embedding providers for similarity search
//!
//! Two providers implement [`Embedder`]:
//!
//! - [`FastEmbedder`]: local all-MiniLM-L6-v2 inference via `fastembed`
//!   (384 dimensions, lazily loaded, `embeddings` feature)
//! - [`HashingEmbedder`]: deterministic SHA-256 feature hashing over word
//!   tokens, for tests and setups without a model download
//!
//! # Usage
//!
//! ```ignore
//! use quill_sdk::memory::embeddings::{Embedder, HashingEmbedder};
//!
//! let embedder = HashingEmbedder::new(384);
//! let vector = embedder.encode_one("hello world").await?;
//! ```

use crate::config::{EmbeddingConfig, EmbeddingProvider};
use crate::{SDKError, SDKResult};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Embedding dimensions for all-MiniLM-L6-v2
pub const EMBEDDING_DIMENSIONS: usize = 384;

/// Maps text to fixed-length vectors. Deterministic per model.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, one vector per input
    async fn encode(&self, texts: &[String]) -> SDKResult<Vec<Vec<f32>>>;

    /// Vector length produced by this embedder
    fn dimensions(&self) -> usize;

    /// Embed a single text
    async fn encode_one(&self, text: &str) -> SDKResult<Vec<f32>> {
        self.encode(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| SDKError::embedding("No embedding generated"))
    }
}

/// Build the embedder selected by configuration
pub fn build_embedder(config: &EmbeddingConfig) -> SDKResult<Arc<dyn Embedder>> {
    match config.provider {
        EmbeddingProvider::Hashing => Ok(Arc::new(HashingEmbedder::new(config.dimensions))),
        #[cfg(feature = "embeddings")]
        EmbeddingProvider::Fastembed => Ok(Arc::new(FastEmbedder::new())),
        #[cfg(not(feature = "embeddings"))]
        EmbeddingProvider::Fastembed => {
            Err(crate::config::ConfigValidationError::FeatureDisabled("fastembed".into()).into())
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Feature hashing
// ─────────────────────────────────────────────────────────────────────────────

/// Bag-of-words feature hashing embedder
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(EMBEDDING_DIMENSIONS)
    }
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let digest = Sha256::digest(token.as_bytes());
            let mut bucket = [0u8; 8];
            bucket.copy_from_slice(&digest[..8]);
            let index = (u64::from_le_bytes(bucket) % self.dimensions as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[index] += sign;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn encode(&self, texts: &[String]) -> SDKResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// fastembed
// ─────────────────────────────────────────────────────────────────────────────

/// Local sentence embedding model, loaded on first use
#[cfg(feature = "embeddings")]
pub struct FastEmbedder {
    model: Arc<tokio::sync::RwLock<Option<fastembed::TextEmbedding>>>,
}

#[cfg(feature = "embeddings")]
impl Default for FastEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "embeddings")]
impl FastEmbedder {
    pub fn new() -> Self {
        Self {
            model: Arc::new(tokio::sync::RwLock::new(None)),
        }
    }

    /// Initialize the embedding model (lazy loading)
    async fn ensure_model(&self) -> SDKResult<()> {
        use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

        let model_guard = self.model.read().await;
        if model_guard.is_some() {
            return Ok(());
        }
        drop(model_guard);

        let mut model_guard = self.model.write().await;
        if model_guard.is_some() {
            return Ok(());
        }

        tracing::info!("Loading embedding model: all-MiniLM-L6-v2");
        let start = std::time::Instant::now();

        let mut init_options = InitOptions::default();
        init_options.model_name = EmbeddingModel::AllMiniLML6V2;
        init_options.show_download_progress = false;

        let model = TextEmbedding::try_new(init_options)
            .map_err(|e| SDKError::embedding(format!("Failed to load embedding model: {}", e)))?;

        tracing::info!("Embedding model loaded in {:?}", start.elapsed());

        *model_guard = Some(model);
        Ok(())
    }

    /// Check if the model is loaded
    pub async fn is_loaded(&self) -> bool {
        self.model.read().await.is_some()
    }
}

#[cfg(feature = "embeddings")]
#[async_trait]
impl Embedder for FastEmbedder {
    async fn encode(&self, texts: &[String]) -> SDKResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        self.ensure_model().await?;

        let model_guard = self.model.read().await;
        let model = model_guard
            .as_ref()
            .ok_or_else(|| SDKError::embedding("Embedding model not initialized"))?;

        let inputs: Vec<&str> = texts.iter().map(String::as_str).collect();
        model
            .embed(inputs, None)
            .map_err(|e| SDKError::embedding(format!("Failed to generate embeddings: {}", e)))
    }

    fn dimensions(&self) -> usize {
        EMBEDDING_DIMENSIONS
    }
}
