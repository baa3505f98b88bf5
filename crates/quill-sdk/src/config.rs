//! SDK Configuration
//!
//! Defines configuration options for the Quill SDK.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// SDK configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SDKConfig {
    /// Path to the SQLite database file
    pub database_path: PathBuf,

    /// Memory pipeline configuration
    pub memory: MemoryConfig,

    /// Content generation configuration
    pub generation: GenerationConfig,

    /// Embedding provider configuration
    pub embeddings: EmbeddingConfig,
}

impl Default for SDKConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("quill.db"),
            memory: MemoryConfig::default(),
            generation: GenerationConfig::default(),
            embeddings: EmbeddingConfig::default(),
        }
    }
}

/// Memory pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Unprocessed STM entries that trigger compression (default: 5)
    pub compression_threshold: usize,

    /// Weighted interaction total that maps to a full score (default: 1000)
    pub max_expected_engagement: f64,

    /// Scores above this are high-tier (default: 0.6)
    pub high_engagement_threshold: f64,

    /// Scores below this are low-tier (default: 0.3)
    pub low_engagement_threshold: f64,

    /// LTM entries folded into a persona snapshot (default: 3)
    pub snapshot_window: usize,

    /// Temperature for analysis, compression and snapshot calls (default: 0.3)
    pub analysis_temperature: f32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            compression_threshold: 5,
            max_expected_engagement: 1000.0,
            high_engagement_threshold: 0.6,
            low_engagement_threshold: 0.3,
            snapshot_window: 3,
            analysis_temperature: 0.3,
        }
    }
}

/// Content generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Temperature for the generation call (default: 0.7)
    pub temperature: f32,

    /// Token cap for the generation call (default: 1000)
    pub max_tokens: u32,

    /// Hashtag range requested in the prompt (default: 3-5)
    pub min_hashtags: u32,
    pub max_hashtags: u32,

    /// Character budget requested in the prompt (default: 1300)
    pub max_characters: u32,

    /// Items retrieved per context store (default: 5)
    pub context_results: usize,

    /// Own posts retrieved as candidates for self-examples (default: 5)
    pub self_example_candidates: usize,

    /// Own posts quoted in the prompt (default: 3)
    pub self_examples: usize,

    /// Characters quoted per self-example (default: 200)
    pub self_example_chars: usize,

    /// Reference posts returned by similarity search (default: 5)
    pub reference_top_k: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1000,
            min_hashtags: 3,
            max_hashtags: 5,
            max_characters: 1300,
            context_results: 5,
            self_example_candidates: 5,
            self_examples: 3,
            self_example_chars: 200,
            reference_top_k: 5,
        }
    }
}

/// Which embedding provider to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProvider {
    /// Local all-MiniLM-L6-v2 model (requires the `embeddings` feature)
    Fastembed,
    /// Deterministic feature hashing, no model download
    Hashing,
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,

    /// Vector size for the hashing provider (default: 384)
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: if cfg!(feature = "embeddings") {
                EmbeddingProvider::Fastembed
            } else {
                EmbeddingProvider::Hashing
            },
            dimensions: 384,
        }
    }
}

impl SDKConfig {
    /// Create a new SDK config with the given database path
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            ..Default::default()
        }
    }

    /// Set memory configuration
    pub fn with_memory(mut self, memory: MemoryConfig) -> Self {
        self.memory = memory;
        self
    }

    /// Set generation configuration
    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    /// Set embedding configuration
    pub fn with_embeddings(mut self, embeddings: EmbeddingConfig) -> Self {
        self.embeddings = embeddings;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let m = &self.memory;
        if m.compression_threshold == 0 {
            return Err(invalid("memory.compression_threshold", "must be greater than 0"));
        }
        if m.max_expected_engagement.is_nan() || m.max_expected_engagement <= 0.0 {
            return Err(invalid("memory.max_expected_engagement", "must be greater than 0"));
        }
        if !(0.0..=1.0).contains(&m.low_engagement_threshold)
            || !(0.0..=1.0).contains(&m.high_engagement_threshold)
            || m.low_engagement_threshold > m.high_engagement_threshold
        {
            return Err(invalid(
                "memory.low_engagement_threshold",
                "tier thresholds must satisfy 0 <= low <= high <= 1",
            ));
        }
        if m.snapshot_window == 0 {
            return Err(invalid("memory.snapshot_window", "must be greater than 0"));
        }

        let g = &self.generation;
        if !(0.0..=2.0).contains(&g.temperature) {
            return Err(invalid("generation.temperature", "must be between 0 and 2"));
        }
        if g.min_hashtags > g.max_hashtags {
            return Err(invalid("generation.min_hashtags", "must not exceed max_hashtags"));
        }
        if g.max_characters == 0 {
            return Err(invalid("generation.max_characters", "must be greater than 0"));
        }

        if self.embeddings.dimensions == 0 {
            return Err(invalid("embeddings.dimensions", "must be greater than 0"));
        }

        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigValidationError {
    ConfigValidationError::InvalidValue {
        field: field.into(),
        message: message.into(),
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("{0} support is not compiled in")]
    FeatureDisabled(String),
}
