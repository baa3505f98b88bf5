//! Main SDK Entry Point
//!
//! Wires the store, embedder and text generator into the pipeline
//! components and hands them out by reference.

use std::path::Path;
use std::sync::Arc;

use quill_core::{Database, TextGenerator};

use crate::backends::Backends;
use crate::context::ContextStore;
use crate::generation::{ContentGenerator, ReferenceLibrary};
use crate::memory::{build_embedder, CompressionEngine, MemoryBuffer, SnapshotBuilder};
use crate::{SDKConfig, SDKResult};

/// Database path that selects a throwaway in-memory store
pub const IN_MEMORY_PATH: &str = ":memory:";

/// Quill SDK - Main entry point
///
/// The SDK provides access to:
/// - Short-term memory and engagement insights
/// - STM to LTM compression and persona snapshots
/// - Personal, company and achievement context
/// - The reference post library and content generation
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use quill_sdk::{NewPost, RequestContext, SDKConfig, SDK};
/// use quill_sdk::llm::client::{ChatCompletionsClient, ClientConfig};
///
/// async fn example() -> anyhow::Result<()> {
///     let client = ChatCompletionsClient::new(ClientConfig::from_env())?;
///     let sdk = SDK::new(SDKConfig::new("quill.db"), Arc::new(client))?;
///
///     let ctx = RequestContext::new("user-123")?;
///     sdk.memory().record(&ctx, NewPost::new("Shipped our beta today", "Launch")).await?;
///
///     Ok(())
/// }
/// ```
pub struct SDK {
    /// SDK configuration
    config: SDKConfig,

    backends: Backends,

    memory: MemoryBuffer,
    context: ContextStore,
    references: ReferenceLibrary,
    content: ContentGenerator,
}

impl SDK {
    /// Create a new SDK instance
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration validation fails
    /// - The database cannot be opened or migrated
    /// - The configured embedding provider is unavailable
    pub fn new(config: SDKConfig, generator: Arc<dyn TextGenerator>) -> SDKResult<Self> {
        config.validate()?;

        let database = if config.database_path.as_path() == Path::new(IN_MEMORY_PATH) {
            Database::open_in_memory()?
        } else {
            Database::open_path(&config.database_path)?
        };
        let embedder = build_embedder(&config.embeddings)?;

        Self::with_backends(config, Backends::new(Arc::new(database), embedder, generator))
    }

    /// Create an SDK over caller-provided backends
    pub fn with_backends(config: SDKConfig, backends: Backends) -> SDKResult<Self> {
        config.validate()?;

        let snapshots = SnapshotBuilder::new(backends.clone(), config.memory.clone());
        let compression =
            CompressionEngine::new(backends.clone(), config.memory.clone(), snapshots.clone());
        let memory = MemoryBuffer::new(backends.clone(), config.memory.clone(), compression);
        let context = ContextStore::new(backends.clone());
        let references = ReferenceLibrary::new(backends.clone());
        let content = ContentGenerator::new(
            backends.clone(),
            config.generation.clone(),
            memory.clone(),
            snapshots,
            context.clone(),
        );

        tracing::debug!(
            database = %config.database_path.display(),
            generator = backends.generator.name(),
            dimensions = backends.embedder.dimensions(),
            "SDK initialized"
        );

        Ok(Self {
            config,
            backends,
            memory,
            context,
            references,
            content,
        })
    }

    pub fn config(&self) -> &SDKConfig {
        &self.config
    }

    pub fn backends(&self) -> &Backends {
        &self.backends
    }

    /// Short-term memory
    pub fn memory(&self) -> &MemoryBuffer {
        &self.memory
    }

    /// STM to LTM compression
    pub fn compression(&self) -> &CompressionEngine {
        self.memory.compression()
    }

    /// Persona snapshots
    pub fn snapshots(&self) -> &SnapshotBuilder {
        self.memory.compression().snapshots()
    }

    /// Personal, company and achievement context
    pub fn context(&self) -> &ContextStore {
        &self.context
    }

    /// Reference posts by followed creators
    pub fn references(&self) -> &ReferenceLibrary {
        &self.references
    }

    /// Content generation
    pub fn content(&self) -> &ContentGenerator {
        &self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EmbeddingConfig, EmbeddingProvider, MemoryConfig};
    use crate::testing::ScriptedGenerator;

    fn hashing_config(path: impl Into<std::path::PathBuf>) -> SDKConfig {
        SDKConfig::new(path).with_embeddings(EmbeddingConfig {
            provider: EmbeddingProvider::Hashing,
            dimensions: 64,
        })
    }

    #[test]
    fn test_new_in_memory() {
        let sdk = SDK::new(hashing_config(IN_MEMORY_PATH), Arc::new(ScriptedGenerator::new())).unwrap();
        assert_eq!(sdk.backends().embedder.dimensions(), 64);
        assert_eq!(sdk.backends().generator.name(), "scripted");
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = hashing_config(IN_MEMORY_PATH).with_memory(MemoryConfig {
            compression_threshold: 0,
            ..Default::default()
        });
        assert!(SDK::new(config, Arc::new(ScriptedGenerator::new())).is_err());
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("quill.db");

        {
            let sdk = SDK::new(hashing_config(&path), Arc::new(ScriptedGenerator::new())).unwrap();
            let ctx = crate::RequestContext::new("alice").unwrap();
            sdk.memory()
                .record(&ctx, crate::NewPost::new("persisted", "t"))
                .await
                .unwrap();
        }

        let sdk = SDK::new(hashing_config(&path), Arc::new(ScriptedGenerator::new())).unwrap();
        let ctx = crate::RequestContext::new("alice").unwrap();
        assert_eq!(sdk.memory().entries(&ctx).unwrap().len(), 1);
    }
}
