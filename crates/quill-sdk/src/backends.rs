//! Shared handles to the store and providers.

use crate::memory::embeddings::Embedder;
use crate::SDKResult;
use quill_core::{CompletionRequest, TextGenerator, VectorStore};
use std::sync::Arc;

/// The three external collaborators every pipeline component talks to
#[derive(Clone)]
pub struct Backends {
    pub store: Arc<dyn VectorStore>,
    pub embedder: Arc<dyn Embedder>,
    pub generator: Arc<dyn TextGenerator>,
}

impl Backends {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            store,
            embedder,
            generator,
        }
    }

    /// Embed one text
    pub async fn embed(&self, text: &str) -> SDKResult<Vec<f32>> {
        self.embedder.encode_one(text).await
    }

    /// Run one completion call
    pub async fn complete(&self, request: CompletionRequest) -> SDKResult<String> {
        tracing::debug!(
            provider = self.generator.name(),
            prompt_chars = request.prompt.len(),
            "Calling text generator"
        );
        Ok(self.generator.complete(request).await?)
    }
}
