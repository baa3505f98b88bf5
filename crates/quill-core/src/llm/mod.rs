//! Text generation provider boundary.
//!
//! The pipeline only needs `prompt -> text`. Structured output is requested
//! in the prompt and recovered by the caller.

#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "client")]
pub use client::{ChatCompletionsClient, ClientConfig};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single completion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub temperature: f32,
    /// Provider default when `None`
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            temperature,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Generative text provider.
///
/// Errors reaching or authenticating with the provider are reported as
/// [`crate::Error::ProviderUnavailable`]. An empty reply is not an error.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String>;

    /// Provider name for logs
    fn name(&self) -> &str {
        "text-generator"
    }
}
