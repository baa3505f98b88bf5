//! Opens the SDK for a command.
//!
//! Commands that never call the text generator still need one to build the
//! SDK; without an API key a stand-in is used that fails on first use.

use anyhow::{Context, Result};
use async_trait::async_trait;
use quill_core::llm::ChatCompletionsClient;
use quill_core::{CompletionRequest, Error, TextGenerator};
use quill_sdk::{RequestContext, SDK};
use std::sync::Arc;

use crate::config::Config;
use crate::error::QuillError;

/// Text generator used when no API key is configured
struct Unconfigured;

#[async_trait]
impl TextGenerator for Unconfigured {
    async fn complete(&self, _request: CompletionRequest) -> quill_core::Result<String> {
        Err(Error::provider(
            "chat-completions",
            "API key not configured (set QUILL_API_KEY or GROQ_API_KEY)",
        ))
    }

    fn name(&self) -> &str {
        "unconfigured"
    }
}

/// An opened SDK plus the request context of the invoking user
pub struct Engine {
    pub sdk: SDK,
    pub ctx: RequestContext,
}

fn text_generator(config: &Config) -> Result<Arc<dyn TextGenerator>> {
    if config.provider.api_key.as_deref().is_none_or(str::is_empty) {
        tracing::debug!("No API key configured, generation disabled");
        return Ok(Arc::new(Unconfigured));
    }
    let client = ChatCompletionsClient::new(config.provider.clone())
        .context("Failed to create text generation client")?;
    Ok(Arc::new(client))
}

/// Resolve the user: `--user` first, then the config
pub fn resolve_user(config: &Config, user: Option<&str>) -> Result<String> {
    let user = user.unwrap_or(&config.user.id).trim();
    if user.is_empty() {
        return Err(QuillError::NoUser.into());
    }
    Ok(user.to_string())
}

pub fn open(config: &Config, user: Option<&str>) -> Result<Engine> {
    let user = resolve_user(config, user)?;
    let sdk_config = config.sdk_config();
    let path = sdk_config.database_path.display().to_string();
    let sdk = SDK::new(sdk_config, text_generator(config)?)
        .with_context(|| format!("Failed to open database at {}", path))?;
    let ctx = RequestContext::new(user)?;
    Ok(Engine { sdk, ctx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_user() {
        let mut config = Config::default();
        assert_eq!(resolve_user(&config, None).unwrap(), "default");
        assert_eq!(resolve_user(&config, Some(" alice ")).unwrap(), "alice");

        config.user.id = "  ".to_string();
        let err = resolve_user(&config, None).unwrap_err();
        assert!(err.downcast_ref::<QuillError>().is_some());
    }

    #[tokio::test]
    async fn test_unconfigured_generator_fails_on_use() {
        let generator = text_generator(&Config::default()).unwrap();
        assert_eq!(generator.name(), "unconfigured");
        let err = generator
            .complete(CompletionRequest::new("hi", 0.7))
            .await
            .unwrap_err();
        assert!(err.is_provider_unavailable());
    }

    #[test]
    fn test_open_in_temp_dir() {
        let temp = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.paths.database = Some(temp.path().join("quill.db"));
        config.engine.embeddings.provider = quill_sdk::EmbeddingProvider::Hashing;

        let engine = open(&config, Some("alice")).unwrap();
        assert_eq!(engine.ctx.user_id(), "alice");
        assert!(temp.path().join("quill.db").exists());
    }
}
