//! Test doubles for the external providers.
//!
//! [`ScriptedGenerator`] replays queued replies in order and records every
//! request it receives, so pipeline tests can assert on prompts and drive
//! fallback and failure paths without network access.

use crate::backends::Backends;
use crate::memory::embeddings::HashingEmbedder;
use crate::SDKResult;
use async_trait::async_trait;
use quill_core::{CompletionRequest, Database, Error, TextGenerator};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail(String),
}

/// A text generator that answers from a queue
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn push_text(&self, text: impl Into<String>) -> &Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(Reply::Text(text.into()));
        }
        self
    }

    /// Queue a provider failure
    pub fn push_failure(&self, message: impl Into<String>) -> &Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(Reply::Fail(message.into()));
        }
        self
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    /// Replies in queue order. An empty queue answers with an empty string.
    async fn complete(&self, request: CompletionRequest) -> quill_core::Result<String> {
        self.requests
            .lock()
            .map_err(|_| Error::LockPoisoned)?
            .push(request);
        let next = self
            .replies
            .lock()
            .map_err(|_| Error::LockPoisoned)?
            .pop_front();
        match next {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(message)) => Err(Error::provider("scripted", message)),
            None => Ok(String::new()),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// In-memory store, 64-dimension hashing embedder and the given generator
pub fn in_memory_backends(generator: Arc<ScriptedGenerator>) -> SDKResult<Backends> {
    Ok(Backends::new(
        Arc::new(Database::open_in_memory()?),
        Arc::new(HashingEmbedder::new(64)),
        generator,
    ))
}
