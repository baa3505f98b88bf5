//! Per-request context.
//!
//! Every pipeline operation takes a [`RequestContext`]. It names the user
//! whose partition is being read or written and carries a request id into
//! log spans. It cannot be built with a blank user id, so user-owned reads
//! always carry an owner filter.

use crate::{SDKError, SDKResult};
use quill_core::db::Where;
use tracing::Span;

/// Identity and correlation id for one call chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    user_id: String,
    request_id: String,
}

impl RequestContext {
    /// Create a context for `user_id` with a fresh request id
    pub fn new(user_id: impl Into<String>) -> SDKResult<Self> {
        let user_id = user_id.into().trim().to_string();
        if user_id.is_empty() {
            return Err(SDKError::validation("user_id", "must not be empty"));
        }
        let request_id = uuid::Uuid::new_v4().simple().to_string()[..12].to_string();
        Ok(Self { user_id, request_id })
    }

    /// Use a caller-supplied request id
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Span for a pipeline operation
    pub fn span(&self, operation: &'static str) -> Span {
        tracing::info_span!(
            "quill",
            op = operation,
            user_id = %self.user_id,
            request_id = %self.request_id
        )
    }

    /// Metadata filter restricting a read to this user's documents
    pub(crate) fn owner_filter(&self) -> Where {
        Where::eq("user_id", self.user_id.as_str())
    }
}
