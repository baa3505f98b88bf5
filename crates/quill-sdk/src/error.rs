//! SDK Error Types
//!
//! Defines error types for the Quill SDK.

use thiserror::Error;

/// SDK Result type alias
pub type SDKResult<T> = Result<T, SDKError>;

/// SDK errors
#[derive(Debug, Error)]
pub enum SDKError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigValidationError),

    /// Store, provider or validation error from quill-core
    #[error(transparent)]
    Core(#[from] quill_core::Error),

    /// Embedding provider error
    #[error("embedding error: {message}")]
    Embedding { message: String },

    /// Entry not found
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl SDKError {
    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Create a validation error for a named input field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Core(quill_core::Error::validation(field, message))
    }

    /// Check if this error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error came from an unreachable provider
    pub fn is_provider_unavailable(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_provider_unavailable())
    }

    /// Name of the offending field for validation errors
    pub fn invalid_field(&self) -> Option<&str> {
        match self {
            Self::Core(e) => e.invalid_field(),
            _ => None,
        }
    }
}
