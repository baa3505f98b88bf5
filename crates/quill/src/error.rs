//! Error types for quill.

use thiserror::Error;

/// Errors raised by the CLI itself, before the SDK is involved.
#[derive(Error, Debug)]
pub enum QuillError {
    #[error("No user selected. Pass --user, set QUILL_USER_ID or set [user].id in the config file")]
    NoUser,

    #[error("Invalid input file {path}: {message}")]
    InvalidInput { path: String, message: String },

    #[error("Nothing to update: pass at least one of --likes, --comments, --shares, --views")]
    NoEngagement,
}

impl QuillError {
    pub fn invalid_input(path: &std::path::Path, message: impl ToString) -> Self {
        QuillError::InvalidInput {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }
}
