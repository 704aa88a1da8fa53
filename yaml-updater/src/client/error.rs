//! Hosting client error types.

use thiserror::Error;

/// Errors reported by a [`GitClient`](super::GitClient) implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The repository identifier is not in `owner/name` form.
    #[error("invalid repository '{repo}', expected owner/name")]
    InvalidRepository { repo: String },

    /// The requested file, branch or repository does not exist.
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// The hosting provider rejected a write because of conflicting state,
    /// e.g. a stale file SHA or an existing branch name.
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// The token was missing, expired or lacks permission.
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// Any other API error.
    #[error("API error: {message}")]
    Api { message: String },

    /// Transport-level failure.
    #[error("network error: {message}")]
    Network { message: String },
}
