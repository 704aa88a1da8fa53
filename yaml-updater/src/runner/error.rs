//! Runner error types.

/// Errors that prevent a run from starting.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration and update definition errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// The API base URL is not a valid URL.
    #[error("Invalid API URL '{url}': {source}")]
    InvalidApiUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// GitHub API client initialization errors.
    #[error(transparent)]
    Client(#[from] crate::client::ClientError),
}
