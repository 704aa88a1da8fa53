//! Configuration error types.

use crate::templates::TemplateError;
use thiserror::Error;

/// Errors that can occur while loading update definitions.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML content.
    #[error("Failed to parse '{path}': {source}")]
    TomlError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// Validation error in an update definition.
    #[error("Validation error in '{path}': {message}")]
    ValidationError { path: String, message: String },

    /// A commit message or pull request template failed to render.
    #[error("Failed to render templates in '{path}': {source}")]
    TemplateError {
        path: String,
        #[source]
        source: TemplateError,
    },

    /// Missing required file.
    #[error("Missing required file: {path}")]
    MissingFile { path: String },
}
