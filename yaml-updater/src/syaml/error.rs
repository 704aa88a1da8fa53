//! YAML patching error types.

use thiserror::Error;

/// Errors that can occur while patching a YAML document.
#[derive(Debug, Error)]
pub enum PatchError {
    /// The document could not be parsed.
    #[error("failed to parse YAML: {0}")]
    Parse(#[source] serde_yaml::Error),

    /// The patched document could not be serialized.
    #[error("failed to serialize YAML: {0}")]
    Serialize(#[source] serde_yaml::Error),

    /// The key path is empty or contains an empty segment.
    #[error("invalid key path '{path}'")]
    InvalidPath { path: String },

    /// A segment addressed a sequence but is not a usable index.
    #[error("invalid index '{segment}' in key path '{path}'")]
    InvalidIndex { path: String, segment: String },

    /// A segment tried to descend into a scalar value.
    #[error("cannot set '{path}': '{segment}' is not a mapping or sequence")]
    NotAContainer { path: String, segment: String },
}
