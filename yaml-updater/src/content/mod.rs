//! Content updaters applied to a fetched file before it is committed.

use crate::syaml::{self, PatchError};

/// Transforms the current bytes of a file into the bytes to commit.
pub trait ContentUpdater: Send + Sync {
    /// Returns the new file content.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError`] if the current content cannot be transformed.
    fn update(&self, current: &[u8]) -> Result<Vec<u8>, PatchError>;
}

impl<F> ContentUpdater for F
where
    F: Fn(&[u8]) -> Result<Vec<u8>, PatchError> + Send + Sync,
{
    fn update(&self, current: &[u8]) -> Result<Vec<u8>, PatchError> {
        self(current)
    }
}

/// Replaces the whole file with fixed content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceContents(pub Vec<u8>);

impl ContentUpdater for ReplaceContents {
    fn update(&self, _current: &[u8]) -> Result<Vec<u8>, PatchError> {
        Ok(self.0.clone())
    }
}

/// Sets a dotted key in a YAML document.
///
/// See [`syaml::set_bytes`] for the path syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YamlUpdate {
    pub key: String,
    pub value: String,
}

impl YamlUpdate {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl ContentUpdater for YamlUpdate {
    fn update(&self, current: &[u8]) -> Result<Vec<u8>, PatchError> {
        syaml::set_bytes(current, &self.key, self.value.as_str())
    }
}
