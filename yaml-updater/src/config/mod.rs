//! Loading update definitions from TOML files.
//!
//! A definitions file holds any number of `[[update]]` tables:
//!
//! ```toml
//! [[update]]
//! repo = "my-org/deployments"
//! filename = "environments/test/service-a.yaml"
//! key = "image.tag"
//! new-value = "v1.2.3"
//! branch-generate-name = "bump-service-a-"
//!
//! [update.pull-request]
//! title = "Bump service-a to {{new_value}}"
//! ```

mod definition;
mod error;

pub use definition::{PullRequestDefinition, UpdateDefinition};
pub use error::ConfigError;

use crate::templates::TemplateRenderer;
use crate::updater::Input;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdatesFile {
    #[serde(default, rename = "update")]
    updates: Vec<UpdateDefinition>,
}

/// Parses and validates update definitions from TOML text.
///
/// `origin` names the source in error messages.
///
/// # Errors
///
/// Returns [`ConfigError`] if the text is not valid TOML or any definition
/// fails validation.
pub fn parse_updates(content: &str, origin: &str) -> Result<Vec<UpdateDefinition>, ConfigError> {
    let file: UpdatesFile = toml::from_str(content).map_err(|e| ConfigError::TomlError {
        path: origin.to_string(),
        source: e,
    })?;

    for (index, definition) in file.updates.iter().enumerate() {
        definition.validate(&format!("{origin} (update #{})", index + 1))?;
    }

    Ok(file.updates)
}

/// Loads update definitions from a file.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file is missing, unreadable or invalid.
pub fn load_updates(path: &Path) -> Result<Vec<UpdateDefinition>, ConfigError> {
    info!(path = %path.display(), "Loading update definitions");

    if !path.exists() {
        return Err(ConfigError::MissingFile {
            path: path.display().to_string(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.display().to_string(),
        source: e,
    })?;

    let updates = parse_updates(&content, &path.display().to_string())?;
    info!(count = updates.len(), "Loaded update definitions");
    Ok(updates)
}

/// Loads update definitions and renders them into updater inputs.
///
/// # Errors
///
/// Returns [`ConfigError`] if loading or template rendering fails.
pub fn load_inputs(path: &Path, renderer: &TemplateRenderer) -> Result<Vec<Input>, ConfigError> {
    let origin = path.display().to_string();
    load_updates(path)?
        .iter()
        .map(|definition| {
            debug!(repo = %definition.repo, filename = %definition.filename, "Rendering update");
            definition.to_input(renderer, &origin)
        })
        .collect()
}
