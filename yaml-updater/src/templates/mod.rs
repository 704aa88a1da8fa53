//! Template rendering using Handlebars.
//!
//! Commit messages and pull request titles and bodies in update definitions
//! are Handlebars templates over the fields of the update.

mod error;
mod renderer;

pub use error::TemplateError;
pub use renderer::{create_handlebars_registry, TemplateContext, TemplateRenderer};

/// Commit message used when an update definition does not set one.
pub const DEFAULT_COMMIT_MESSAGE: &str = "Update {{key}} in {{filename}} to {{new_value}}";

/// Pull request title used when an update definition does not set one.
pub const DEFAULT_PR_TITLE: &str = "Update {{key}} to {{new_value}}";

/// Pull request body used when an update definition does not set one.
pub const DEFAULT_PR_BODY: &str =
    "Updates `{{key}}` in `{{filename}}` to `{{new_value}}`.\n\nBase branch: `{{branch}}`";
