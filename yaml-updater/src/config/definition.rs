//! Update definitions as written in TOML.

use crate::config::ConfigError;
use crate::syaml::split_path;
use crate::templates::{
    TemplateContext, TemplateRenderer, DEFAULT_COMMIT_MESSAGE, DEFAULT_PR_BODY, DEFAULT_PR_TITLE,
};
use crate::updater::{Input, PullRequestInput};
use bstr::ByteSlice;
use serde::Deserialize;

/// One `[[update]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct UpdateDefinition {
    /// Repository in `owner/name` form.
    pub repo: String,

    /// Path of the YAML file relative to the repository root.
    pub filename: String,

    /// Source branch (defaults to "main").
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Dotted key path to update.
    pub key: String,

    /// Value to set.
    pub new_value: String,

    /// Prefix of a branch to generate; commit directly to `branch` when
    /// absent.
    #[serde(default)]
    pub branch_generate_name: Option<String>,

    /// Handlebars template for the commit message.
    #[serde(default = "default_commit_message")]
    pub commit_message: String,

    /// Pull request text, used only with `branch-generate-name`.
    #[serde(default)]
    pub pull_request: PullRequestDefinition,
}

/// The `[update.pull-request]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PullRequestDefinition {
    /// Handlebars template for the title.
    #[serde(default = "default_pr_title")]
    pub title: String,

    /// Handlebars template for the body.
    #[serde(default = "default_pr_body")]
    pub body: String,
}

impl Default for PullRequestDefinition {
    fn default() -> Self {
        Self {
            title: default_pr_title(),
            body: default_pr_body(),
        }
    }
}

pub(crate) fn default_branch() -> String {
    "main".to_string()
}

fn default_commit_message() -> String {
    DEFAULT_COMMIT_MESSAGE.to_string()
}

fn default_pr_title() -> String {
    DEFAULT_PR_TITLE.to_string()
}

fn default_pr_body() -> String {
    DEFAULT_PR_BODY.to_string()
}

impl UpdateDefinition {
    /// Creates a definition with default branch, messages and no generated
    /// branch.
    #[must_use]
    pub fn new(
        repo: impl Into<String>,
        filename: impl Into<String>,
        key: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        Self {
            repo: repo.into(),
            filename: filename.into(),
            branch: default_branch(),
            key: key.into(),
            new_value: new_value.into(),
            branch_generate_name: None,
            commit_message: default_commit_message(),
            pull_request: PullRequestDefinition::default(),
        }
    }

    /// Checks the definition for values that can never succeed.
    ///
    /// `origin` names where the definition came from and is used in error
    /// messages.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] describing the first problem.
    pub fn validate(&self, origin: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::ValidationError {
            path: origin.to_string(),
            message,
        };

        match self.repo.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {}
            _ => {
                return Err(invalid(format!(
                    "repo must be in owner/name form, got '{}'",
                    self.repo
                )))
            }
        }

        if self.filename.trim().is_empty() {
            return Err(invalid("filename must not be empty".to_string()));
        }
        if self.filename.starts_with('/') {
            return Err(invalid(format!(
                "filename must be relative to the repository root, got '{}'",
                self.filename
            )));
        }

        split_path(&self.key).map_err(|e| invalid(e.to_string()))?;

        validate_branch_name(&self.branch).map_err(|e| invalid(format!("branch: {e}")))?;

        if let Some(prefix) = &self.branch_generate_name {
            if prefix.is_empty() {
                return Err(invalid(
                    "branch-generate-name must not be empty; omit it to commit directly"
                        .to_string(),
                ));
            }
            // Generated names append a suffix, so validate a representative one.
            validate_branch_name(&format!("{prefix}x"))
                .map_err(|e| invalid(format!("branch-generate-name: {e}")))?;
        }

        Ok(())
    }

    /// Renders the templates and produces the updater input.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TemplateError`] if a template fails to render.
    pub fn to_input(&self, renderer: &TemplateRenderer, origin: &str) -> Result<Input, ConfigError> {
        let context = TemplateContext {
            repo: &self.repo,
            filename: &self.filename,
            branch: &self.branch,
            key: &self.key,
            new_value: &self.new_value,
        };
        let render = |template: &str| {
            renderer
                .render(template, &context)
                .map_err(|source| ConfigError::TemplateError {
                    path: origin.to_string(),
                    source,
                })
        };

        Ok(Input {
            repo: self.repo.clone(),
            filename: self.filename.clone(),
            key: self.key.clone(),
            new_value: self.new_value.clone(),
            branch: self.branch.clone(),
            branch_generate_name: self.branch_generate_name.clone().unwrap_or_default(),
            commit_message: render(&self.commit_message)?,
            pull_request: PullRequestInput {
                title: render(&self.pull_request.title)?,
                body: render(&self.pull_request.body)?,
            },
        })
    }
}

fn validate_branch_name(name: &str) -> Result<(), String> {
    gix_validate::reference::name_partial(name.as_bytes().as_bstr())
        .map(|_| ())
        .map_err(|e| format!("'{name}' is not a valid branch name ({e})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition() -> UpdateDefinition {
        UpdateDefinition::new(
            "testorg/testrepo",
            "environments/test.yaml",
            "test.image",
            "test/my-test-image",
        )
    }

    fn assert_invalid(definition: &UpdateDefinition) {
        assert!(
            matches!(
                definition.validate("test"),
                Err(ConfigError::ValidationError { .. })
            ),
            "{definition:?} should be rejected"
        );
    }

    #[test]
    fn accepts_valid_definition() {
        let mut definition = definition();
        definition.branch_generate_name = Some("update-image-".to_string());
        assert!(definition.validate("test").is_ok());
    }

    #[test]
    fn rejects_bad_repo() {
        let mut definition = definition();
        definition.repo = "testrepo".to_string();
        assert_invalid(&definition);
    }

    #[test]
    fn rejects_absolute_filename() {
        let mut definition = definition();
        definition.filename = "/etc/test.yaml".to_string();
        assert_invalid(&definition);
    }

    #[test]
    fn rejects_bad_key() {
        let mut definition = definition();
        definition.key = "test..image".to_string();
        assert_invalid(&definition);
    }

    #[test]
    fn rejects_bad_branch_names() {
        let mut definition = definition();
        definition.branch = "has space".to_string();
        assert_invalid(&definition);

        let mut definition = self::definition();
        definition.branch_generate_name = Some("bad..prefix-".to_string());
        assert_invalid(&definition);

        let mut definition = self::definition();
        definition.branch_generate_name = Some(String::new());
        assert_invalid(&definition);
    }

    #[test]
    fn renders_input_with_defaults() {
        let input = definition()
            .to_input(&TemplateRenderer::new(), "test")
            .unwrap();

        assert_eq!(input.branch, "main");
        assert_eq!(input.branch_generate_name, "");
        assert_eq!(
            input.commit_message,
            "Update test.image in environments/test.yaml to test/my-test-image"
        );
        assert_eq!(
            input.pull_request.title,
            "Update test.image to test/my-test-image"
        );
    }

    #[test]
    fn reports_template_errors() {
        let mut definition = definition();
        definition.commit_message = "{{unknown}}".to_string();

        let result = definition.to_input(&TemplateRenderer::new(), "test");
        assert!(matches!(result, Err(ConfigError::TemplateError { .. })));
    }
}
