//! Template renderer.

use super::TemplateError;
use handlebars::{no_escape, Handlebars};
use serde::Serialize;

/// Creates a Handlebars registry for commit and pull request text.
///
/// HTML escaping is off since the output is markdown or plain text, and
/// strict mode turns a misspelt variable into an error.
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(no_escape);
    hbs.set_strict_mode(true);
    hbs
}

/// Values available to update templates.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateContext<'a> {
    pub repo: &'a str,
    pub filename: &'a str,
    pub branch: &'a str,
    pub key: &'a str,
    pub new_value: &'a str,
}

/// Renders commit messages and pull request text.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Creates a new template renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlebars: create_handlebars_registry(),
        }
    }

    /// Renders `template` against `context`.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is malformed or references an
    /// unknown variable.
    pub fn render(
        &self,
        template: &str,
        context: &TemplateContext<'_>,
    ) -> Result<String, TemplateError> {
        Ok(self.handlebars.render_template(template, context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> TemplateContext<'static> {
        TemplateContext {
            repo: "testorg/testrepo",
            filename: "environments/test.yaml",
            branch: "main",
            key: "test.image",
            new_value: "quay.io/testorg/image:v2",
        }
    }

    #[test]
    fn renders_variables() {
        let renderer = TemplateRenderer::new();
        let result = renderer
            .render("Set {{key}} in {{filename}} to {{new_value}}", &context())
            .unwrap();

        assert_eq!(
            result,
            "Set test.image in environments/test.yaml to quay.io/testorg/image:v2"
        );
    }

    #[test]
    fn does_not_escape_html() {
        let renderer = TemplateRenderer::new();
        let mut context = context();
        context.new_value = "<b>&</b>";

        assert_eq!(renderer.render("{{new_value}}", &context).unwrap(), "<b>&</b>");
    }

    #[test]
    fn rejects_unknown_variables() {
        let renderer = TemplateRenderer::new();
        let result = renderer.render("{{old_value}}", &context());

        assert!(matches!(result, Err(TemplateError::RenderError(_))));
    }

    #[test]
    fn plain_text_passes_through() {
        let renderer = TemplateRenderer::new();
        assert_eq!(
            renderer.render("just a test commit", &context()).unwrap(),
            "just a test commit"
        );
    }
}
