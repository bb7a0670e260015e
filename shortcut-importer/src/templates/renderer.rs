//! Template renderer.

use crate::types::SourceIssue;
use chrono::NaiveDate;
use handlebars::{no_escape, Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use serde_json::{json, Value};

/// Creates a configured Handlebars registry with custom helpers.
///
/// The registry is configured with:
/// - No HTML escaping (descriptions are markdown)
/// - Strict mode (catches misspelled variables in user formats)
/// - `eq` helper for equality comparisons
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(no_escape);
    hbs.set_strict_mode(true);
    hbs.register_helper("eq", Box::new(eq_helper));
    hbs
}

/// Helper function for equality comparison in templates.
///
/// Usage: `{{#if (eq state "closed")}}...{{/if}}`
fn eq_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let param1 = h.param(0).and_then(|v| v.value().as_str());
    let param2 = h.param(1).and_then(|v| v.value().as_str());

    let result = match (param1, param2) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };

    out.write(if result { "true" } else { "" })?;
    Ok(())
}

/// Renders the user-configurable formats.
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

    /// Renders the provenance header for a migrated issue.
    ///
    /// Available variables: `org`, `repo`, `number`, `url`, `title`, `state`, `author`.
    ///
    /// # Errors
    ///
    /// Returns an error if the format is invalid or names an unknown variable.
    pub fn render_provenance(
        &self,
        format: &str,
        issue: &SourceIssue,
    ) -> Result<String, super::TemplateError> {
        let data = json!({
            "org": issue.org,
            "repo": issue.repo,
            "number": issue.key.number,
            "url": issue.url,
            "title": issue.title,
            "state": issue.state.as_str(),
            "author": issue.author,
        });

        self.render_template(format, &data)
    }

    /// Renders an iteration name.
    ///
    /// Available variables: `start`, `end` (ISO dates) and `index` (1-based).
    ///
    /// # Errors
    ///
    /// Returns an error if the format is invalid or names an unknown variable.
    pub fn render_iteration_name(
        &self,
        format: &str,
        start: NaiveDate,
        end: NaiveDate,
        index: u32,
    ) -> Result<String, super::TemplateError> {
        let data = json!({
            "start": start.format("%Y-%m-%d").to_string(),
            "end": end.format("%Y-%m-%d").to_string(),
            "index": index,
        });

        self.render_template(format, &data)
    }

    fn render_template(&self, template: &str, data: &Value) -> Result<String, super::TemplateError> {
        Ok(self.handlebars.render_template(template, data)?)
    }
}
