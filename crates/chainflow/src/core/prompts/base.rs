//! Base prompt template trait and f-string helpers.

use std::collections::HashMap;

use crate::core::error::{Error, Result};
use crate::core::prompt_values::PromptValue;
use crate::core::ChainValues;

/// Base trait for all prompt templates.
///
/// A prompt template takes a chain input bag and produces a rendered
/// prompt. Formatting is pure: validation failures are reported as
/// [`Error::PromptFormatting`], never a panic.
pub trait BasePromptTemplate: Send + Sync {
    /// The input variables required by this template.
    fn input_variables(&self) -> &[String];

    /// Pre-filled values that do not need to appear in the input bag.
    fn partial_variables(&self) -> &HashMap<String, String>;

    /// Format the template into a plain string.
    fn format(&self, values: &ChainValues) -> Result<String>;

    /// Format the template into a [`PromptValue`] for a model call.
    fn format_prompt(&self, values: &ChainValues) -> Result<Box<dyn PromptValue>>;

    /// Validate that every required variable is present in the bag.
    fn validate_inputs(&self, values: &ChainValues) -> Result<()> {
        let partials = self.partial_variables();
        let missing: Vec<_> = self
            .input_variables()
            .iter()
            .filter(|k| !values.contains_key(*k) && !partials.contains_key(*k))
            .cloned()
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::PromptFormatting(format!(
                "missing required input variables: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Render a bag value for substitution into a template.
///
/// Strings substitute verbatim; other scalars use their JSON rendering so
/// numbers and booleans read naturally inside a prompt.
fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Extract variables from an f-string template.
///
/// Finds all `{variable}` patterns, deduplicated, in order of first
/// appearance.
#[must_use]
pub fn extract_fstring_variables(template: &str) -> Vec<String> {
    static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    let re = RE.get_or_init(|| {
        #[allow(clippy::expect_used)]
        let re = regex::Regex::new(r"\{([^{}]+)\}").expect("static fstring variable pattern");
        re
    });
    let mut variables = Vec::new();

    for cap in re.captures_iter(template) {
        if let Some(var) = cap.get(1) {
            let name = var.as_str();
            if !name.is_empty() && !variables.contains(&name.to_string()) {
                variables.push(name.to_string());
            }
        }
    }

    variables
}

/// Format an f-string template with bag values.
///
/// Placeholders without a matching value are left in place; required
/// variables are checked separately by
/// [`BasePromptTemplate::validate_inputs`].
pub fn format_fstring(template: &str, values: &ChainValues) -> Result<String> {
    let mut result = String::with_capacity(template.len());
    let mut remaining = template;

    while let Some(start) = remaining.find('{') {
        result.push_str(&remaining[..start]);
        remaining = &remaining[start..];

        if let Some(end) = remaining.find('}') {
            let key = &remaining[1..end];
            if key.contains('{') {
                // Unmatched opening brace, treat it as a literal and
                // rescan from the next character.
                result.push('{');
                remaining = &remaining[1..];
                continue;
            }
            if let Some(value) = values.get(key) {
                result.push_str(&render_value(value));
            } else {
                result.push_str(&remaining[..=end]);
            }
            remaining = &remaining[end + 1..];
        } else {
            // No closing brace, treat as literal.
            result.push('{');
            remaining = &remaining[1..];
        }
    }

    result.push_str(remaining);

    Ok(result)
}
