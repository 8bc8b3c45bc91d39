//! Simple f-string prompt template.

use std::collections::HashMap;

use crate::core::error::Result;
use crate::core::prompt_values::{PromptValue, StringPromptValue};
use crate::core::prompts::base::{extract_fstring_variables, format_fstring, BasePromptTemplate};
use crate::core::ChainValues;

/// A string template with `{variable}` placeholders.
///
/// # Example
///
/// ```rust
/// use chainflow::core::prompts::{BasePromptTemplate, PromptTemplate};
///
/// let template = PromptTemplate::from_template("What is {a} times {b}?").unwrap();
/// assert_eq!(template.input_variables(), ["a", "b"]);
/// ```
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The raw template string.
    pub template: String,
    /// Variables that must be supplied at format time.
    pub input_variables: Vec<String>,
    /// Pre-filled values that satisfy template variables ahead of time.
    pub partial_variables: HashMap<String, String>,
}

impl PromptTemplate {
    /// Create a template with an explicit variable list.
    pub fn new(template: impl Into<String>, input_variables: Vec<String>) -> Self {
        Self {
            template: template.into(),
            input_variables,
            partial_variables: HashMap::new(),
        }
    }

    /// Create a template, inferring its variables from `{}` placeholders.
    ///
    /// # Errors
    ///
    /// Currently infallible; kept fallible to match the other
    /// constructors chains call through trait objects.
    pub fn from_template(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        let input_variables = extract_fstring_variables(&template);
        Ok(Self {
            template,
            input_variables,
            partial_variables: HashMap::new(),
        })
    }

    /// Pre-fill a variable; it no longer needs to appear in the bag.
    #[must_use]
    pub fn with_partial(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.input_variables.retain(|v| *v != key);
        self.partial_variables.insert(key, value.into());
        self
    }

    fn merged_values(&self, values: &ChainValues) -> ChainValues {
        let mut merged =
            ChainValues::with_capacity(self.partial_variables.len() + values.len());
        for (k, v) in &self.partial_variables {
            merged.insert(k.clone(), serde_json::Value::String(v.clone()));
        }
        for (k, v) in values {
            merged.insert(k.clone(), v.clone());
        }
        merged
    }
}

impl BasePromptTemplate for PromptTemplate {
    fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    fn partial_variables(&self) -> &HashMap<String, String> {
        &self.partial_variables
    }

    fn format(&self, values: &ChainValues) -> Result<String> {
        self.validate_inputs(values)?;
        format_fstring(&self.template, &self.merged_values(values))
    }

    fn format_prompt(&self, values: &ChainValues) -> Result<Box<dyn PromptValue>> {
        Ok(Box::new(StringPromptValue::new(self.format(values)?)))
    }
}
