//! Parsers turning raw model text into structured output values.

use crate::core::error::{Error, Result};
use crate::core::language_models::Generation;
use crate::core::prompt_values::PromptValue;

/// Trait for parsing language model outputs into structured formats.
///
/// Chains hold parsers as trait objects with `Output` fixed to
/// `serde_json::Value` so parsed results drop straight into an output
/// bag; custom parsers may use any output type.
pub trait OutputParser: Send + Sync {
    /// The structured output type produced by this parser.
    type Output: Send + 'static;

    /// Parse a string into the structured output format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutputParsing`] if the text does not match the
    /// parser's expected shape.
    fn parse(&self, text: &str) -> Result<Self::Output>;

    /// Parse model text with access to the prompt that produced it.
    ///
    /// The default ignores the prompt and delegates to [`parse`]. Parsers
    /// that need few-shot context from the prompt override this.
    ///
    /// [`parse`]: OutputParser::parse
    fn parse_with_prompt(&self, text: &str, prompt: &dyn PromptValue) -> Result<Self::Output> {
        let _ = prompt;
        self.parse(text)
    }

    /// Parse a list of candidate generations, using the highest-ranked.
    fn parse_result(&self, generations: &[Generation]) -> Result<Self::Output> {
        match generations.first() {
            Some(generation) => self.parse(&generation.text),
            None => Err(Error::OutputParsing(
                "no generations provided to parse".to_string(),
            )),
        }
    }

    /// Instructions telling the model how to format its output.
    fn get_format_instructions(&self) -> String {
        String::new()
    }
}

/// Parser that returns the model text unchanged as a JSON string value.
///
/// The default parser for chains that want raw model output.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleOutputParser;

impl OutputParser for SimpleOutputParser {
    type Output = serde_json::Value;

    fn parse(&self, text: &str) -> Result<Self::Output> {
        Ok(serde_json::Value::String(text.to_string()))
    }
}
