//! Prompt templates for language models.
//!
//! Templates substitute `{variable}` placeholders from a chain input bag
//! and produce a [`crate::core::prompt_values::PromptValue`] ready to hand
//! to a model.
//!
//! # Example
//!
//! ```rust
//! use chainflow::core::prompts::{BasePromptTemplate, PromptTemplate};
//! use chainflow::core::ChainValues;
//!
//! let template = PromptTemplate::from_template("Tell me a joke about {topic}").unwrap();
//!
//! let mut values = ChainValues::new();
//! values.insert("topic".to_string(), serde_json::json!("rust"));
//!
//! let result = template.format(&values).unwrap();
//! assert_eq!(result, "Tell me a joke about rust");
//! ```

pub mod base;
pub mod string;

pub use base::{extract_fstring_variables, format_fstring, BasePromptTemplate};
pub use string::PromptTemplate;
