//! Prompt values for language model prompts.
//!
//! A prompt value is the opaque, formatter-produced representation of a
//! fully-rendered prompt. It is passed by reference to the model and to
//! prompt-aware output parsers.

use serde::{Deserialize, Serialize};

use crate::core::messages::Message;

/// Base trait for inputs to any language model.
///
/// `PromptValue` can be rendered both as plain text (for pure
/// text-completion models) and as a message list (for chat models).
pub trait PromptValue: Send + Sync {
    /// Return the prompt as a single string.
    fn to_string(&self) -> String;

    /// Return the prompt as a list of messages.
    fn to_messages(&self) -> Vec<Message>;
}

/// A simple text prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StringPromptValue {
    /// Prompt text.
    pub text: String,
}

impl StringPromptValue {
    /// Create a new string prompt value.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl PromptValue for StringPromptValue {
    fn to_string(&self) -> String {
        self.text.clone()
    }

    fn to_messages(&self) -> Vec<Message> {
        vec![Message::human(self.text.clone())]
    }
}

/// A prompt built from a sequence of chat messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatPromptValue {
    /// Ordered list of messages.
    pub messages: Vec<Message>,
}

impl ChatPromptValue {
    /// Create a new chat prompt value from messages.
    #[must_use]
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

impl PromptValue for ChatPromptValue {
    fn to_string(&self) -> String {
        self.messages
            .iter()
            .map(Message::to_buffer_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn to_messages(&self) -> Vec<Message> {
        self.messages.clone()
    }
}
