//! Chat message types.
//!
//! Chains in this workspace are text-first, but prompt values can also be
//! rendered as message lists for chat-style model collaborators.

use serde::{Deserialize, Serialize};

/// A single chat message with a role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    /// System instruction message.
    System {
        /// Message text.
        content: String,
    },
    /// Human/user message.
    Human {
        /// Message text.
        content: String,
    },
    /// Model response message.
    Ai {
        /// Message text.
        content: String,
    },
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    /// Create a human message.
    pub fn human(content: impl Into<String>) -> Self {
        Message::Human {
            content: content.into(),
        }
    }

    /// Create an AI message.
    pub fn ai(content: impl Into<String>) -> Self {
        Message::Ai {
            content: content.into(),
        }
    }

    /// The message text without its role.
    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Message::System { content } | Message::Human { content } | Message::Ai { content } => {
                content
            }
        }
    }

    /// Buffer-string rendering, `"Role: text"`.
    #[must_use]
    pub fn to_buffer_string(&self) -> String {
        match self {
            Message::System { content } => format!("System: {content}"),
            Message::Human { content } => format!("Human: {content}"),
            Message::Ai { content } => format!("AI: {content}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_accessor() {
        assert_eq!(Message::human("hi").content(), "hi");
        assert_eq!(Message::system("rules").content(), "rules");
    }

    #[test]
    fn test_buffer_string() {
        assert_eq!(Message::ai("4").to_buffer_string(), "AI: 4");
    }

    #[test]
    fn test_serde_round_trip() {
        let msg = Message::human("What is 2+2?");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"role\":\"human\""));
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }
}
