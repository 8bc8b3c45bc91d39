//! Error types for `Chainflow` operations.
//!
//! Every step of a chain call surfaces its own error variant so callers can
//! tell where the pipeline broke: prompt formatting, the model invocation,
//! output parsing, input validation, or sandboxed expression evaluation.
//! Nothing in the core retries; retry policy belongs to the caller or the
//! model collaborator.
//!
//! | Variant | Retryable | Recovery |
//! |---------|-----------|----------|
//! | `ModelInvocation` | Provider-dependent | Check provider status, let the model collaborator retry |
//! | `Timeout` | Yes | Increase timeout or retry |
//! | `Cancelled` | No | Caller aborted the call |
//! | `PromptFormatting` | No | Supply the missing template variables |
//! | `InvalidInputValues` | No | Fix the input bag |
//! | `OutputParsing` | No | Align the parser with the model output format |
//! | `ExpressionEvaluation` | No | The model produced a bad expression |

use thiserror::Error;

/// Result type alias for `Chainflow` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type covering every failure mode of a chain call.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// Prompt template rendering failed, usually because a required
    /// template variable was absent from the input bag.
    #[error("Prompt formatting failed: {0}")]
    PromptFormatting(String),

    /// The language model call failed: transport, quota, or a
    /// provider-side error. The chain core never retries these.
    #[error("Model invocation failed: {0}")]
    ModelInvocation(String),

    /// The caller cancelled the in-flight call. Model collaborators must
    /// surface this instead of returning a partial result.
    #[error("Call cancelled: {0}")]
    Cancelled(String),

    /// The model call exceeded its deadline.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// The model output did not match the parser's expected shape.
    #[error("Output parsing failed: {0}")]
    OutputParsing(String),

    /// A required chain input key is missing or has the wrong type.
    #[error("Invalid input values: {0}")]
    InvalidInputValues(String),

    /// A chain returned a bag missing one of its declared output keys.
    #[error("Invalid output values: {0}")]
    InvalidOutputValues(String),

    /// Model text contained neither a fenced code block nor an
    /// `Answer:` marker. Carries the offending text for diagnostics.
    #[error("Unrecognized model output format: {0}")]
    UnrecognizedOutputFormat(String),

    /// The sandbox rejected or failed to evaluate an extracted
    /// expression. Carries the original expression text.
    #[error("Expression evaluation failed for {expression:?}: {message}")]
    ExpressionEvaluation {
        /// The expression the sandbox was asked to evaluate.
        expression: String,
        /// The evaluator's own diagnostic.
        message: String,
    },

    /// A callback handler opted into `raise_error` and failed.
    #[error("Callback error: {0}")]
    Callback(String),

    /// A memory collaborator failed to load or persist state.
    #[error("Memory error: {0}")]
    Memory(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Feature not supported by this collaborator.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Generic error for anything else.
    #[error("Error: {0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from any displayable value.
    pub fn other(msg: impl std::fmt::Display) -> Self {
        Error::Other(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_offending_text() {
        let err = Error::UnrecognizedOutputFormat("The answer is 4".to_string());
        assert!(err.to_string().contains("The answer is 4"));
    }

    #[test]
    fn test_expression_evaluation_carries_expression() {
        let err = Error::ExpressionEvaluation {
            expression: "1 +".to_string(),
            message: "unexpected EOF".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("1 +"));
        assert!(msg.contains("unexpected EOF"));
    }

    #[test]
    fn test_from_serde_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = parse_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
