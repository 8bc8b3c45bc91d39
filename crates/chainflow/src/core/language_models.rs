//! Language model abstraction: generations, call options, and the
//! [`LanguageModel`] trait chains invoke.
//!
//! The model itself is an external collaborator. Chains hand it rendered
//! prompt values plus a [`CallOptions`] bag and consume the first
//! generation of the first prompt from the returned [`LLMResult`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::callbacks::CallbackManager;
use crate::core::error::Result;
use crate::core::prompt_values::PromptValue;

/// Callback invoked once per streamed generation chunk.
///
/// Chunk ordering is strict within a single call; ordering across
/// concurrent calls is unspecified.
pub type StreamingFunc = Arc<dyn Fn(&str) + Send + Sync>;

/// A single text generation output from a language model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Generation {
    /// The generated text output.
    pub text: String,

    /// Additional generation information (scores, token counts, finish
    /// reason, etc.).
    pub generation_info: Option<HashMap<String, serde_json::Value>>,
}

impl Generation {
    /// Create a new generation from text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            generation_info: None,
        }
    }

    /// Create a new generation with generation info.
    pub fn with_info(
        text: impl Into<String>,
        generation_info: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            text: text.into(),
            generation_info: Some(generation_info),
        }
    }
}

/// Result from a language model call.
///
/// The outer vector is indexed by input prompt, the inner vector by
/// candidate rank: `generations[prompt_idx][candidate_idx]`. Chains
/// consume `generations[0][0]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMResult {
    /// Generated outputs per prompt, ranked best-first.
    pub generations: Vec<Vec<Generation>>,

    /// Provider-specific output (usage stats, model version, etc.).
    pub llm_output: Option<HashMap<String, serde_json::Value>>,
}

impl LLMResult {
    /// Create a result with a single generation for a single prompt.
    #[must_use]
    pub fn new(generation: Generation) -> Self {
        Self {
            generations: vec![vec![generation]],
            llm_output: None,
        }
    }

    /// Create a result with multiple candidates for a single prompt.
    #[must_use]
    pub fn with_generations(generations: Vec<Generation>) -> Self {
        Self {
            generations: vec![generations],
            llm_output: None,
        }
    }

    /// Create a result covering multiple prompts.
    #[must_use]
    pub fn with_prompts(generations: Vec<Vec<Generation>>) -> Self {
        Self {
            generations,
            llm_output: None,
        }
    }

    /// The highest-ranked generation of the first prompt, if any.
    #[must_use]
    pub fn first_generation(&self) -> Option<&Generation> {
        self.generations.first().and_then(|g| g.first())
    }
}

/// Recognized model call options.
///
/// Options are assembled by the caller (usually from a sequence of pure
/// option mutators, see the chains crate) and passed through to the model
/// untouched. Unset fields mean "provider default".
#[derive(Clone, Default)]
pub struct CallOptions {
    /// Override the model/deployment name.
    pub model: Option<String>,
    /// Sampling temperature.
    pub temperature: Option<f64>,
    /// Maximum number of tokens to generate.
    pub max_tokens: Option<usize>,
    /// Nucleus sampling probability mass.
    pub top_p: Option<f64>,
    /// Sequences that halt generation.
    pub stop_words: Option<Vec<String>>,
    /// Deterministic sampling seed, where the provider supports it.
    pub seed: Option<i64>,
    /// Per-chunk streaming callback.
    pub streaming_func: Option<StreamingFunc>,
}

impl fmt::Debug for CallOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallOptions")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("top_p", &self.top_p)
            .field("stop_words", &self.stop_words)
            .field("seed", &self.seed)
            .field("streaming_func", &self.streaming_func.is_some())
            .finish()
    }
}

/// Trait for language models consumed by chains.
///
/// Implementations own their transport, retry policy, and rate limiting.
/// They must honor caller cancellation by aborting the in-flight request
/// and returning [`crate::core::error::Error::Cancelled`], and should
/// invoke `options.streaming_func` once per emitted chunk, in order.
///
/// # Example Implementation
///
/// ```rust,ignore
/// struct MyModel;
///
/// #[async_trait]
/// impl LanguageModel for MyModel {
///     async fn generate_prompt(
///         &self,
///         prompts: &[Box<dyn PromptValue>],
///         options: &CallOptions,
///         callbacks: Option<&CallbackManager>,
///     ) -> Result<LLMResult> {
///         // Call the provider API, one generation list per prompt.
///         todo!()
///     }
///
///     fn model_type(&self) -> &str {
///         "my_model"
///     }
/// }
/// ```
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate ranked completions for each prompt.
    ///
    /// Returns one generation list per input prompt, best candidate
    /// first. An empty result is a protocol violation chains report as a
    /// model invocation error.
    async fn generate_prompt(
        &self,
        prompts: &[Box<dyn PromptValue>],
        options: &CallOptions,
        callbacks: Option<&CallbackManager>,
    ) -> Result<LLMResult>;

    /// Unique identifier for the model type.
    fn model_type(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_generation() {
        let result = LLMResult::with_prompts(vec![vec![
            Generation::new("best"),
            Generation::new("second"),
        ]]);
        assert_eq!(result.first_generation().unwrap().text, "best");

        let empty = LLMResult::with_prompts(vec![]);
        assert!(empty.first_generation().is_none());
    }

    #[test]
    fn test_call_options_debug_hides_closure() {
        let options = CallOptions {
            temperature: Some(0.2),
            streaming_func: Some(Arc::new(|_| {})),
            ..CallOptions::default()
        };
        let debug = format!("{options:?}");
        assert!(debug.contains("streaming_func: true"));
        assert!(debug.contains("0.2"));
    }

    #[test]
    fn test_generation_with_info() {
        let mut info = HashMap::new();
        info.insert("finish_reason".to_string(), serde_json::json!("stop"));
        let generation = Generation::with_info("done", info);
        assert_eq!(generation.text, "done");
        assert!(generation.generation_info.is_some());
    }
}
