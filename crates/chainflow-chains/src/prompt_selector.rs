//! Model-aware prompt selection.
//!
//! Different model families want differently phrased prompts. A
//! [`PromptSelector`] picks a concrete [`PromptTemplate`] for the model
//! a chain is about to call; [`ConditionalPromptSelector`] does so with
//! an ordered predicate list falling back to a default.

use chainflow::core::language_models::LanguageModel;
use chainflow::core::prompts::PromptTemplate;

/// Predicate deciding whether a prompt variant applies to a model.
pub type ModelPredicate = Box<dyn Fn(&dyn LanguageModel) -> bool + Send + Sync>;

/// Selects a prompt template based on the model it will be sent to.
pub trait PromptSelector: Send + Sync {
    /// The prompt to use with the given model.
    fn get_prompt(&self, llm: &dyn LanguageModel) -> PromptTemplate;
}

/// Selector that walks predicate/prompt pairs in order and returns the
/// first match, or the default when none applies.
pub struct ConditionalPromptSelector {
    default_prompt: PromptTemplate,
    conditionals: Vec<(ModelPredicate, PromptTemplate)>,
}

impl ConditionalPromptSelector {
    pub fn new(default_prompt: PromptTemplate) -> Self {
        Self {
            default_prompt,
            conditionals: Vec::new(),
        }
    }

    /// Append a predicate/prompt pair. Earlier pairs take precedence.
    pub fn with_conditional(mut self, condition: ModelPredicate, prompt: PromptTemplate) -> Self {
        self.conditionals.push((condition, prompt));
        self
    }
}

impl PromptSelector for ConditionalPromptSelector {
    fn get_prompt(&self, llm: &dyn LanguageModel) -> PromptTemplate {
        for (condition, prompt) in &self.conditionals {
            if condition(llm) {
                return prompt.clone();
            }
        }
        self.default_prompt.clone()
    }
}

/// Convenience predicate matching on [`LanguageModel::model_type`].
pub fn is_model_type(model_type: &'static str) -> ModelPredicate {
    Box::new(move |llm| llm.model_type() == model_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chainflow::core::callbacks::CallbackManager;
    use chainflow::core::error::Result;
    use chainflow::core::language_models::{CallOptions, LLMResult};
    use chainflow::core::prompt_values::PromptValue;
    use chainflow::core::prompts::BasePromptTemplate;

    struct TypedModel(&'static str);

    #[async_trait]
    impl LanguageModel for TypedModel {
        async fn generate_prompt(
            &self,
            _prompts: &[Box<dyn PromptValue>],
            _options: &CallOptions,
            _callbacks: Option<&CallbackManager>,
        ) -> Result<LLMResult> {
            Ok(LLMResult::with_prompts(Vec::new()))
        }

        fn model_type(&self) -> &str {
            self.0
        }
    }

    fn template(text: &str) -> PromptTemplate {
        PromptTemplate::from_template(text).unwrap()
    }

    #[test]
    fn test_default_when_no_conditionals() {
        let selector = ConditionalPromptSelector::new(template("default {x}"));
        let prompt = selector.get_prompt(&TypedModel("chat"));
        assert_eq!(prompt.input_variables(), ["x".to_string()]);
    }

    #[test]
    fn test_first_matching_conditional_wins() {
        let selector = ConditionalPromptSelector::new(template("default"))
            .with_conditional(is_model_type("chat"), template("chat prompt"))
            .with_conditional(Box::new(|_| true), template("catch-all"));

        let values = chainflow::core::ChainValues::new();
        let chat = selector.get_prompt(&TypedModel("chat"));
        assert_eq!(chat.format(&values).unwrap(), "chat prompt");

        let other = selector.get_prompt(&TypedModel("completion"));
        assert_eq!(other.format(&values).unwrap(), "catch-all");
    }

    #[test]
    fn test_no_match_falls_back_to_default() {
        let selector = ConditionalPromptSelector::new(template("default"))
            .with_conditional(is_model_type("chat"), template("chat prompt"));

        let values = chainflow::core::ChainValues::new();
        let prompt = selector.get_prompt(&TypedModel("completion"));
        assert_eq!(prompt.format(&values).unwrap(), "default");
    }
}
