//! The prompt/model/parser chain.
//!
//! [`LLMChain`] is the workhorse composition: format a prompt template
//! with the input bag, send it to a language model, and parse the first
//! generation into the output bag under a single output key.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use chainflow::core::callbacks::{CallbackHandler, CallbackManager};
use chainflow::core::error::{Error, Result};
use chainflow::core::language_models::LanguageModel;
use chainflow::core::memory::{BaseMemory, SimpleMemory};
use chainflow::core::output_parsers::{OutputParser, SimpleOutputParser};
use chainflow::core::prompts::BasePromptTemplate;
use chainflow::core::ChainValues;

use crate::chain::Chain;
use crate::options::{build_call_options, ChainCallOption};

const DEFAULT_OUTPUT_KEY: &str = "text";

/// Chain that formats a prompt, calls a model, and parses the result.
pub struct LLMChain {
    prompt: Arc<dyn BasePromptTemplate>,
    llm: Arc<dyn LanguageModel>,
    memory: Arc<RwLock<dyn BaseMemory>>,
    callbacks: Option<Arc<dyn CallbackHandler>>,
    output_parser: Arc<dyn OutputParser<Output = serde_json::Value>>,
    output_key: String,
}

impl LLMChain {
    /// Build a chain with stateless memory, no callbacks, and the
    /// pass-through output parser.
    pub fn new(llm: Arc<dyn LanguageModel>, prompt: Arc<dyn BasePromptTemplate>) -> Self {
        Self {
            prompt,
            llm,
            memory: Arc::new(RwLock::new(SimpleMemory::new())),
            callbacks: None,
            output_parser: Arc::new(SimpleOutputParser),
            output_key: DEFAULT_OUTPUT_KEY.to_string(),
        }
    }

    /// Replace the memory collaborator.
    pub fn with_memory(mut self, memory: Arc<RwLock<dyn BaseMemory>>) -> Self {
        self.memory = memory;
        self
    }

    /// Attach a callback handler fired at chain and model boundaries.
    pub fn with_callbacks(mut self, callbacks: Arc<dyn CallbackHandler>) -> Self {
        self.callbacks = Some(callbacks);
        self
    }

    /// Replace the output parser applied to the model's first generation.
    pub fn with_output_parser(
        mut self,
        parser: Arc<dyn OutputParser<Output = serde_json::Value>>,
    ) -> Self {
        self.output_parser = parser;
        self
    }

    /// Rename the single output key (defaults to `"text"`).
    pub fn with_output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = key.into();
        self
    }

    /// The key the parsed result is stored under.
    pub fn output_key(&self) -> &str {
        &self.output_key
    }

    /// The prompt template this chain formats.
    pub fn prompt(&self) -> &dyn BasePromptTemplate {
        self.prompt.as_ref()
    }
}

#[async_trait]
impl Chain for LLMChain {
    async fn call(
        &self,
        inputs: &ChainValues,
        options: &[ChainCallOption],
    ) -> Result<ChainValues> {
        let prompts = vec![self.prompt.format_prompt(inputs)?];
        let call_options = build_call_options(options);
        let manager = self
            .callbacks
            .clone()
            .map(|handler| CallbackManager::with_handlers(vec![handler]));

        let result = self
            .llm
            .generate_prompt(&prompts, &call_options, manager.as_ref())
            .await?;
        let generation = result.first_generation().ok_or_else(|| {
            Error::ModelInvocation("model returned no generations".to_string())
        })?;

        let parsed = self
            .output_parser
            .parse_with_prompt(&generation.text, prompts[0].as_ref())?;

        let mut outputs = ChainValues::new();
        outputs.insert(self.output_key.clone(), parsed);
        Ok(outputs)
    }

    fn input_keys(&self) -> Vec<String> {
        self.prompt.input_variables().to_vec()
    }

    fn output_keys(&self) -> Vec<String> {
        vec![self.output_key.clone()]
    }

    fn memory(&self) -> Option<Arc<RwLock<dyn BaseMemory>>> {
        Some(self.memory.clone())
    }

    fn callbacks(&self) -> Option<Arc<dyn CallbackHandler>> {
        self.callbacks.clone()
    }
}
