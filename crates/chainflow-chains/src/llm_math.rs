//! Natural-language math chain.
//!
//! [`LLMMathChain`] prompts a model to translate a word problem into a
//! single arithmetic expression inside a fenced code block, then
//! evaluates that expression locally in a restricted numeric sandbox.
//! Model output that carries no code block may instead state the result
//! after an `Answer:` marker; anything else is an unrecognized format
//! error carrying the raw text for debugging.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use tokio::sync::RwLock;

use chainflow::core::callbacks::CallbackHandler;
use chainflow::core::error::{Error, Result};
use chainflow::core::language_models::LanguageModel;
use chainflow::core::memory::{BaseMemory, SimpleMemory};
use chainflow::core::prompts::PromptTemplate;
use chainflow::core::ChainValues;

use crate::chain::Chain;
use crate::llm::LLMChain;
use crate::options::ChainCallOption;

const MATH_PROMPT: &str = r#"Translate a math problem into a expression that can be evaluated as Starlark.
Use the output of running this code to answer the question.

---
Question: (Question with math problem.)
```starlark
$(single line expression that solves the problem)
```

---
Question: What is 37593 * 67?
```starlark
37593 * 67
```

---
Question: {question}
"#;

fn code_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::expect_used)]
        let re = Regex::new("(?s)```starlark(.*)```").expect("static regex must compile");
        re
    })
}

/// Chain that answers arithmetic word problems by asking a model for an
/// expression and evaluating it locally.
pub struct LLMMathChain {
    llm_chain: LLMChain,
}

impl LLMMathChain {
    /// Build a math chain around the given model.
    pub fn new(llm: Arc<dyn LanguageModel>) -> Result<Self> {
        let prompt = Arc::new(PromptTemplate::from_template(MATH_PROMPT)?);
        Ok(Self {
            llm_chain: LLMChain::new(llm, prompt),
        })
    }

    /// Attach a callback handler to the inner prompt/model chain.
    pub fn with_callbacks(mut self, callbacks: Arc<dyn CallbackHandler>) -> Self {
        self.llm_chain = self.llm_chain.with_callbacks(callbacks);
        self
    }

    fn process_llm_result(&self, llm_output: &str) -> Result<String> {
        let llm_output = llm_output.trim();
        if let Some(captures) = code_block_regex().captures(llm_output) {
            let expression = &captures[1];
            return evaluate_expression(expression);
        }
        if llm_output.contains("Answer:") {
            if let Some(answer) = llm_output.split("Answer:").nth(1) {
                return Ok(answer.trim().to_string());
            }
        }
        Err(Error::UnrecognizedOutputFormat(llm_output.to_string()))
    }
}

/// Evaluate a single arithmetic expression in a sandbox with no
/// variables, no assignments, and only builtin math functions.
fn evaluate_expression(expression: &str) -> Result<String> {
    let expression = expression.trim();
    let value = fasteval::ez_eval(expression, &mut fasteval::EmptyNamespace).map_err(|e| {
        Error::ExpressionEvaluation {
            expression: expression.to_string(),
            message: format!("{e:?}"),
        }
    })?;
    Ok(format_number(value))
}

/// Whole results print without a trailing `.0` so integer arithmetic
/// reads back as integers.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

#[async_trait]
impl Chain for LLMMathChain {
    async fn call(
        &self,
        inputs: &ChainValues,
        options: &[ChainCallOption],
    ) -> Result<ChainValues> {
        let question = match inputs.get("question") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(Error::InvalidInputValues(format!(
                    "question must be a string, got {other}"
                )))
            }
            None => {
                return Err(Error::InvalidInputValues(
                    "missing required input key: question".to_string(),
                ))
            }
        };

        let mut llm_inputs = ChainValues::new();
        llm_inputs.insert("question".to_string(), serde_json::Value::String(question));
        let mut outputs = crate::chain::call(&self.llm_chain, &llm_inputs, options).await?;

        let text = outputs
            .get(self.llm_chain.output_key())
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| {
                Error::InvalidOutputValues("model chain produced no text output".to_string())
            })?
            .to_string();
        let answer = self.process_llm_result(&text)?;
        outputs.insert("answer".to_string(), serde_json::Value::String(answer));
        Ok(outputs)
    }

    fn input_keys(&self) -> Vec<String> {
        vec!["question".to_string()]
    }

    fn output_keys(&self) -> Vec<String> {
        vec!["answer".to_string()]
    }

    fn memory(&self) -> Option<Arc<RwLock<dyn BaseMemory>>> {
        Some(Arc::new(RwLock::new(SimpleMemory::new())))
    }
}
