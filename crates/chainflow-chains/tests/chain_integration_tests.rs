//! End-to-end tests driving chains through the public crate surface:
//! the call harness, memory persistence across turns, callback
//! lifecycle, and local math evaluation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::RwLock;
use uuid::Uuid;

use chainflow::core::callbacks::{CallbackHandler, CallbackManager};
use chainflow::core::error::{Error, Result};
use chainflow::core::language_models::{CallOptions, Generation, LLMResult, LanguageModel};
use chainflow::core::memory::{BaseMemory, MemoryResult};
use chainflow::core::prompt_values::PromptValue;
use chainflow::core::prompts::PromptTemplate;
use chainflow::core::ChainValues;

use chainflow_chains::options::with_temperature;
use chainflow_chains::{call, predict, run, LLMChain, LLMMathChain};

/// Model that replays scripted responses in order and records every
/// prompt it receives.
struct ScriptedModel {
    responses: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn new(responses: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.iter().rev().map(|s| s.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate_prompt(
        &self,
        prompts: &[Box<dyn PromptValue>],
        _options: &CallOptions,
        _callbacks: Option<&CallbackManager>,
    ) -> Result<LLMResult> {
        if let Some(prompt) = prompts.first() {
            self.prompts.lock().unwrap().push(prompt.to_string());
        }
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| Error::ModelInvocation("script exhausted".to_string()))?;
        Ok(LLMResult::new(Generation::new(response)))
    }

    fn model_type(&self) -> &str {
        "scripted"
    }
}

/// Buffer memory that exposes the full transcript as `history`.
#[derive(Default)]
struct BufferMemory {
    lines: Vec<String>,
}

#[async_trait]
impl BaseMemory for BufferMemory {
    fn memory_variables(&self) -> Vec<String> {
        vec!["history".to_string()]
    }

    async fn load_memory_variables(&self, _inputs: &ChainValues) -> MemoryResult<ChainValues> {
        let mut values = ChainValues::new();
        values.insert("history".to_string(), json!(self.lines.join("\n")));
        Ok(values)
    }

    async fn save_context(
        &mut self,
        inputs: &ChainValues,
        outputs: &ChainValues,
    ) -> MemoryResult<()> {
        if let Some(input) = inputs.get("input").and_then(serde_json::Value::as_str) {
            self.lines.push(format!("Human: {input}"));
        }
        if let Some(output) = outputs.get("text").and_then(serde_json::Value::as_str) {
            self.lines.push(format!("AI: {output}"));
        }
        Ok(())
    }

    async fn clear(&mut self) -> MemoryResult<()> {
        self.lines.clear();
        Ok(())
    }
}

#[tokio::test]
async fn test_conversation_history_flows_through_prompt() {
    let model = ScriptedModel::new(&["Hi Ada!", "You said hello."]);
    let prompt = Arc::new(
        PromptTemplate::from_template("{history}\nHuman: {input}\nAI:")
            .expect("valid template"),
    );
    let memory: Arc<RwLock<dyn BaseMemory>> = Arc::new(RwLock::new(BufferMemory::default()));
    let chain = LLMChain::new(model.clone(), prompt).with_memory(memory);

    let first = run(&chain, "hello", &[]).await.unwrap();
    assert_eq!(first, "Hi Ada!");

    let second = run(&chain, "what did I say?", &[]).await.unwrap();
    assert_eq!(second, "You said hello.");

    // The second prompt carries the first turn verbatim.
    let prompts = model.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("Human: hello"));
    assert!(prompts[1].contains("AI: Hi Ada!"));
}

#[tokio::test]
async fn test_math_chain_end_to_end() {
    let model = ScriptedModel::new(&["```starlark\n37593 * 67\n```"]);
    let chain = LLMMathChain::new(model).unwrap();
    let answer = run(&chain, "What is 37593 * 67?", &[]).await.unwrap();
    assert_eq!(answer, "2518731");
}

#[tokio::test]
async fn test_math_chain_answer_fallback_end_to_end() {
    let model = ScriptedModel::new(&["That one I know.\nAnswer: 2518731"]);
    let chain = LLMMathChain::new(model).unwrap();
    let answer = run(&chain, "What is 37593 * 67?", &[]).await.unwrap();
    assert_eq!(answer, "2518731");
}

#[tokio::test]
async fn test_handler_failure_is_swallowed_by_default() {
    struct FailingHandler {
        fired: AtomicUsize,
    }

    #[async_trait]
    impl CallbackHandler for FailingHandler {
        async fn on_chain_start(
            &self,
            _inputs: &ChainValues,
            _run_id: Uuid,
            _parent_run_id: Option<Uuid>,
        ) -> Result<()> {
            self.fired.fetch_add(1, Ordering::SeqCst);
            Err(Error::Callback("observer exploded".to_string()))
        }
    }

    let handler = Arc::new(FailingHandler {
        fired: AtomicUsize::new(0),
    });
    let model = ScriptedModel::new(&["fine"]);
    let prompt = Arc::new(PromptTemplate::from_template("{input}").expect("valid template"));
    let chain = LLMChain::new(model, prompt).with_callbacks(handler.clone());

    // The chain still succeeds; the handler error is logged, not raised.
    let result = run(&chain, "hi", &[]).await.unwrap();
    assert_eq!(result, "fine");
    assert_eq!(handler.fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_predict_with_options() {
    let model = ScriptedModel::new(&["ok"]);
    let prompt = Arc::new(PromptTemplate::from_template("{input}").expect("valid template"));
    let chain = LLMChain::new(model, prompt);

    let mut inputs = ChainValues::new();
    inputs.insert("input".to_string(), json!("hi"));
    let result = predict(&chain, &inputs, &[with_temperature(0.0)]).await.unwrap();
    assert_eq!(result, "ok");
}

#[tokio::test]
async fn test_call_preserves_input_bag() {
    let model = ScriptedModel::new(&["ok"]);
    let prompt = Arc::new(PromptTemplate::from_template("{input}").expect("valid template"));
    let chain = LLMChain::new(model, prompt);

    let mut inputs = ChainValues::new();
    inputs.insert("input".to_string(), json!("hi"));
    let before = inputs.clone();
    call(&chain, &inputs, &[]).await.unwrap();
    assert_eq!(inputs, before);
}
