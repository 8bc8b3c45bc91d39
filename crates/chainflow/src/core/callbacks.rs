// Allow clippy warnings for callback manager
// - clone_on_ref_ptr: CallbackManager clones Arc<dyn CallbackHandler> to fan out
#![allow(clippy::clone_on_ref_ptr)]

//! Callback system for observability and streaming.
//!
//! Callbacks hook into chain, model, tool, and retriever lifecycle
//! boundaries. They are never required for correctness: every hook has a
//! no-op default, and a failing handler cannot abort the primary call
//! unless it explicitly opts in via [`CallbackHandler::raise_error`].
//!
//! - [`CallbackHandler`] - Trait for implementing custom callbacks
//! - [`CallbackManager`] - Fans one event out to multiple handlers
//! - [`NullCallbackHandler`] - Does nothing
//! - [`ConsoleCallbackHandler`] - Prints chain events to stdout

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::language_models::LLMResult;
use crate::core::ChainValues;

/// An action an agent has decided to take, reported through
/// [`CallbackHandler::on_agent_action`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentAction {
    /// Name of the tool to invoke.
    pub tool: String,
    /// Raw input handed to the tool.
    pub tool_input: String,
    /// The model text that produced this action.
    pub log: String,
}

/// Callback handler trait.
///
/// Every hook is fire-and-forget from the chain's perspective and
/// defaults to a no-op, so partial observers implement only the hooks
/// they care about.
#[async_trait]
pub trait CallbackHandler: Send + Sync {
    /// Called on arbitrary text emitted mid-run.
    async fn on_text(&self, text: &str, run_id: Uuid, parent_run_id: Option<Uuid>) -> Result<()> {
        let _ = (text, run_id, parent_run_id);
        Ok(())
    }

    /// Called when a model call starts, with the rendered prompts.
    async fn on_llm_start(
        &self,
        prompts: &[String],
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<()> {
        let _ = (prompts, run_id, parent_run_id);
        Ok(())
    }

    /// Called when a model call ends.
    async fn on_llm_end(
        &self,
        result: &LLMResult,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<()> {
        let _ = (result, run_id, parent_run_id);
        Ok(())
    }

    /// Called when a model call fails.
    async fn on_llm_error(
        &self,
        error: &str,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<()> {
        let _ = (error, run_id, parent_run_id);
        Ok(())
    }

    /// Called once per streamed generation chunk, in emission order.
    async fn on_llm_new_token(
        &self,
        token: &str,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<()> {
        let _ = (token, run_id, parent_run_id);
        Ok(())
    }

    /// Called when a chain starts running, with its merged input bag.
    async fn on_chain_start(
        &self,
        inputs: &ChainValues,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<()> {
        let _ = (inputs, run_id, parent_run_id);
        Ok(())
    }

    /// Called when a chain ends running, with its output bag.
    async fn on_chain_end(
        &self,
        outputs: &ChainValues,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<()> {
        let _ = (outputs, run_id, parent_run_id);
        Ok(())
    }

    /// Called when a chain fails.
    async fn on_chain_error(
        &self,
        error: &str,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<()> {
        let _ = (error, run_id, parent_run_id);
        Ok(())
    }

    /// Called when a tool starts running.
    async fn on_tool_start(
        &self,
        input: &str,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<()> {
        let _ = (input, run_id, parent_run_id);
        Ok(())
    }

    /// Called when a tool ends running.
    async fn on_tool_end(
        &self,
        output: &str,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<()> {
        let _ = (output, run_id, parent_run_id);
        Ok(())
    }

    /// Called when an agent decides on an action.
    async fn on_agent_action(
        &self,
        action: &AgentAction,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<()> {
        let _ = (action, run_id, parent_run_id);
        Ok(())
    }

    /// Called when a retriever starts running.
    async fn on_retriever_start(
        &self,
        query: &str,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<()> {
        let _ = (query, run_id, parent_run_id);
        Ok(())
    }

    /// Called when a retriever ends running.
    async fn on_retriever_end(
        &self,
        query: &str,
        documents: &[serde_json::Value],
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<()> {
        let _ = (query, documents, run_id, parent_run_id);
        Ok(())
    }

    /// Whether to ignore model callbacks.
    fn ignore_llm(&self) -> bool {
        false
    }

    /// Whether to ignore chain callbacks.
    fn ignore_chain(&self) -> bool {
        false
    }

    /// Whether to ignore tool callbacks.
    fn ignore_tool(&self) -> bool {
        false
    }

    /// Whether to ignore retriever callbacks.
    fn ignore_retriever(&self) -> bool {
        false
    }

    /// Whether a failure in this handler should abort the primary call.
    fn raise_error(&self) -> bool {
        false
    }
}

/// Null callback handler that does nothing.
#[derive(Debug, Clone, Default)]
pub struct NullCallbackHandler;

#[async_trait]
impl CallbackHandler for NullCallbackHandler {}

/// Callback handler that prints chain and model events to stdout.
#[derive(Debug, Clone, Default)]
pub struct ConsoleCallbackHandler;

impl ConsoleCallbackHandler {
    /// Create a new console handler.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CallbackHandler for ConsoleCallbackHandler {
    async fn on_chain_start(
        &self,
        inputs: &ChainValues,
        run_id: Uuid,
        _parent_run_id: Option<Uuid>,
    ) -> Result<()> {
        println!("[chain start] run={run_id} inputs={inputs:?}");
        Ok(())
    }

    async fn on_chain_end(
        &self,
        outputs: &ChainValues,
        run_id: Uuid,
        _parent_run_id: Option<Uuid>,
    ) -> Result<()> {
        println!("[chain end] run={run_id} outputs={outputs:?}");
        Ok(())
    }

    async fn on_chain_error(
        &self,
        error: &str,
        run_id: Uuid,
        _parent_run_id: Option<Uuid>,
    ) -> Result<()> {
        println!("[chain error] run={run_id} error={error}");
        Ok(())
    }

    async fn on_llm_new_token(
        &self,
        token: &str,
        _run_id: Uuid,
        _parent_run_id: Option<Uuid>,
    ) -> Result<()> {
        print!("{token}");
        Ok(())
    }

    async fn on_text(&self, text: &str, _run_id: Uuid, _parent_run_id: Option<Uuid>) -> Result<()> {
        println!("{text}");
        Ok(())
    }
}

/// Callback manager that coordinates multiple callback handlers.
///
/// Events are dispatched to handlers in registration order. Handler
/// errors are logged and swallowed unless the handler's `raise_error()`
/// returns true.
#[derive(Clone, Default)]
pub struct CallbackManager {
    handlers: Vec<Arc<dyn CallbackHandler>>,
}

impl CallbackManager {
    /// Create a new callback manager with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Create a callback manager with the given handlers.
    #[must_use]
    pub fn with_handlers(handlers: Vec<Arc<dyn CallbackHandler>>) -> Self {
        Self { handlers }
    }

    /// Add a callback handler to the manager.
    pub fn add_handler(&mut self, handler: Arc<dyn CallbackHandler>) {
        self.handlers.push(handler);
    }

    /// Get the number of handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if there are no handlers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Execute a callback on all handlers.
    async fn execute<F, Fut>(&self, f: F) -> Result<()>
    where
        F: Fn(Arc<dyn CallbackHandler>) -> Fut,
        Fut: std::future::Future<Output = Result<()>>,
    {
        for handler in &self.handlers {
            if let Err(e) = f(handler.clone()).await {
                if handler.raise_error() {
                    return Err(e);
                }
                tracing::warn!(error = %e, "callback error (ignored)");
            }
        }
        Ok(())
    }

    /// Dispatch a chain-start event.
    pub async fn on_chain_start(
        &self,
        inputs: &ChainValues,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<()> {
        let inputs = inputs.clone();
        self.execute(move |handler| {
            let inputs = inputs.clone();
            async move {
                if handler.ignore_chain() {
                    Ok(())
                } else {
                    handler.on_chain_start(&inputs, run_id, parent_run_id).await
                }
            }
        })
        .await
    }

    /// Dispatch a chain-end event.
    pub async fn on_chain_end(
        &self,
        outputs: &ChainValues,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<()> {
        let outputs = outputs.clone();
        self.execute(move |handler| {
            let outputs = outputs.clone();
            async move {
                if handler.ignore_chain() {
                    Ok(())
                } else {
                    handler.on_chain_end(&outputs, run_id, parent_run_id).await
                }
            }
        })
        .await
    }

    /// Dispatch a chain-error event.
    pub async fn on_chain_error(
        &self,
        error: &str,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<()> {
        let error = error.to_string();
        self.execute(move |handler| {
            let error = error.clone();
            async move {
                if handler.ignore_chain() {
                    Ok(())
                } else {
                    handler.on_chain_error(&error, run_id, parent_run_id).await
                }
            }
        })
        .await
    }

    /// Dispatch a model-start event.
    pub async fn on_llm_start(
        &self,
        prompts: &[String],
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<()> {
        let prompts = prompts.to_vec();
        self.execute(move |handler| {
            let prompts = prompts.clone();
            async move {
                if handler.ignore_llm() {
                    Ok(())
                } else {
                    handler.on_llm_start(&prompts, run_id, parent_run_id).await
                }
            }
        })
        .await
    }

    /// Dispatch a model-end event.
    pub async fn on_llm_end(
        &self,
        result: &LLMResult,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<()> {
        let result = result.clone();
        self.execute(move |handler| {
            let result = result.clone();
            async move {
                if handler.ignore_llm() {
                    Ok(())
                } else {
                    handler.on_llm_end(&result, run_id, parent_run_id).await
                }
            }
        })
        .await
    }

    /// Dispatch a model-error event.
    pub async fn on_llm_error(
        &self,
        error: &str,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<()> {
        let error = error.to_string();
        self.execute(move |handler| {
            let error = error.clone();
            async move {
                if handler.ignore_llm() {
                    Ok(())
                } else {
                    handler.on_llm_error(&error, run_id, parent_run_id).await
                }
            }
        })
        .await
    }

    /// Dispatch a streamed-token event.
    pub async fn on_llm_new_token(
        &self,
        token: &str,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<()> {
        let token = token.to_string();
        self.execute(move |handler| {
            let token = token.clone();
            async move {
                if handler.ignore_llm() {
                    Ok(())
                } else {
                    handler.on_llm_new_token(&token, run_id, parent_run_id).await
                }
            }
        })
        .await
    }

    /// Dispatch a text event.
    pub async fn on_text(
        &self,
        text: &str,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<()> {
        let text = text.to_string();
        self.execute(move |handler| {
            let text = text.clone();
            async move { handler.on_text(&text, run_id, parent_run_id).await }
        })
        .await
    }
}

impl fmt::Debug for CallbackManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackManager")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingHandler {
        chain_starts: AtomicUsize,
        chain_ends: AtomicUsize,
    }

    #[async_trait]
    impl CallbackHandler for CountingHandler {
        async fn on_chain_start(
            &self,
            _inputs: &ChainValues,
            _run_id: Uuid,
            _parent_run_id: Option<Uuid>,
        ) -> Result<()> {
            self.chain_starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn on_chain_end(
            &self,
            _outputs: &ChainValues,
            _run_id: Uuid,
            _parent_run_id: Option<Uuid>,
        ) -> Result<()> {
            self.chain_ends.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingHandler {
        raise: bool,
    }

    #[async_trait]
    impl CallbackHandler for FailingHandler {
        async fn on_chain_start(
            &self,
            _inputs: &ChainValues,
            _run_id: Uuid,
            _parent_run_id: Option<Uuid>,
        ) -> Result<()> {
            Err(Error::Callback("handler exploded".to_string()))
        }

        fn raise_error(&self) -> bool {
            self.raise
        }
    }

    #[tokio::test]
    async fn test_manager_dispatches_to_all_handlers() {
        let first = Arc::new(CountingHandler::default());
        let second = Arc::new(CountingHandler::default());
        let manager = CallbackManager::with_handlers(vec![first.clone(), second.clone()]);

        let run_id = Uuid::new_v4();
        manager
            .on_chain_start(&ChainValues::new(), run_id, None)
            .await
            .unwrap();
        manager
            .on_chain_end(&ChainValues::new(), run_id, None)
            .await
            .unwrap();

        assert_eq!(first.chain_starts.load(Ordering::SeqCst), 1);
        assert_eq!(second.chain_ends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_handler_errors_are_swallowed_by_default() {
        let failing = Arc::new(FailingHandler { raise: false });
        let counting = Arc::new(CountingHandler::default());
        let manager = CallbackManager::with_handlers(vec![failing, counting.clone()]);

        manager
            .on_chain_start(&ChainValues::new(), Uuid::new_v4(), None)
            .await
            .unwrap();

        // The failing handler did not stop dispatch.
        assert_eq!(counting.chain_starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_raise_error_propagates() {
        let failing = Arc::new(FailingHandler { raise: true });
        let manager = CallbackManager::with_handlers(vec![failing]);

        let result = manager
            .on_chain_start(&ChainValues::new(), Uuid::new_v4(), None)
            .await;
        assert!(matches!(result, Err(Error::Callback(_))));
    }

    #[tokio::test]
    async fn test_null_handler_is_silent() {
        let manager =
            CallbackManager::with_handlers(vec![Arc::new(NullCallbackHandler)]);
        manager
            .on_llm_start(&["prompt".to_string()], Uuid::new_v4(), None)
            .await
            .unwrap();
        manager
            .on_text("hello", Uuid::new_v4(), None)
            .await
            .unwrap();
    }
}
