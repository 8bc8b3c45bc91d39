//! The chain execution contract and its generic call harness.
//!
//! A [`Chain`] declares the input keys it requires, the output keys it
//! guarantees, and an optional memory collaborator. `Chain::call` is the
//! sole execution entry point; it holds no mutable per-call state, so a
//! chain instance is safe to call from independent sites concurrently
//! whenever its collaborators are.
//!
//! Callers normally go through the free [`call`] function rather than
//! `Chain::call` directly. The harness:
//!
//! 1. loads memory variables and merges them into the input bag
//! 2. fires `on_chain_start`
//! 3. validates that every declared input key is present
//! 4. invokes `Chain::call`
//! 5. validates that every declared output key is present
//! 6. saves the turn to memory and fires `on_chain_end`
//!
//! Any failure fires `on_chain_error` and returns the error; no partial
//! output bag survives. Cancellation is the caller's: dropping the
//! returned future aborts the in-flight model call.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use chainflow::core::callbacks::{CallbackHandler, CallbackManager};
use chainflow::core::error::{Error, Result};
use chainflow::core::memory::BaseMemory;
use chainflow::core::ChainValues;

use crate::options::ChainCallOption;

/// The chain execution contract.
#[async_trait]
pub trait Chain: Send + Sync {
    /// Execute the chain against an already-merged input bag.
    ///
    /// Implementations must not mutate `inputs` and must return a bag
    /// containing every key in [`output_keys`] on success. Prefer the
    /// free [`call`] function, which also handles memory and callbacks.
    ///
    /// [`output_keys`]: Chain::output_keys
    async fn call(&self, inputs: &ChainValues, options: &[ChainCallOption])
        -> Result<ChainValues>;

    /// Exactly the keys this chain requires in its input bag.
    fn input_keys(&self) -> Vec<String>;

    /// Exactly the keys guaranteed present in a successful result.
    fn output_keys(&self) -> Vec<String>;

    /// The memory collaborator, if this chain persists conversation
    /// state. Defaults to none.
    fn memory(&self) -> Option<Arc<RwLock<dyn BaseMemory>>> {
        None
    }

    /// The callback handler notified at this chain's lifecycle
    /// boundaries. Defaults to none.
    fn callbacks(&self) -> Option<Arc<dyn CallbackHandler>> {
        None
    }
}

fn validate_inputs(chain: &dyn Chain, inputs: &ChainValues) -> Result<()> {
    let missing: Vec<_> = chain
        .input_keys()
        .into_iter()
        .filter(|k| !inputs.contains_key(k))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidInputValues(format!(
            "missing required input keys: {}",
            missing.join(", ")
        )))
    }
}

fn validate_outputs(chain: &dyn Chain, outputs: &ChainValues) -> Result<()> {
    let missing: Vec<_> = chain
        .output_keys()
        .into_iter()
        .filter(|k| !outputs.contains_key(k))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidOutputValues(format!(
            "missing declared output keys: {}",
            missing.join(", ")
        )))
    }
}

async fn call_chain(
    chain: &dyn Chain,
    full_values: &ChainValues,
    options: &[ChainCallOption],
) -> Result<ChainValues> {
    validate_inputs(chain, full_values)?;
    let outputs = chain.call(full_values, options).await?;
    validate_outputs(chain, &outputs)?;
    Ok(outputs)
}

/// Execute a chain through the full harness: memory, validation, and
/// lifecycle callbacks.
pub async fn call(
    chain: &dyn Chain,
    inputs: &ChainValues,
    options: &[ChainCallOption],
) -> Result<ChainValues> {
    let run_id = Uuid::new_v4();
    let manager = chain
        .callbacks()
        .map(|handler| CallbackManager::with_handlers(vec![handler]));
    let memory = chain.memory();

    let mut full_values = inputs.clone();
    if let Some(memory) = &memory {
        let loaded = memory
            .read()
            .await
            .load_memory_variables(inputs)
            .await
            .map_err(|e| Error::Memory(e.to_string()))?;
        full_values.extend(loaded);
    }

    if let Some(manager) = &manager {
        manager.on_chain_start(&full_values, run_id, None).await?;
    }

    match call_chain(chain, &full_values, options).await {
        Ok(outputs) => {
            if let Some(memory) = &memory {
                memory
                    .write()
                    .await
                    .save_context(inputs, &outputs)
                    .await
                    .map_err(|e| Error::Memory(e.to_string()))?;
            }
            if let Some(manager) = &manager {
                manager.on_chain_end(&outputs, run_id, None).await?;
            }
            Ok(outputs)
        }
        Err(e) => {
            if let Some(manager) = &manager {
                manager.on_chain_error(&e.to_string(), run_id, None).await?;
            }
            Err(e)
        }
    }
}

async fn non_memory_input_keys(chain: &dyn Chain) -> Vec<String> {
    let memory_keys = match chain.memory() {
        Some(memory) => memory.read().await.memory_variables(),
        None => Vec::new(),
    };
    chain
        .input_keys()
        .into_iter()
        .filter(|k| !memory_keys.contains(k))
        .collect()
}

/// Run a chain that declares exactly one non-memory input key and one
/// output key, passing `input` as that sole input.
pub async fn run(
    chain: &dyn Chain,
    input: impl Into<serde_json::Value>,
    options: &[ChainCallOption],
) -> Result<String> {
    let input_keys = non_memory_input_keys(chain).await;
    if input_keys.len() != 1 {
        return Err(Error::InvalidInputValues(format!(
            "run requires a chain with exactly one input key, got {:?}",
            input_keys
        )));
    }

    let mut inputs = ChainValues::new();
    inputs.insert(input_keys[0].clone(), input.into());
    predict(chain, &inputs, options).await
}

/// Call a chain and return its single declared output as a string.
pub async fn predict(
    chain: &dyn Chain,
    inputs: &ChainValues,
    options: &[ChainCallOption],
) -> Result<String> {
    let output_keys = chain.output_keys();
    if output_keys.len() != 1 {
        return Err(Error::InvalidOutputValues(format!(
            "predict requires a chain with exactly one output key, got {:?}",
            output_keys
        )));
    }

    let outputs = call(chain, inputs, options).await?;
    match outputs.get(&output_keys[0]) {
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(Error::InvalidOutputValues(format!(
            "output key {:?} is not a string: {other}",
            output_keys[0]
        ))),
        // Unreachable after validate_outputs, kept for contract clarity.
        None => Err(Error::InvalidOutputValues(format!(
            "output key {:?} missing from result",
            output_keys[0]
        ))),
    }
}
