//! Chains for composing LLM workflows in `Chainflow`.
//!
//! A chain is a reusable unit of work that takes a named-value input bag,
//! transforms it through one or more language-model invocations plus
//! deterministic post-processing, and produces a named-value output bag.
//!
//! # Chain Types
//!
//! - [`LLMChain`]: Format a prompt, invoke the model once, parse the output
//! - [`LLMMathChain`]: Translate a math word-problem into an expression and
//!   evaluate it in a restricted sandbox
//!
//! # Execution
//!
//! Chains implement the [`Chain`] trait. Callers go through the generic
//! [`call`] harness (or the single-input [`run`] / [`predict`] helpers),
//! which loads memory variables, validates declared input/output keys,
//! brackets the call with chain start/end callbacks, and persists the
//! turn to memory on success.
//!
//! # Example
//!
//! ```rust,ignore
//! use chainflow_chains::{chain, LLMMathChain};
//! use std::sync::Arc;
//!
//! let math = LLMMathChain::new(Arc::new(llm))?;
//! let answer = chain::run(&math, "What is 37593 * 67?", &[]).await?;
//! assert_eq!(answer, "2518731");
//! ```

#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::panic,
        clippy::unwrap_used
    )
)]

pub mod chain;
pub mod llm;
pub mod llm_math;
pub mod options;
pub mod prompt_selector;

pub use chain::{call, predict, run, Chain};
pub use llm::LLMChain;
pub use llm_math::LLMMathChain;
pub use options::{
    build_call_options, with_max_tokens, with_model, with_seed, with_stop_words,
    with_streaming_func, with_temperature, with_top_p, ChainCallOption,
};
pub use prompt_selector::{is_model_type, ConditionalPromptSelector, PromptSelector};
