//! Core collaborator interfaces and shared types.

pub mod callbacks;
pub mod error;
pub mod language_models;
pub mod memory;
pub mod messages;
pub mod output_parsers;
pub mod prompt_values;
pub mod prompts;

pub use error::{Error, Result};

/// Named-value bag passed into and out of chains and memory.
///
/// Keys are declared by each chain; values are arbitrary JSON values so a
/// chain can fail cleanly on a wrong-typed input instead of panicking.
/// Insertion order is irrelevant. Chains never mutate the bag they
/// receive; they build a fresh one for their outputs.
pub type ChainValues = std::collections::HashMap<String, serde_json::Value>;
