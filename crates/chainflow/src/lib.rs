//! Core abstractions for `Chainflow`.
//!
//! This crate provides the building blocks that chains are composed from:
//!
//! - [`core::prompts`] - Prompt templates with f-string variable substitution
//! - [`core::language_models`] - The [`core::language_models::LanguageModel`]
//!   trait, generations, and call options
//! - [`core::output_parsers`] - Parsers turning raw model text into
//!   structured values
//! - [`core::memory`] - Conversational state persisted across chain calls
//! - [`core::callbacks`] - Lifecycle hooks for tracing and streaming
//! - [`core::error`] - The shared error taxonomy
//!
//! The chain execution contract itself lives in the `chainflow-chains`
//! crate; everything here is a collaborator consumed through a narrow
//! trait.

#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::panic,
        clippy::unwrap_used
    )
)]

pub mod core;

pub use core::error::{Error, Result};
