//! Chain call options.
//!
//! Callers configure a model call with a sequence of pure mutators that
//! are applied, in order, to a default [`CallOptions`] value. No hidden
//! global state: the same option list always produces the same options.
//!
//! # Example
//!
//! ```rust
//! use chainflow_chains::options::{build_call_options, with_stop_words, with_temperature};
//!
//! let options = build_call_options(&[
//!     with_temperature(0.2),
//!     with_stop_words(vec!["\n".to_string()]),
//! ]);
//! assert_eq!(options.temperature, Some(0.2));
//! ```

use chainflow::core::language_models::{CallOptions, StreamingFunc};

/// A pure transform applied to a [`CallOptions`] value.
pub type ChainCallOption = Box<dyn Fn(&mut CallOptions) + Send + Sync>;

/// Fold a sequence of option mutators over the default options.
#[must_use]
pub fn build_call_options(options: &[ChainCallOption]) -> CallOptions {
    let mut built = CallOptions::default();
    for option in options {
        option(&mut built);
    }
    built
}

/// Override the model/deployment name.
pub fn with_model(model: impl Into<String>) -> ChainCallOption {
    let model = model.into();
    Box::new(move |o| o.model = Some(model.clone()))
}

/// Set the sampling temperature.
pub fn with_temperature(temperature: f64) -> ChainCallOption {
    Box::new(move |o| o.temperature = Some(temperature))
}

/// Cap the number of generated tokens.
pub fn with_max_tokens(max_tokens: usize) -> ChainCallOption {
    Box::new(move |o| o.max_tokens = Some(max_tokens))
}

/// Set the nucleus sampling probability mass.
pub fn with_top_p(top_p: f64) -> ChainCallOption {
    Box::new(move |o| o.top_p = Some(top_p))
}

/// Set sequences that halt generation.
pub fn with_stop_words(stop_words: Vec<String>) -> ChainCallOption {
    Box::new(move |o| o.stop_words = Some(stop_words.clone()))
}

/// Set a deterministic sampling seed.
pub fn with_seed(seed: i64) -> ChainCallOption {
    Box::new(move |o| o.seed = Some(seed))
}

/// Register a per-chunk streaming callback.
pub fn with_streaming_func(streaming_func: StreamingFunc) -> ChainCallOption {
    Box::new(move |o| o.streaming_func = Some(streaming_func.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_defaults_are_unset() {
        let options = build_call_options(&[]);
        assert!(options.model.is_none());
        assert!(options.temperature.is_none());
        assert!(options.stop_words.is_none());
        assert!(options.streaming_func.is_none());
    }

    #[test]
    fn test_options_apply_in_order() {
        let options = build_call_options(&[with_temperature(0.9), with_temperature(0.1)]);
        assert_eq!(options.temperature, Some(0.1));
    }

    #[test]
    fn test_all_fields() {
        let options = build_call_options(&[
            with_model("test-model"),
            with_max_tokens(256),
            with_top_p(0.95),
            with_stop_words(vec!["stop".to_string()]),
            with_seed(7),
        ]);
        assert_eq!(options.model.as_deref(), Some("test-model"));
        assert_eq!(options.max_tokens, Some(256));
        assert_eq!(options.top_p, Some(0.95));
        assert_eq!(options.stop_words, Some(vec!["stop".to_string()]));
        assert_eq!(options.seed, Some(7));
    }

    #[test]
    fn test_streaming_func_is_carried() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let options = build_call_options(&[with_streaming_func(Arc::new(move |_chunk| {
            counter.fetch_add(1, Ordering::SeqCst);
        }))]);

        let func = options.streaming_func.expect("streaming func set");
        func("chunk one");
        func("chunk two");
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }
}
