//! Conversational memory collaborators.
//!
//! Memory maintains state across chain executions. The chain core only
//! consumes the [`BaseMemory`] trait: it loads variables before a call
//! and saves the turn after a successful one. Storage layout, locking
//! discipline, and persistence are entirely the implementation's concern.

use async_trait::async_trait;
use thiserror::Error;

use crate::core::ChainValues;

/// Errors that can occur during memory operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MemoryError {
    #[error("Memory operation failed: {0}")]
    OperationFailed(String),

    #[error("Invalid memory configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Result alias for memory operations.
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Abstract base trait for memory in chains.
///
/// Implementors must provide:
/// - `memory_variables()`: the keys this memory injects into chain inputs
/// - `load_memory_variables()`: load state as a key-value bag
/// - `save_context()`: persist one conversation turn
/// - `clear()`: drop all stored state
///
/// If one instance is shared across concurrent calls it is responsible
/// for its own locking; chains perform none.
#[async_trait]
pub trait BaseMemory: Send + Sync {
    /// The keys this memory adds to chain inputs.
    fn memory_variables(&self) -> Vec<String>;

    /// Load memory variables to merge into the chain input bag.
    async fn load_memory_variables(&self, inputs: &ChainValues) -> MemoryResult<ChainValues>;

    /// Save the context of this chain run to memory.
    async fn save_context(
        &mut self,
        inputs: &ChainValues,
        outputs: &ChainValues,
    ) -> MemoryResult<()>;

    /// Clear all memory contents.
    async fn clear(&mut self) -> MemoryResult<()>;
}

/// Stateless memory that stores nothing and provides no variables.
///
/// The default collaborator for chains that do not carry conversation
/// state.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleMemory;

impl SimpleMemory {
    /// Create a new no-op memory.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BaseMemory for SimpleMemory {
    fn memory_variables(&self) -> Vec<String> {
        Vec::new()
    }

    async fn load_memory_variables(&self, _inputs: &ChainValues) -> MemoryResult<ChainValues> {
        Ok(ChainValues::new())
    }

    async fn save_context(
        &mut self,
        _inputs: &ChainValues,
        _outputs: &ChainValues,
    ) -> MemoryResult<()> {
        Ok(())
    }

    async fn clear(&mut self) -> MemoryResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simple_memory_is_empty() {
        let mut memory = SimpleMemory::new();
        assert!(memory.memory_variables().is_empty());

        let loaded = memory
            .load_memory_variables(&ChainValues::new())
            .await
            .unwrap();
        assert!(loaded.is_empty());

        memory
            .save_context(&ChainValues::new(), &ChainValues::new())
            .await
            .unwrap();
        memory.clear().await.unwrap();
    }
}
