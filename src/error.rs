//! Error types for RaceChain

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// Another block won the race for this index.
    #[error("stale candidate: expected index {expected}, block carries {got}")]
    StaleIndex { expected: u64, got: u64 },

    #[error("stale candidate: previous hash does not match the chain tip")]
    StaleTip,

    #[error("block hash does not meet the difficulty target")]
    DifficultyUnmet,

    #[error("stored block hash does not match its recomputed value")]
    BlockHashMismatch,

    #[error("transactions hash does not match the block body")]
    TransactionsHashMismatch,

    #[error("first transaction in a block must be a coinbase")]
    MissingCoinbase,

    #[error("genesis block can only be applied to an empty chain")]
    GenesisRejected,

    #[error("mining interrupted by stop signal")]
    Interrupted,

    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ChainError {
    /// Stale candidates are the expected outcome of losing a mining race;
    /// callers recover by rebuilding against the new tip.
    pub fn is_stale(&self) -> bool {
        matches!(self, ChainError::StaleIndex { .. } | ChainError::StaleTip)
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        ChainError::Serialization(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
