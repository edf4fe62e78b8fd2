//! Transaction types for RaceChain.
//!
//! Two forms ride in a block: ordinary transfers submitted by external
//! producers, and the coinbase a miner inserts as the first entry of its own
//! candidate block. Both are immutable once created; identity is the content
//! hash of the canonical encoding.

use crate::error::Result;
use crate::hashing::{self, Sha256Hash};
use serde::{Deserialize, Serialize};

/// Human-readable account identifier ("A", "B", ...).
pub type Account = String;

/// A transaction that can occur in a block.
///
/// Serialized untagged: each variant carries a distinct field set, and the
/// canonical hash encoding covers exactly those fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Transaction {
    Transfer(TransferTx),
    Coinbase(CoinbaseTx),
}

impl Transaction {
    /// Content hash of this transaction.
    pub fn hash(&self) -> Result<Sha256Hash> {
        hashing::transaction_digest(self)
    }

    pub fn hash_str(&self) -> Result<String> {
        Ok(hex::encode(self.hash()?))
    }
}

/// Ordinary transfer between two accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTx {
    pub sender: Account,
    pub receiver: Account,
    pub amount: u64,
    pub data: Option<String>,
}

impl TransferTx {
    pub fn new(sender: impl Into<Account>, receiver: impl Into<Account>, amount: u64) -> Self {
        TransferTx {
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
            data: None,
        }
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }
}

/// Coinbase transaction: the reward a miner grants itself in the first slot
/// of its own candidate block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinbaseTx {
    pub miner: Account,
    pub amount: u64,
}

impl CoinbaseTx {
    pub fn new(miner: impl Into<Account>, amount: u64) -> Self {
        CoinbaseTx {
            miner: miner.into(),
            amount,
        }
    }
}
