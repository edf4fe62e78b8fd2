use crate::error::{ChainError, Result};
use crate::hashing::{self, meets_difficulty};
use crate::transaction::Transaction;

use super::chain::Block;

/// Validate a mined candidate against the current chain.
///
/// Order matters: the cheap difficulty check first, then integrity of the
/// stored hashes, then the position checks that reject stale candidates from
/// lost mining races. A candidate that fails here must leave the chain
/// untouched — the caller only mutates after an `Ok`.
pub fn validate_candidate(blocks: &[Block], block: &Block, difficulty: usize) -> Result<()> {
    if !meets_difficulty(&block.block_hash, difficulty) {
        return Err(ChainError::DifficultyUnmet);
    }

    // The stored hash must be recomputable from the block's own data, and
    // the header must commit to the transaction list the block carries.
    if block.recompute_hash() != block.block_hash {
        return Err(ChainError::BlockHashMismatch);
    }
    if hashing::transaction_list_digest(&block.transactions)? != block.header.transactions_hash {
        return Err(ChainError::TransactionsHashMismatch);
    }

    if !matches!(block.transactions.first(), Some(Transaction::Coinbase(_))) {
        return Err(ChainError::MissingCoinbase);
    }

    if block.header.index == 0 {
        return if blocks.is_empty() {
            Ok(())
        } else {
            Err(ChainError::GenesisRejected)
        };
    }

    if block.header.index != blocks.len() as u64 {
        return Err(ChainError::StaleIndex {
            expected: blocks.len() as u64,
            got: block.header.index,
        });
    }

    let tip = blocks.last().ok_or(ChainError::StaleTip)?;
    if block.header.previous_hash != tip.block_hash {
        return Err(ChainError::StaleTip);
    }

    Ok(())
}
