use crate::config::ChainParams;
use crate::error::Result;
use crate::hashing::{self, Sha256Hash, ZERO_HASH};
use crate::mempool::Mempool;
use crate::miner::{build_candidate, mine_block, MiningJob};
use crate::transaction::{Account, Transaction, TransferTx};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

use super::state::Ledger;
use super::validation::validate_candidate;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BlockHeader {
    pub index: u64,
    /// Unix timestamp in milliseconds at candidate assembly time.
    pub timestamp: u64,
    pub previous_hash: Sha256Hash,
    pub transactions_hash: Sha256Hash,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Block {
    pub block_hash: Sha256Hash,
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
    pub nonce: u64,
}

impl Block {
    /// Recompute this block's hash from its own header and nonce. Must match
    /// the stored `block_hash` for every committed block.
    pub fn recompute_hash(&self) -> Sha256Hash {
        hashing::block_digest(self.nonce, &self.header)
    }

    pub fn hash_str(&self) -> String {
        hex::encode(self.block_hash)
    }
}

/// The shared chain aggregate: committed blocks, the pending-transaction
/// pool and the derived balance ledger. All three mutate together; nothing
/// here takes a lock itself — `SharedChain` provides the mutual exclusion.
pub struct Blockchain {
    pub blocks: Vec<Block>,
    pub mempool: Mempool,
    pub ledger: Ledger,
    pub params: ChainParams,
}

impl Blockchain {
    /// Create a chain with a freshly mined genesis block credited to
    /// `genesis_miner`. The proof-of-work search runs synchronously, so the
    /// chain is fully formed before any concurrent mining begins.
    pub fn new(genesis_miner: &str, params: ChainParams) -> Result<Self> {
        let mut chain = Blockchain {
            blocks: Vec::new(),
            mempool: Mempool::new(),
            ledger: Ledger::new(),
            params,
        };

        let job = chain.mining_job();
        let (candidate, consumed) = build_candidate(&job, genesis_miner)?;
        let never_stop = AtomicBool::new(false);
        let genesis = mine_block(candidate, job.difficulty, &never_stop)?;
        chain.apply_block(genesis, consumed)?;

        info!(miner = genesis_miner, "mined the genesis block");
        Ok(chain)
    }

    /// Snapshot of everything a miner needs to assemble a candidate for the
    /// next index. Mining then runs on the snapshot without touching the
    /// chain.
    pub fn mining_job(&self) -> MiningJob {
        MiningJob {
            next_index: self.blocks.len() as u64,
            previous_hash: self.previous_hash(),
            pooled: self.mempool.snapshot(),
            reward: self.params.coinbase_reward,
            difficulty: self.params.difficulty,
        }
    }

    fn previous_hash(&self) -> Sha256Hash {
        self.blocks.last().map_or(ZERO_HASH, |b| b.block_hash)
    }

    /// Validate `block` against the current tip and, if it holds, commit it:
    /// drain the consumed pool prefix, update the ledger and append the
    /// block. Validation precedes every mutation, so a rejected candidate
    /// leaves no trace.
    pub fn apply_block(&mut self, block: Block, consumed: usize) -> Result<()> {
        validate_candidate(&self.blocks, &block, self.params.difficulty)?;

        self.mempool.drain_front(consumed);
        self.ledger.apply_block(&block);
        self.blocks.push(block);
        Ok(())
    }

    pub fn height(&self) -> u64 {
        self.blocks.len() as u64
    }
}

/// Cloneable handle to the one shared chain.
///
/// The inner mutex is the single mutual-exclusion point of the system:
/// `append` holds it for validate+mutate as one atomic unit, every other
/// method only long enough to copy a snapshot. Proof-of-work never runs
/// under it.
#[derive(Clone)]
pub struct SharedChain {
    inner: Arc<Mutex<Blockchain>>,
}

impl SharedChain {
    pub fn new(genesis_miner: &str, params: ChainParams) -> Result<Self> {
        let chain = Blockchain::new(genesis_miner, params)?;
        Ok(SharedChain {
            inner: Arc::new(Mutex::new(chain)),
        })
    }

    /// Snapshot for candidate assembly, taken in one lock acquisition.
    pub fn mining_job(&self) -> MiningJob {
        self.inner.lock().mining_job()
    }

    /// Submit a mined candidate: the atomic critical section. Returns the
    /// typed rejection on failure; stale candidates
    /// (`ChainError::is_stale`) are the expected outcome of losing a mining
    /// race and are recovered by retrying against the new tip.
    pub fn append(&self, block: Block, consumed: usize) -> Result<()> {
        self.inner.lock().apply_block(block, consumed)
    }

    /// Queue a transfer for inclusion. Returns the index of the block it is
    /// expected to land in.
    pub fn submit_transaction(&self, tx: TransferTx) -> u64 {
        let mut chain = self.inner.lock();
        chain.mempool.push(Transaction::Transfer(tx));
        chain.blocks.len() as u64
    }

    /// Immutable snapshot of the balance ledger for display. The lock is
    /// held only for the copy.
    pub fn balances(&self) -> HashMap<Account, u64> {
        self.inner.lock().ledger.snapshot()
    }

    pub fn height(&self) -> u64 {
        self.inner.lock().height()
    }

    pub fn tip_hash(&self) -> Sha256Hash {
        self.inner.lock().previous_hash()
    }

    /// Copy of the committed blocks, for observers and tests.
    pub fn blocks(&self) -> Vec<Block> {
        self.inner.lock().blocks.clone()
    }

    /// Copy of the pending transactions.
    pub fn pending(&self) -> Vec<Transaction> {
        self.inner.lock().mempool.snapshot()
    }
}
