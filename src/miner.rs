//! Candidate assembly, proof-of-work search and the miner agent.

use crate::blockchain::{Block, BlockHeader, SharedChain};
use crate::error::{ChainError, Result};
use crate::hashing::{self, Sha256Hash, ZERO_HASH};
use crate::transaction::{Account, CoinbaseTx, Transaction};
use crossbeam_channel::Sender;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything needed to assemble and mine a candidate for the next index,
/// snapshotted from the chain in one lock acquisition.
#[derive(Debug, Clone)]
pub struct MiningJob {
    pub next_index: u64,
    pub previous_hash: Sha256Hash,
    pub pooled: Vec<Transaction>,
    pub reward: u64,
    pub difficulty: usize,
}

/// Assemble an unmined candidate block: the miner's coinbase first, then the
/// pooled snapshot. Returns the block (nonce and hash still zero) and the
/// number of pooled transactions it consumed.
pub fn build_candidate(job: &MiningJob, miner: &str) -> Result<(Block, usize)> {
    let mut transactions = Vec::with_capacity(job.pooled.len() + 1);
    transactions.push(Transaction::Coinbase(CoinbaseTx::new(miner, job.reward)));
    transactions.extend(job.pooled.iter().cloned());
    let consumed = job.pooled.len();

    let header = BlockHeader {
        index: job.next_index,
        timestamp: chrono::Utc::now().timestamp_millis() as u64,
        previous_hash: job.previous_hash,
        transactions_hash: hashing::transaction_list_digest(&transactions)?,
    };

    let block = Block {
        block_hash: ZERO_HASH,
        header,
        transactions,
        nonce: 0,
    };
    Ok((block, consumed))
}

/// Proof-of-work search: increment the nonce from zero until the block hash
/// meets the difficulty. Polls `stop` every iteration so shutdown never
/// waits on an unbounded loop; the result is deterministic for a given
/// header when uninterrupted.
pub fn search_nonce(header: &BlockHeader, difficulty: usize, stop: &AtomicBool) -> Option<u64> {
    let mut nonce: u64 = 0;
    loop {
        if stop.load(Ordering::Relaxed) {
            return None;
        }
        let hash = hashing::block_digest(nonce, header);
        if hashing::meets_difficulty(&hash, difficulty) {
            return Some(nonce);
        }
        nonce = nonce.wrapping_add(1);
    }
}

/// Run the proof-of-work search and stamp the winning nonce and hash onto
/// the block.
pub fn mine_block(mut block: Block, difficulty: usize, stop: &AtomicBool) -> Result<Block> {
    let nonce = search_nonce(&block.header, difficulty, stop).ok_or(ChainError::Interrupted)?;
    block.nonce = nonce;
    block.block_hash = hashing::block_digest(nonce, &block.header);
    Ok(block)
}

/// Emitted after every block a miner lands on the chain, carrying the
/// balance snapshot taken right after the commit.
#[derive(Debug, Clone)]
pub struct BlockReport {
    pub miner: Account,
    pub index: u64,
    pub block_hash: Sha256Hash,
    pub balances: HashMap<Account, u64>,
}

/// A mining agent bound to one identity.
///
/// Repeatedly snapshots the chain tip, assembles and mines a candidate, and
/// submits it; a lost race is retried immediately against the new tip with
/// no backoff — contention is resolved entirely by the atomic append.
pub struct Miner {
    name: Account,
    chain: SharedChain,
    stop: Arc<AtomicBool>,
    reports: Option<Sender<BlockReport>>,
}

impl Miner {
    pub fn new(name: impl Into<Account>, chain: SharedChain, stop: Arc<AtomicBool>) -> Self {
        Miner {
            name: name.into(),
            chain,
            stop,
            reports: None,
        }
    }

    /// Send a `BlockReport` after every successful append.
    pub fn with_reports(mut self, reports: Sender<BlockReport>) -> Self {
        self.reports = Some(reports);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// One full cycle: snapshot, build, mine, submit. Returns the committed
    /// block on success.
    pub fn mine_once(&self) -> Result<Block> {
        let job = self.chain.mining_job();
        let (candidate, consumed) = build_candidate(&job, &self.name)?;
        let block = mine_block(candidate, job.difficulty, &self.stop)?;
        self.chain.append(block.clone(), consumed)?;
        Ok(block)
    }

    /// Mine until the stop flag is set. Stale rejections are the designed
    /// outcome of concurrent mining and only logged at debug level.
    pub fn run(&self) {
        while !self.stop.load(Ordering::Relaxed) {
            match self.mine_once() {
                Ok(block) => {
                    info!(
                        miner = %self.name,
                        index = block.header.index,
                        hash = %block.hash_str(),
                        "block committed"
                    );
                    if let Some(reports) = &self.reports {
                        let report = BlockReport {
                            miner: self.name.clone(),
                            index: block.header.index,
                            block_hash: block.block_hash,
                            balances: self.chain.balances(),
                        };
                        // A closed channel just means nobody is listening
                        // anymore.
                        let _ = reports.send(report);
                    }
                }
                Err(ChainError::Interrupted) => break,
                Err(err) if err.is_stale() => {
                    debug!(miner = %self.name, %err, "candidate went stale, rebuilding against new tip");
                }
                Err(err) => {
                    warn!(miner = %self.name, %err, "candidate rejected");
                }
            }
        }
    }
}
