//! Pool of unconfirmed transactions awaiting inclusion in a block.

use crate::transaction::Transaction;

/// Ordered pool of pending transactions.
///
/// Producers append at the tail; a successful block append removes the
/// included prefix from the front. Relative order is preserved throughout.
#[derive(Debug, Clone, Default)]
pub struct Mempool {
    transactions: Vec<Transaction>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a transaction for inclusion in a future block.
    pub fn push(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    /// Copy of the pending transactions, oldest first. Mining operates on
    /// this snapshot so no lock is held during proof-of-work.
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.transactions.clone()
    }

    /// Remove the first `count` transactions, those consumed by a committed
    /// block. Capped at the pool length.
    pub fn drain_front(&mut self, count: usize) {
        let count = count.min(self.transactions.len());
        self.transactions.drain(..count);
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
