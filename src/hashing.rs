//! Deterministic content hashing for transactions and blocks.
//!
//! Every digest is plain SHA-256 over an explicit canonical encoding, so
//! identical inputs always yield identical outputs. The same functions mine
//! a block and re-verify it at append time.

use crate::blockchain::BlockHeader;
use crate::error::Result;
use crate::transaction::Transaction;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// SHA-256 digest kept as raw bytes; hex-encoded at display boundaries.
pub type Sha256Hash = [u8; 32];

/// Sentinel for "no hash": the previous hash of the genesis block and the
/// transactions hash of an empty list.
pub const ZERO_HASH: Sha256Hash = [0u8; 32];

/// Canonical JSON encoding with a stable, sorted field order.
///
/// Round-tripping through `serde_json::Value` stores object members in a
/// `BTreeMap`, so the byte output is independent of struct declaration
/// order.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let canonical = serde_json::to_value(value)?;
    Ok(serde_json::to_vec(&canonical)?)
}

/// Content hash of a single transaction.
pub fn transaction_digest(tx: &Transaction) -> Result<Sha256Hash> {
    let bytes = canonical_json(tx)?;
    Ok(Sha256::digest(&bytes).into())
}

/// Hash of a transaction list: the zero sentinel when empty, otherwise the
/// hash of each transaction's hex digest concatenated in list order.
pub fn transaction_list_digest(transactions: &[Transaction]) -> Result<Sha256Hash> {
    if transactions.is_empty() {
        return Ok(ZERO_HASH);
    }
    let mut hasher = Sha256::new();
    for tx in transactions {
        hasher.update(hex::encode(transaction_digest(tx)?).as_bytes());
    }
    Ok(hasher.finalize().into())
}

/// Block hash: nonce, index, timestamp, previous hash and transactions hash
/// in that fixed order. Integers contribute their decimal form, hashes their
/// lowercase hex form.
pub fn block_digest(nonce: u64, header: &BlockHeader) -> Sha256Hash {
    let mut hasher = Sha256::new();
    hasher.update(nonce.to_string().as_bytes());
    hasher.update(header.index.to_string().as_bytes());
    hasher.update(header.timestamp.to_string().as_bytes());
    hasher.update(hex::encode(header.previous_hash).as_bytes());
    hasher.update(hex::encode(header.transactions_hash).as_bytes());
    hasher.finalize().into()
}

/// Difficulty predicate: the first `zero_prefix` hex characters of the hash
/// must be zero.
pub fn meets_difficulty(hash: &Sha256Hash, zero_prefix: usize) -> bool {
    let zero_prefix = zero_prefix.min(64);
    for i in 0..zero_prefix {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if nibble != 0 {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{CoinbaseTx, Transaction, TransferTx};

    #[test]
    fn difficulty_predicate_counts_nibbles() {
        let mut hash = [0u8; 32];
        assert!(meets_difficulty(&hash, 0));
        assert!(meets_difficulty(&hash, 5));
        assert!(meets_difficulty(&hash, 64));

        hash[0] = 0x0f; // hex "0f..."
        assert!(meets_difficulty(&hash, 1));
        assert!(!meets_difficulty(&hash, 2));

        hash[0] = 0x00;
        hash[1] = 0x10; // hex "0010..."
        assert!(meets_difficulty(&hash, 3));
        assert!(!meets_difficulty(&hash, 4));
    }

    #[test]
    fn empty_transaction_list_hashes_to_the_zero_sentinel() {
        assert_eq!(transaction_list_digest(&[]).unwrap(), ZERO_HASH);
    }

    #[test]
    fn transaction_list_digest_depends_on_order() {
        let a = Transaction::Coinbase(CoinbaseTx::new("A", 250));
        let b = Transaction::Transfer(TransferTx::new("A", "B", 10));

        let forward = transaction_list_digest(&[a.clone(), b.clone()]).unwrap();
        let reverse = transaction_list_digest(&[b, a]).unwrap();
        assert_ne!(forward, reverse);
    }

    #[test]
    fn digests_are_deterministic() {
        let tx = Transaction::Transfer(TransferTx::new("A", "B", 7));
        assert_eq!(
            transaction_digest(&tx).unwrap(),
            transaction_digest(&tx).unwrap()
        );

        let header = BlockHeader {
            index: 3,
            timestamp: 1_700_000_000_000,
            previous_hash: [5u8; 32],
            transactions_hash: [6u8; 32],
        };
        assert_eq!(block_digest(42, &header), block_digest(42, &header));
        assert_ne!(block_digest(42, &header), block_digest(43, &header));
    }
}
