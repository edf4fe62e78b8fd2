//! End-to-end properties of the shared chain under concurrent mining.

use racechain::blockchain::SharedChain;
use racechain::config::ChainParams;
use racechain::hashing::{self, meets_difficulty, ZERO_HASH};
use racechain::miner::{build_candidate, mine_block, Miner};
use racechain::transaction::{Transaction, TransferTx};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// Low difficulty keeps proof-of-work fast in the test profile; the predicate
// itself is covered by unit tests.
fn test_params() -> ChainParams {
    ChainParams {
        coinbase_reward: 250,
        difficulty: 2,
    }
}

#[test]
fn concurrent_miners_extend_a_single_consistent_chain() {
    let chain = SharedChain::new("A", test_params()).unwrap();
    let stop = Arc::new(AtomicBool::new(false));

    let mut handles = Vec::new();
    for name in ["A", "B", "C", "D"] {
        let miner = Miner::new(name, chain.clone(), stop.clone());
        handles.push(thread::spawn(move || miner.run()));
    }

    while chain.height() < 12 {
        thread::sleep(Duration::from_millis(5));
    }
    stop.store(true, Ordering::Relaxed);
    for handle in handles {
        handle.join().unwrap();
    }

    let blocks = chain.blocks();
    assert!(blocks.len() >= 12);

    // Genesis invariant.
    assert_eq!(blocks[0].header.index, 0);
    assert_eq!(blocks[0].header.previous_hash, ZERO_HASH);

    // Hash links, indices, difficulty and recomputable hashes.
    for (i, block) in blocks.iter().enumerate() {
        assert_eq!(block.header.index, i as u64);
        assert!(meets_difficulty(&block.block_hash, 2));
        assert_eq!(block.recompute_hash(), block.block_hash);
        assert_eq!(
            hashing::transaction_list_digest(&block.transactions).unwrap(),
            block.header.transactions_hash
        );
        if i > 0 {
            assert_eq!(block.header.previous_hash, blocks[i - 1].block_hash);
        }
    }

    // Only coinbase amounts settle, so the ledger total equals one reward
    // per committed block.
    let total: u64 = chain.balances().values().sum();
    assert_eq!(total, blocks.len() as u64 * 250);
}

#[test]
fn exactly_one_candidate_wins_an_index_race() {
    let chain = SharedChain::new("A", test_params()).unwrap();
    let never_stop = AtomicBool::new(false);

    // Two miners finish proof-of-work for the same next index.
    let job = chain.mining_job();
    let (a, consumed_a) = build_candidate(&job, "A").unwrap();
    let (b, consumed_b) = build_candidate(&job, "B").unwrap();
    let a = mine_block(a, job.difficulty, &never_stop).unwrap();
    let b = mine_block(b, job.difficulty, &never_stop).unwrap();

    let results = [chain.append(a, consumed_a), chain.append(b, consumed_b)];
    let wins = results.iter().filter(|r| r.is_ok()).count();
    let stale = results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .filter(|e| e.is_stale())
        .count();

    assert_eq!(wins, 1);
    assert_eq!(stale, 1);
    assert_eq!(chain.height(), 2);
}

#[test]
fn concurrent_appends_of_rival_candidates_commit_exactly_one() {
    let chain = SharedChain::new("A", test_params()).unwrap();
    let never_stop = AtomicBool::new(false);
    let job = chain.mining_job();

    let mut rivals = Vec::new();
    for name in ["A", "B", "C"] {
        let (candidate, consumed) = build_candidate(&job, name).unwrap();
        rivals.push((
            mine_block(candidate, job.difficulty, &never_stop).unwrap(),
            consumed,
        ));
    }

    let mut handles = Vec::new();
    for (block, consumed) in rivals {
        let chain = chain.clone();
        handles.push(thread::spawn(move || chain.append(block, consumed)));
    }
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(chain.height(), 2);
}

#[test]
fn append_drains_exactly_the_included_pool_prefix() {
    let chain = SharedChain::new("A", test_params()).unwrap();
    let never_stop = AtomicBool::new(false);

    chain.submit_transaction(TransferTx::new("A", "B", 10));
    chain.submit_transaction(TransferTx::new("B", "C", 20));

    let job = chain.mining_job();
    assert_eq!(job.pooled.len(), 2);

    // A producer appends while the candidate is being mined.
    let landing = chain.submit_transaction(TransferTx::new("C", "D", 30));
    assert_eq!(landing, 1);

    let (candidate, consumed) = build_candidate(&job, "B").unwrap();
    let block = mine_block(candidate, job.difficulty, &never_stop).unwrap();
    chain.append(block, consumed).unwrap();

    // The two snapshotted transfers are gone; the late one survives in
    // order.
    let pending = chain.pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(
        pending[0],
        Transaction::Transfer(TransferTx::new("C", "D", 30))
    );
}

#[test]
fn miner_coinbase_rewards_accumulate_per_committed_block() {
    let chain = SharedChain::new("A", test_params()).unwrap();
    let stop = Arc::new(AtomicBool::new(false));
    let miner = Miner::new("B", chain.clone(), stop);

    for expected_height in 2..=4 {
        miner.mine_once().unwrap();
        assert_eq!(chain.height(), expected_height);
    }

    // Genesis went to "A"; the three mined blocks to "B".
    let balances = chain.balances();
    assert_eq!(balances.get("A"), Some(&250));
    assert_eq!(balances.get("B"), Some(&750));
}
