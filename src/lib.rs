//! RaceChain - a single-process proof-of-work blockchain simulation
//!
//! Multiple miner threads race to extend one shared chain: each assembles a
//! candidate block from the pending-transaction pool plus its own coinbase,
//! searches for a nonce meeting the difficulty target, and submits the
//! result for validation and atomic append. Losing a race is routine; the
//! loser rebuilds against the new tip and tries again.
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Chain
//! - [`blockchain`] - Chain store, balance ledger and candidate validation
//! - [`transaction`] - Transaction types
//! - [`mempool`] - Pending-transaction pool
//!
//! ## Consensus & Mining
//! - [`hashing`] - Deterministic content hashing and the difficulty predicate
//! - [`miner`] - Candidate assembly, proof-of-work search, miner agent
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Chain
// ============================================================================
pub mod blockchain;
pub mod mempool;
pub mod transaction;

// ============================================================================
// Consensus & Mining
// ============================================================================
pub mod hashing;
pub mod miner;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;
