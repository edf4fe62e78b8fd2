//! Configuration management for RaceChain

use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub chain: ChainParams,
    #[serde(default)]
    pub sim: SimConfig,
}

/// Protocol constants. Fixed for the lifetime of a chain; the difficulty
/// does not retarget.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ChainParams {
    /// Amount the coinbase transaction credits to the block's miner.
    #[serde(default = "default_reward")]
    pub coinbase_reward: u64,
    /// Required number of leading zero hex characters in a block hash.
    #[serde(default = "default_difficulty")]
    pub difficulty: usize,
}

impl Default for ChainParams {
    fn default() -> Self {
        Self {
            coinbase_reward: default_reward(),
            difficulty: default_difficulty(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimConfig {
    /// Miner identities; one mining thread is spawned per entry, and the
    /// first entry mines the genesis block.
    #[serde(default = "default_miners")]
    pub miners: Vec<String>,
    #[serde(default = "default_report_interval")]
    pub report_interval_secs: u64,
    /// Feed random transfers into the pool while mining runs.
    #[serde(default = "default_transaction_feed")]
    pub transaction_feed: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            miners: default_miners(),
            report_interval_secs: default_report_interval(),
            transaction_feed: default_transaction_feed(),
        }
    }
}

fn default_reward() -> u64 {
    250
}

fn default_difficulty() -> usize {
    5
}

fn default_miners() -> Vec<String> {
    ["A", "B", "C", "D", "E"].map(String::from).to_vec()
}

fn default_report_interval() -> u64 {
    5
}

fn default_transaction_feed() -> bool {
    true
}

pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    let config_str = fs::read_to_string("config.toml").unwrap_or_default();
    let config: Config = if config_str.is_empty() {
        // Sane defaults when config.toml is absent
        Config::default()
    } else {
        toml::from_str(&config_str)?
    };

    // Validate critical values
    if config.chain.difficulty == 0 || config.chain.difficulty > 64 {
        return Err("chain.difficulty must be between 1 and 64 hex characters".into());
    }

    if config.sim.miners.is_empty() {
        return Err("sim.miners must name at least one miner".into());
    }

    Ok(config)
}
