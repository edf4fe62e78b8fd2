#![forbid(unsafe_code)]
//! Simulation driver: races concurrent miner threads against one shared
//! chain and reports the balance ledger while they run.

use clap::Parser;
use comfy_table::Table;
use crossbeam_channel::{bounded, RecvTimeoutError};
use racechain::blockchain::SharedChain;
use racechain::config::{load_config, Config};
use racechain::miner::{BlockReport, Miner};
use racechain::transaction::TransferTx;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "racechain-sim",
    about = "Race concurrent miners on a shared proof-of-work chain"
)]
struct Args {
    /// Stop once the chain holds this many blocks (genesis included).
    #[arg(long, default_value_t = 20)]
    blocks: u64,

    /// Stop after this much wall-clock time, whichever comes first.
    #[arg(long, value_parser = humantime::parse_duration)]
    duration: Option<Duration>,

    /// Override the configured difficulty (leading zero hex characters).
    #[arg(long)]
    difficulty: Option<usize>,

    /// Override the configured coinbase reward.
    #[arg(long)]
    reward: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut config = load_config()?;
    if let Some(difficulty) = args.difficulty {
        config.chain.difficulty = difficulty;
    }
    if let Some(reward) = args.reward {
        config.chain.coinbase_reward = reward;
    }

    run_simulation(config, args)
}

fn run_simulation(config: Config, args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let miners = config.sim.miners.clone();
    let genesis_miner = miners
        .first()
        .ok_or("sim.miners must name at least one miner")?;

    info!(
        miners = miners.len(),
        difficulty = config.chain.difficulty,
        reward = config.chain.coinbase_reward,
        "starting simulation"
    );

    let chain = SharedChain::new(genesis_miner, config.chain.clone())?;
    let stop = Arc::new(AtomicBool::new(false));
    let (report_tx, report_rx) = bounded::<BlockReport>(64);

    let mut handles = Vec::new();
    for name in &miners {
        let miner = Miner::new(name.clone(), chain.clone(), stop.clone())
            .with_reports(report_tx.clone());
        handles.push(
            thread::Builder::new()
                .name(format!("miner-{name}"))
                .spawn(move || miner.run())?,
        );
    }
    drop(report_tx);

    if config.sim.transaction_feed {
        let chain = chain.clone();
        let stop = stop.clone();
        let accounts = miners.clone();
        handles.push(
            thread::Builder::new()
                .name("producer".into())
                .spawn(move || feed_transactions(chain, stop, accounts))?,
        );
    }

    let started = Instant::now();
    let report_interval = Duration::from_secs(config.sim.report_interval_secs);
    let mut last_report = Instant::now();

    // Consume per-block reports, print the ledger every interval, stop once
    // the block count or wall-clock limit is reached.
    loop {
        match report_rx.recv_timeout(Duration::from_millis(200)) {
            Ok(report) => {
                info!(
                    miner = %report.miner,
                    index = report.index,
                    hash = %hex::encode(report.block_hash),
                    "block committed"
                );
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if last_report.elapsed() >= report_interval {
            print_balances(&chain);
            last_report = Instant::now();
        }

        let out_of_time = args.duration.is_some_and(|d| started.elapsed() >= d);
        if chain.height() >= args.blocks || out_of_time {
            break;
        }
    }

    stop.store(true, Ordering::Relaxed);
    // Dropping the receiver turns any in-flight report send into a no-op, so
    // no miner can block on a full channel while shutting down.
    drop(report_rx);
    for handle in handles {
        let _ = handle.join();
    }

    print_balances(&chain);
    info!(height = chain.height(), "simulation finished");
    Ok(())
}

/// External producer: feeds random transfers into the pool while the miners
/// run, so blocks carry more than their coinbase.
fn feed_transactions(chain: SharedChain, stop: Arc<AtomicBool>, accounts: Vec<String>) {
    let mut rng = rand::thread_rng();
    while !stop.load(Ordering::Relaxed) {
        let sender = accounts[rng.gen_range(0..accounts.len())].clone();
        let receiver = accounts[rng.gen_range(0..accounts.len())].clone();
        let amount = rng.gen_range(1..=50);
        chain.submit_transaction(TransferTx::new(sender, receiver, amount));
        thread::sleep(Duration::from_millis(500));
    }
}

fn print_balances(chain: &SharedChain) {
    let mut balances: Vec<_> = chain.balances().into_iter().collect();
    balances.sort();

    let mut table = Table::new();
    table.set_header(["account", "balance"]);
    for (account, balance) in balances {
        table.add_row([account, balance.to_string()]);
    }
    println!("{table}");
}
