use std::sync::Arc;

use colored::*;
use tokio::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bastille::config::Config;
use bastille::consensus::chain::Chain;
use bastille::consensus::pow::{Consensus, ProofOfWork};
use bastille::miner::Miner;
use bastille::net::mempool::Mempool;
use bastille::net::node::P2pNode;
use bastille::storage::ChainStore;
use bastille::wallet::Wallet;
use bastille::wallet::keystore::WALLET_FILE;

fn banner() {
    println!("{}", " ██████╗  █████╗ ███████╗████████╗██╗██╗     ██╗     ███████╗".bright_blue());
    println!("{}", " ██╔══██╗██╔══██╗██╔════╝╚══██╔══╝██║██║     ██║     ██╔════╝".bright_blue());
    println!("{}", " ██████╔╝███████║███████╗   ██║   ██║██║     ██║     █████╗  ".bright_white().bold());
    println!("{}", " ██╔══██╗██╔══██║╚════██║   ██║   ██║██║     ██║     ██╔══╝  ".bright_white().bold());
    println!("{}", " ██████╔╝██║  ██║███████║   ██║   ██║███████╗███████╗███████╗".bright_red());
    println!("{}", " ╚═════╝ ╚═╝  ╚═╝╚══════╝   ╚═╝   ╚═╝╚══════╝╚══════╝╚══════╝".bright_red());
    println!();
    println!("{}", "        Post-Quantum Electronic Cash — Liberté, Égalité, Fraternité".bright_green());
    println!();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    banner();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(Config::from_env());
    info!(network = config.network.name(), port = config.p2p_port, "starting bastilled");

    std::fs::create_dir_all(&config.data_dir)?;
    let wallet = Wallet::load_or_create(config.data_dir.join(WALLET_FILE), config.prefix())?;
    info!(address = %wallet.address, "wallet ready");

    let store = ChainStore::open(&config.data_dir.join("chain"))?;
    let consensus: Arc<dyn Consensus> = Arc::new(ProofOfWork::new(
        config.network.max_target(),
        config.target_block_time_ms,
    ));
    let chain = match Chain::open(Arc::clone(&config), store, consensus) {
        Ok(chain) => Arc::new(Mutex::new(chain)),
        Err(err) => {
            error!(%err, "chain failed to open");
            std::process::exit(1);
        }
    };
    let mempool = Arc::new(Mutex::new(Mempool::from_config(&config)));

    let node = P2pNode::new(Arc::clone(&config), Arc::clone(&chain), Arc::clone(&mempool));
    tokio::spawn(async move {
        if let Err(err) = node.run().await {
            error!(%err, "p2p node terminated");
            std::process::exit(1);
        }
    });

    let miner = Miner::new(
        Arc::clone(&config),
        Arc::clone(&chain),
        Arc::clone(&mempool),
        wallet.address.clone(),
    );
    if config.mining_enabled {
        info!("mining enabled");
    }
    let miner_shutdown = miner.shutdown_handle();
    tokio::spawn(miner.run());

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    miner_shutdown.store(true, std::sync::atomic::Ordering::Relaxed);
    Ok(())
}
