// Mining coordinator: assemble template → mine → submit → retry.
//
// Idle until enabled; each mine-next pass drains the mempool by priority,
// builds the coinbase-with-fees, retargets difficulty and hands the
// template to the consensus engine on a blocking thread. A chain event
// arriving mid-search raises the stop flag so the miner never keeps
// grinding a stale template.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::consensus::chain::{Chain, ChainError, ChainEvent};
use crate::consensus::pow::Consensus;
use crate::net::mempool::Mempool;
use crate::primitives::block::{Block, BlockHeader};
use crate::primitives::transaction::{BLOCK_REWARD, Transaction};

const ORPHAN_RETRY_MS: u64 = 100;
const ERROR_RETRY_MS: u64 = 1000;
const IDLE_POLL_MS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinerState {
    Idle,
    Mining,
}

#[derive(Debug, PartialEq, Eq)]
pub enum MineOutcome {
    /// A block was mined and admitted.
    Mined,
    /// The search was interrupted (shutdown or a better block arrived).
    Interrupted,
    /// Submission failed; retry after the given delay.
    Retry(u64),
}

pub struct Miner {
    config: Arc<Config>,
    chain: Arc<Mutex<Chain>>,
    mempool: Arc<Mutex<Mempool>>,
    reward_address: String,
    enabled: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    state: MinerState,
}

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

impl Miner {
    pub fn new(
        config: Arc<Config>,
        chain: Arc<Mutex<Chain>>,
        mempool: Arc<Mutex<Mempool>>,
        reward_address: String,
    ) -> Self {
        let enabled = Arc::new(AtomicBool::new(config.mining_enabled));
        Miner {
            config,
            chain,
            mempool,
            reward_address,
            enabled,
            shutdown: Arc::new(AtomicBool::new(false)),
            state: MinerState::Idle,
        }
    }

    /// Flip to start/stop mining from outside the actor.
    pub fn enabled_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.enabled)
    }

    /// Raise to end the run loop entirely.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn state(&self) -> MinerState {
        self.state
    }

    pub async fn run(mut self) {
        info!(address = %self.reward_address, "miner started");
        while !self.shutdown.load(Ordering::Relaxed) {
            if !self.enabled.load(Ordering::Relaxed) {
                self.state = MinerState::Idle;
                tokio::time::sleep(Duration::from_millis(IDLE_POLL_MS)).await;
                continue;
            }
            match self.mine_once().await {
                MineOutcome::Mined => {}
                MineOutcome::Interrupted => {
                    tokio::time::sleep(Duration::from_millis(ORPHAN_RETRY_MS)).await;
                }
                MineOutcome::Retry(delay_ms) => {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
        info!("miner stopped");
    }

    /// One full template/mine/submit pass.
    pub async fn mine_once(&mut self) -> MineOutcome {
        self.state = MinerState::Mining;

        let (height, head_hash, recent_times, consensus, mut chain_events) = {
            let chain = self.chain.lock().await;
            let (height, head_hash) = chain.head();
            let times = match chain.recent_timestamps() {
                Ok(times) => times,
                Err(err) => {
                    warn!(%err, "could not read recent timestamps");
                    return MineOutcome::Retry(ERROR_RETRY_MS);
                }
            };
            (height, head_hash, times, chain.consensus(), chain.subscribe())
        };

        let txs = self.mempool.lock().await.top(self.config.miner_tx_cap);
        let total_fees: u64 = txs.iter().fold(0u64, |acc, tx| acc.saturating_add(tx.fee));
        let burned = (total_fees as f64 * self.config.burn_fraction) as u64;
        let coinbase = Transaction::coinbase(
            self.config.prefix(),
            self.reward_address.clone(),
            BLOCK_REWARD + (total_fees - burned),
            (now_ms() / 1000) as i64,
            Vec::new(),
        );

        let difficulty =
            if height == 0 { 1 } else { consensus.adjust_difficulty(&recent_times) };

        let mut transactions = vec![coinbase];
        transactions.extend(txs);
        let mut template = Block {
            header: BlockHeader {
                index: height + 1,
                previous_hash: head_hash,
                timestamp: now_ms(),
                merkle_root: [0u8; 32],
                nonce: 0,
                difficulty,
                consensus_data: Default::default(),
            },
            transactions,
            hash: [0u8; 32],
        };
        template.header.merkle_root = template.compute_merkle_root();

        debug!(index = height + 1, difficulty, txs = template.transactions.len(), "mining");

        // CPU-bound search on a blocking thread; the stop flag is raised
        // on shutdown or when the chain moves under us.
        let stop = Arc::new(AtomicBool::new(false));
        let search_stop = Arc::clone(&stop);
        let search_consensus = Arc::clone(&consensus);
        let mut search = tokio::task::spawn_blocking(move || {
            search_consensus.mine_block(&mut template, &search_stop).map(|_| template)
        });

        let mined = loop {
            tokio::select! {
                outcome = &mut search => break outcome,
                event = chain_events.recv() => {
                    match event {
                        Ok(ChainEvent::BlockAdmitted { height: admitted, .. })
                            if admitted >= height + 1 =>
                        {
                            debug!(admitted, "head moved; abandoning template");
                            stop.store(true, Ordering::Relaxed);
                        }
                        _ => {}
                    }
                }
            }
            if self.shutdown.load(Ordering::Relaxed) {
                stop.store(true, Ordering::Relaxed);
            }
        };

        let block = match mined {
            Ok(Some(block)) => block,
            Ok(None) => return MineOutcome::Interrupted,
            Err(err) => {
                warn!(%err, "mining task failed");
                return MineOutcome::Retry(ERROR_RETRY_MS);
            }
        };
        let included: Vec<[u8; 32]> =
            block.transactions.iter().filter(|tx| !tx.is_coinbase()).map(|tx| tx.hash).collect();
        let mined_height = block.header.index;
        let mined_hash = block.hash;

        let result = self.chain.lock().await.add_block(block);
        match result {
            Ok(()) => {
                // The chain event takes care of the broadcast; drop the
                // included transactions from the pool here.
                self.mempool.lock().await.remove(&included);
                info!(height = mined_height, hash = %hex::encode(mined_hash), "mined block");
                MineOutcome::Mined
            }
            Err(ChainError::OrphanAdded { .. }) => MineOutcome::Retry(ORPHAN_RETRY_MS),
            Err(err) if err.is_fatal() => {
                tracing::error!(%err, "storage failure on block submit");
                std::process::exit(1);
            }
            Err(err) => {
                warn!(%err, "mined block rejected");
                MineOutcome::Retry(ERROR_RETRY_MS)
            }
        }
    }
}
