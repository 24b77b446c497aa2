pub mod miner;

pub use miner::{MineOutcome, Miner, MinerState};
