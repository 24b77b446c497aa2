// Proof-of-work: target derivation, nonce search, clamped retargeting.
//
// The candidate hash is Blake3 over the block's mining input with the
// nonce appended little-endian; a block wins when the hash, read as a
// big-endian 256-bit integer, is at or below the difficulty target.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use primitive_types::U256;

use crate::crypto::hash::hash_blake3;
use crate::primitives::block::Block;

pub const DEFAULT_RETARGET_WINDOW: u64 = 10;
pub const DEFAULT_TARGET_BLOCK_TIME_MS: u64 = 10_000;

/// Mean inter-block gap is clamped to at least this before dividing, to
/// avoid instability from clustered timestamps.
const MIN_ACTUAL_GAP_MS: f64 = 1000.0;
const RATIO_FLOOR: f64 = 0.25;
const RATIO_CEIL: f64 = 4.0;

/// Nonces hashed between stop-flag checks.
const NONCE_BATCH: u64 = 65_536;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConsensusError {
    #[error("candidate hash above target at difficulty {difficulty}")]
    InsufficientDifficulty { difficulty: u32 },
    #[error("stored hash does not match proof-of-work recomputation")]
    PowHashMismatch,
}

/// Which maximum-target table the node runs with. Production is the
/// mainnet numerator; Testing makes low difficulties mine instantly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxTarget {
    Production,
    Testing,
}

impl MaxTarget {
    /// Numerator divided by the difficulty to produce the target.
    pub fn numerator(self) -> U256 {
        match self {
            // 0x0000_000F_FFFF followed by 26 zero bytes.
            MaxTarget::Production => U256::from(0x000F_FFFFu64) << 208,
            // 0x00FF…FF
            MaxTarget::Testing => U256::MAX >> 8,
        }
    }
}

/// difficulty 0 accepts any hash; only the genesis block carries it.
pub fn target_for(mode: MaxTarget, difficulty: u32) -> U256 {
    if difficulty == 0 { U256::MAX } else { mode.numerator() / difficulty }
}

/// Bitcoin-style retarget with the adjustment ratio clamped to
/// [0.25, 4.0]. Fewer than two samples keeps the current difficulty.
pub fn retarget(current: u32, recent_times_ms: &[u64], target_time_ms: u64) -> u32 {
    if recent_times_ms.len() < 2 {
        return current;
    }
    let gaps: Vec<u64> = recent_times_ms
        .windows(2)
        .map(|pair| pair[1].saturating_sub(pair[0]))
        .collect();
    let actual = (gaps.iter().sum::<u64>() as f64 / gaps.len() as f64).max(MIN_ACTUAL_GAP_MS);
    let ratio = (target_time_ms as f64 / actual).clamp(RATIO_FLOOR, RATIO_CEIL);
    (((current as f64) * ratio).round() as u32).max(1)
}

#[derive(Debug, Clone)]
pub struct ConsensusInfo {
    pub name: &'static str,
    pub difficulty: u32,
    pub target_time_ms: u64,
}

/// The consensus seam. A single proof-of-work implementation exists; the
/// trait keeps the chain engine indifferent to it.
pub trait Consensus: Send + Sync {
    /// Adopt the difficulty persisted at the current head.
    fn init(&self, difficulty: u32);
    /// Search nonces until the target is met or `stop` is raised. On
    /// success the block's nonce and hash are filled in.
    fn mine_block(&self, block: &mut Block, stop: &AtomicBool) -> Option<[u8; 32]>;
    fn validate_block(&self, block: &Block) -> Result<(), ConsensusError>;
    fn get_difficulty(&self) -> u32;
    /// Retarget from the given header timestamps; stores and returns the
    /// new difficulty.
    fn adjust_difficulty(&self, recent_times_ms: &[u64]) -> u32;
    fn info(&self) -> ConsensusInfo;
}

pub struct ProofOfWork {
    mode: MaxTarget,
    difficulty: AtomicU32,
    target_time_ms: u64,
}

impl ProofOfWork {
    pub fn new(mode: MaxTarget, target_time_ms: u64) -> Self {
        ProofOfWork { mode, difficulty: AtomicU32::new(1), target_time_ms }
    }

    fn candidate(mining_input: &[u8], nonce: u64) -> [u8; 32] {
        let mut input = Vec::with_capacity(mining_input.len() + 8);
        input.extend_from_slice(mining_input);
        input.extend_from_slice(&nonce.to_le_bytes());
        hash_blake3(&input)
    }
}

impl Consensus for ProofOfWork {
    fn init(&self, difficulty: u32) {
        self.difficulty.store(difficulty.max(1), Ordering::SeqCst);
    }

    fn mine_block(&self, block: &mut Block, stop: &AtomicBool) -> Option<[u8; 32]> {
        let target = target_for(self.mode, block.header.difficulty);
        let input = block.mining_input();

        let mut nonce: u64 = 0;
        loop {
            if stop.load(Ordering::Relaxed) {
                return None;
            }
            for _ in 0..NONCE_BATCH {
                let candidate = Self::candidate(&input, nonce);
                if U256::from_big_endian(&candidate) <= target {
                    block.header.nonce = nonce;
                    block.hash = candidate;
                    return Some(candidate);
                }
                nonce = nonce.wrapping_add(1);
            }
        }
    }

    fn validate_block(&self, block: &Block) -> Result<(), ConsensusError> {
        // difficulty 0 passes trivially; the chain engine only ever lets
        // the genesis block through with it.
        if block.header.difficulty == 0 {
            return Ok(());
        }
        let candidate = Self::candidate(&block.mining_input(), block.header.nonce);
        if candidate != block.hash {
            return Err(ConsensusError::PowHashMismatch);
        }
        if U256::from_big_endian(&candidate) > target_for(self.mode, block.header.difficulty) {
            return Err(ConsensusError::InsufficientDifficulty {
                difficulty: block.header.difficulty,
            });
        }
        Ok(())
    }

    fn get_difficulty(&self) -> u32 {
        self.difficulty.load(Ordering::SeqCst)
    }

    fn adjust_difficulty(&self, recent_times_ms: &[u64]) -> u32 {
        let current = self.get_difficulty();
        let next = retarget(current, recent_times_ms, self.target_time_ms);
        self.difficulty.store(next, Ordering::SeqCst);
        next
    }

    fn info(&self) -> ConsensusInfo {
        ConsensusInfo {
            name: "proof-of-work",
            difficulty: self.get_difficulty(),
            target_time_ms: self.target_time_ms,
        }
    }
}
