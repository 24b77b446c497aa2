// Genesis block definition
//
// The genesis block is fully deterministic for a given address prefix: a
// fixed timestamp and nonce, difficulty 0 (it carries no proof-of-work)
// and a single coinbase minting one block reward to the
// "<prefix>Revolution" sentinel. Its hash is SHA-256, not Blake3; every
// later block is hashed by the mining path.

use std::collections::BTreeMap;

use crate::crypto::hash::hash_sha256;
use crate::primitives::block::{Block, BlockHeader};
use crate::primitives::transaction::{BLOCK_REWARD, Transaction};

/// 2025-07-14T00:00:00Z, in milliseconds.
pub const GENESIS_TIMESTAMP_MS: u64 = 1_752_451_200_000;
pub const GENESIS_NONCE: u64 = 1789;
pub const GENESIS_DATA: &str = "Liberté, Égalité, Fraternité";

/// SHA-256 over the mining-input serialization with the nonce appended
/// big-endian. Only the genesis block is hashed this way.
pub fn genesis_hash(block: &Block) -> [u8; 32] {
    let mut input = block.mining_input();
    input.extend_from_slice(&block.header.nonce.to_be_bytes());
    hash_sha256(&input)
}

pub fn genesis_block(prefix: &str) -> Block {
    let coinbase = Transaction::coinbase(
        prefix,
        format!("{prefix}Revolution"),
        BLOCK_REWARD,
        (GENESIS_TIMESTAMP_MS / 1000) as i64,
        GENESIS_DATA.as_bytes().to_vec(),
    );

    let mut block = Block {
        header: BlockHeader {
            index: 0,
            previous_hash: [0u8; 32],
            timestamp: GENESIS_TIMESTAMP_MS,
            merkle_root: [0u8; 32],
            nonce: GENESIS_NONCE,
            difficulty: 0,
            consensus_data: BTreeMap::new(),
        },
        transactions: vec![coinbase],
        hash: [0u8; 32],
    };
    block.header.merkle_root = block.compute_merkle_root();
    block.hash = genesis_hash(&block);
    block
}
