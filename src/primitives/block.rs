// Data Structures: Block
use std::collections::BTreeMap;

use crate::crypto::hash::{hash_blake3, hash_sha256_concat};
use super::transaction::Transaction;

#[derive(Debug, Clone, PartialEq)]
pub struct BlockHeader {
    pub index: u64,
    pub previous_hash: [u8; 32],
    /// Milliseconds since the Unix epoch. Retargeting math is ms-based.
    pub timestamp: u64,
    pub merkle_root: [u8; 32],
    pub nonce: u64,
    pub difficulty: u32,
    /// Opaque consensus annotations; not part of the mining input.
    pub consensus_data: BTreeMap<String, Vec<u8>>,
}

/// Header + ordered transactions + Blake3 hash (SHA-256 for genesis).
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
    pub hash: [u8; 32],
}

/// Pairwise SHA-256 merkle root, duplicating the last element on odd
/// levels. An empty list yields all zeros.
pub fn merkle_root(hashes: &[[u8; 32]]) -> [u8; 32] {
    if hashes.is_empty() {
        return [0u8; 32];
    }

    let mut current_level: Vec<[u8; 32]> = hashes.to_vec();
    while current_level.len() > 1 {
        let mut next_level = Vec::with_capacity(current_level.len().div_ceil(2));
        for chunk in current_level.chunks(2) {
            let right = if chunk.len() == 2 { &chunk[1] } else { &chunk[0] };
            next_level.push(hash_sha256_concat(&chunk[0], right));
        }
        current_level = next_level;
    }
    current_level[0]
}

impl Block {
    pub fn tx_hashes(&self) -> Vec<[u8; 32]> {
        self.transactions.iter().map(|tx| tx.hash).collect()
    }

    pub fn compute_merkle_root(&self) -> [u8; 32] {
        merkle_root(&self.tx_hashes())
    }

    /// Mining input:
    /// u32_be(index) ‖ previous_hash ‖ merkle_root ‖ u64_be(timestamp) ‖
    /// u32_be(difficulty) ‖ canonical transaction bytes. The nonce is not
    /// part of it; the miner appends candidate nonces to this prefix.
    pub fn mining_input(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(80 + self.transactions.len() * 128);
        buf.extend_from_slice(&(self.header.index as u32).to_be_bytes());
        buf.extend_from_slice(&self.header.previous_hash);
        buf.extend_from_slice(&self.header.merkle_root);
        buf.extend_from_slice(&self.header.timestamp.to_be_bytes());
        buf.extend_from_slice(&self.header.difficulty.to_be_bytes());
        for tx in &self.transactions {
            buf.extend_from_slice(&tx.hash_preimage());
        }
        buf
    }

    /// Blake3(mining_input ‖ u64_le(nonce)) — the hash every admitted
    /// non-genesis block must carry.
    pub fn compute_hash(&self) -> [u8; 32] {
        let mut input = self.mining_input();
        input.extend_from_slice(&self.header.nonce.to_le_bytes());
        hash_blake3(&input)
    }

    pub fn seal(&mut self) {
        self.header.merkle_root = self.compute_merkle_root();
        self.hash = self.compute_hash();
    }

    /// The coinbase, when present, is the first transaction.
    pub fn coinbase(&self) -> Option<&Transaction> {
        self.transactions.first().filter(|tx| tx.is_coinbase())
    }

    pub fn total_fees(&self) -> u64 {
        self.transactions
            .iter()
            .filter(|tx| !tx.is_coinbase())
            .fold(0u64, |acc, tx| acc.saturating_add(tx.fee))
    }
}
