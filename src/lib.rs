//! Single-asset proof-of-work blockchain node with post-quantum account
//! signatures: 2-of-3 threshold over Dilithium2, Falcon-512 and
//! SPHINCS+-SHAKE-128f, Blake3 PoW with Bitcoin-style retargeting,
//! coinbase maturity, and a gossip-based peer protocol.

pub mod config;
pub mod consensus;
pub mod crypto;
pub mod miner;
pub mod net;
pub mod primitives;
pub mod storage;
pub mod wallet;
