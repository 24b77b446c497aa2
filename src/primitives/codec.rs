// Canonical binary codec for blocks and transactions.
//
// The protobuf encoding here is used both on the wire (inside Envelope
// frames) and in the block store, so a block received from a peer can be
// persisted byte-for-byte without re-serialization.

use std::collections::BTreeMap;

use prost::Message;

use crate::crypto::keys::{PublicKeyTriple, ThresholdSignature};
use crate::primitives::block::{Block, BlockHeader};
use crate::primitives::transaction::{SignatureType, Transaction};

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("protobuf decode failed: {0}")]
    Decode(#[from] prost::DecodeError),
    #[error("malformed payload: {0}")]
    Malformed(&'static str),
}

const SIG_TYPE_REGULAR: u32 = 0;
const SIG_TYPE_COINBASE: u32 = 1;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WirePublicKeys {
    #[prost(bytes = "vec", tag = "1")]
    pub dilithium: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub falcon: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub sphincs: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireSignature {
    #[prost(bytes = "vec", tag = "1")]
    pub dilithium: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub falcon: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub sphincs: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireTransaction {
    #[prost(string, tag = "1")]
    pub from: String,
    #[prost(string, tag = "2")]
    pub to: String,
    #[prost(uint64, tag = "3")]
    pub amount: u64,
    #[prost(uint64, tag = "4")]
    pub fee: u64,
    #[prost(uint64, tag = "5")]
    pub nonce: u64,
    #[prost(int64, tag = "6")]
    pub timestamp: i64,
    #[prost(bytes = "vec", tag = "7")]
    pub data: Vec<u8>,
    #[prost(uint32, tag = "8")]
    pub signature_type: u32,
    #[prost(message, optional, tag = "9")]
    pub signature: Option<WireSignature>,
    #[prost(message, optional, tag = "10")]
    pub public_keys: Option<WirePublicKeys>,
    #[prost(bytes = "vec", tag = "11")]
    pub hash: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireBlockHeader {
    #[prost(uint64, tag = "1")]
    pub index: u64,
    #[prost(bytes = "vec", tag = "2")]
    pub previous_hash: Vec<u8>,
    #[prost(uint64, tag = "3")]
    pub timestamp: u64,
    #[prost(bytes = "vec", tag = "4")]
    pub merkle_root: Vec<u8>,
    #[prost(uint64, tag = "5")]
    pub nonce: u64,
    #[prost(uint32, tag = "6")]
    pub difficulty: u32,
    #[prost(btree_map = "string, bytes", tag = "7")]
    pub consensus_data: BTreeMap<String, Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireBlock {
    #[prost(message, optional, tag = "1")]
    pub header: Option<WireBlockHeader>,
    #[prost(message, repeated, tag = "2")]
    pub transactions: Vec<WireTransaction>,
    #[prost(bytes = "vec", tag = "3")]
    pub hash: Vec<u8>,
}

/// Where an indexed transaction lives: `tx:<hex hash>` values.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxLocation {
    #[prost(string, tag = "1")]
    pub partition: String,
    #[prost(bytes = "vec", tag = "2")]
    pub block_hash: Vec<u8>,
    #[prost(uint32, tag = "3")]
    pub index: u32,
}

fn hash32(bytes: &[u8]) -> Result<[u8; 32], CodecError> {
    bytes.try_into().map_err(|_| CodecError::Malformed("hash must be 32 bytes"))
}

impl From<&Transaction> for WireTransaction {
    fn from(tx: &Transaction) -> Self {
        WireTransaction {
            from: tx.from.clone(),
            to: tx.to.clone(),
            amount: tx.amount,
            fee: tx.fee,
            nonce: tx.nonce,
            timestamp: tx.timestamp,
            data: tx.data.clone(),
            signature_type: match tx.signature_type {
                SignatureType::Regular => SIG_TYPE_REGULAR,
                SignatureType::Coinbase => SIG_TYPE_COINBASE,
            },
            signature: tx.signature.as_ref().map(|s| WireSignature {
                dilithium: s.dilithium.clone(),
                falcon: s.falcon.clone(),
                sphincs: s.sphincs.clone(),
            }),
            public_keys: tx.public_keys.as_ref().map(|k| WirePublicKeys {
                dilithium: k.dilithium.0.to_vec(),
                falcon: k.falcon.0.to_vec(),
                sphincs: k.sphincs.0.to_vec(),
            }),
            hash: tx.hash.to_vec(),
        }
    }
}

impl TryFrom<WireTransaction> for Transaction {
    type Error = CodecError;

    fn try_from(w: WireTransaction) -> Result<Self, Self::Error> {
        let signature_type = match w.signature_type {
            SIG_TYPE_REGULAR => SignatureType::Regular,
            SIG_TYPE_COINBASE => SignatureType::Coinbase,
            _ => return Err(CodecError::Malformed("unknown signature type")),
        };
        let public_keys = match w.public_keys {
            Some(k) => Some(
                PublicKeyTriple::from_bytes(&k.dilithium, &k.falcon, &k.sphincs)
                    .map_err(CodecError::Malformed)?,
            ),
            None => None,
        };
        Ok(Transaction {
            from: w.from,
            to: w.to,
            amount: w.amount,
            fee: w.fee,
            nonce: w.nonce,
            timestamp: w.timestamp,
            data: w.data,
            signature_type,
            signature: w.signature.map(|s| ThresholdSignature {
                dilithium: s.dilithium,
                falcon: s.falcon,
                sphincs: s.sphincs,
            }),
            public_keys,
            hash: hash32(&w.hash)?,
        })
    }
}

impl From<&Block> for WireBlock {
    fn from(block: &Block) -> Self {
        WireBlock {
            header: Some(WireBlockHeader {
                index: block.header.index,
                previous_hash: block.header.previous_hash.to_vec(),
                timestamp: block.header.timestamp,
                merkle_root: block.header.merkle_root.to_vec(),
                nonce: block.header.nonce,
                difficulty: block.header.difficulty,
                consensus_data: block.header.consensus_data.clone(),
            }),
            transactions: block.transactions.iter().map(WireTransaction::from).collect(),
            hash: block.hash.to_vec(),
        }
    }
}

impl TryFrom<WireBlock> for Block {
    type Error = CodecError;

    fn try_from(w: WireBlock) -> Result<Self, Self::Error> {
        let header = w.header.ok_or(CodecError::Malformed("missing block header"))?;
        Ok(Block {
            header: BlockHeader {
                index: header.index,
                previous_hash: hash32(&header.previous_hash)?,
                timestamp: header.timestamp,
                merkle_root: hash32(&header.merkle_root)?,
                nonce: header.nonce,
                difficulty: header.difficulty,
                consensus_data: header.consensus_data,
            },
            transactions: w
                .transactions
                .into_iter()
                .map(Transaction::try_from)
                .collect::<Result<_, _>>()?,
            hash: hash32(&w.hash)?,
        })
    }
}

pub fn encode_transaction(tx: &Transaction) -> Vec<u8> {
    WireTransaction::from(tx).encode_to_vec()
}

pub fn decode_transaction(bytes: &[u8]) -> Result<Transaction, CodecError> {
    Transaction::try_from(WireTransaction::decode(bytes)?)
}

pub fn encode_block(block: &Block) -> Vec<u8> {
    WireBlock::from(block).encode_to_vec()
}

pub fn decode_block(bytes: &[u8]) -> Result<Block, CodecError> {
    Block::try_from(WireBlock::decode(bytes)?)
}

pub fn encode_public_keys(keys: &PublicKeyTriple) -> Vec<u8> {
    WirePublicKeys {
        dilithium: keys.dilithium.0.to_vec(),
        falcon: keys.falcon.0.to_vec(),
        sphincs: keys.sphincs.0.to_vec(),
    }
    .encode_to_vec()
}

pub fn decode_public_keys(bytes: &[u8]) -> Result<PublicKeyTriple, CodecError> {
    let w = WirePublicKeys::decode(bytes)?;
    PublicKeyTriple::from_bytes(&w.dilithium, &w.falcon, &w.sphincs).map_err(CodecError::Malformed)
}
