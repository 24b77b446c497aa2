// Typed chain store over the ordered KV.
//
// Key layout (all keys sort lexicographically; numeric components are
// zero-padded so lexicographic order is numeric order):
//
//   blocks — "<YYYYMM>:block:<hex hash>"    → canonical block bytes
//   meta   — "h2h:<padded height>"          → block hash
//            "hash2h:<hex hash>"            → height (u64 BE)
//            "bhash:<hex hash>"             → partition name
//            "time:<padded ts>"             → block hash
//            "diff:<padded height>"         → difficulty (u32 BE)
//            "pc:<hex parent hash>"         → concatenated child hashes
//            "meta:height" / "meta:head_hash"
//            "meta:total_supply" / "meta:total_burned"
//   state  — "bal:<address>"                → u64 BE
//            "nonce:<address>"              → u64 BE
//            "pubkey:<address>"             → encoded key triple
//   index  — "tx:<hex hash>"                → TxLocation
//            "addr:<address>"               → recent tx hashes (≤ 1000)

use std::path::Path;
use std::sync::Arc;

use crate::crypto::keys::PublicKeyTriple;
use crate::primitives::block::Block;
use crate::primitives::codec::{
    self, TxLocation, decode_block, decode_public_keys, encode_block, encode_public_keys,
};
use prost::Message;

use super::kv::{KvBatch, NS_BLOCKS, NS_INDEX, NS_META, NS_STATE, OrderedKv, RocksKv, StoreError};

/// Most recent transaction hashes retained per address.
const ADDR_INDEX_CAP: usize = 1000;

const KEY_HEIGHT: &[u8] = b"meta:height";
const KEY_HEAD_HASH: &[u8] = b"meta:head_hash";
const KEY_TOTAL_SUPPLY: &[u8] = b"meta:total_supply";
const KEY_TOTAL_BURNED: &[u8] = b"meta:total_burned";

#[derive(Clone)]
pub struct ChainStore {
    kv: Arc<dyn OrderedKv>,
}

fn key_h2h(height: u64) -> Vec<u8> {
    format!("h2h:{height:020}").into_bytes()
}

fn key_hash2h(hash: &[u8; 32]) -> Vec<u8> {
    format!("hash2h:{}", hex::encode(hash)).into_bytes()
}

fn key_bhash(hash: &[u8; 32]) -> Vec<u8> {
    format!("bhash:{}", hex::encode(hash)).into_bytes()
}

fn key_time(timestamp_ms: u64) -> Vec<u8> {
    format!("time:{timestamp_ms:020}").into_bytes()
}

fn key_diff(height: u64) -> Vec<u8> {
    format!("diff:{height:020}").into_bytes()
}

fn key_pc(parent: &[u8; 32]) -> Vec<u8> {
    format!("pc:{}", hex::encode(parent)).into_bytes()
}

fn key_block(partition: &str, hash: &[u8; 32]) -> Vec<u8> {
    format!("{partition}:block:{}", hex::encode(hash)).into_bytes()
}

fn key_bal(address: &str) -> Vec<u8> {
    format!("bal:{address}").into_bytes()
}

fn key_nonce(address: &str) -> Vec<u8> {
    format!("nonce:{address}").into_bytes()
}

fn key_pubkey(address: &str) -> Vec<u8> {
    format!("pubkey:{address}").into_bytes()
}

fn key_tx(hash: &[u8; 32]) -> Vec<u8> {
    format!("tx:{}", hex::encode(hash)).into_bytes()
}

fn key_addr(address: &str) -> Vec<u8> {
    format!("addr:{address}").into_bytes()
}

fn decode_u64(bytes: &[u8]) -> Result<u64, StoreError> {
    Ok(u64::from_be_bytes(
        bytes.try_into().map_err(|_| StoreError::Corruption("u64 value has wrong width"))?,
    ))
}

fn decode_u32(bytes: &[u8]) -> Result<u32, StoreError> {
    Ok(u32::from_be_bytes(
        bytes.try_into().map_err(|_| StoreError::Corruption("u32 value has wrong width"))?,
    ))
}

fn decode_hash(bytes: &[u8]) -> Result<[u8; 32], StoreError> {
    bytes.try_into().map_err(|_| StoreError::Corruption("hash value has wrong width"))
}

fn decode_hash_list(bytes: &[u8]) -> Result<Vec<[u8; 32]>, StoreError> {
    if !bytes.len().is_multiple_of(32) {
        return Err(StoreError::Corruption("hash list length not a multiple of 32"));
    }
    Ok(bytes.chunks_exact(32).map(|c| c.try_into().expect("chunk is 32 bytes")).collect())
}

/// Time partition name for a block timestamp, `YYYYMM`.
pub fn partition_for(timestamp_ms: u64) -> String {
    let days = (timestamp_ms / 86_400_000) as i64;
    let (year, month) = civil_from_days(days);
    format!("{year:04}{month:02}")
}

// Days-since-epoch to (year, month), proleptic Gregorian.
fn civil_from_days(z: i64) -> (i64, u32) {
    let z = z + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    (year, month as u32)
}

impl ChainStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(ChainStore { kv: Arc::new(RocksKv::open(path)?) })
    }

    pub fn with_kv(kv: Arc<dyn OrderedKv>) -> Self {
        ChainStore { kv }
    }

    pub fn commit(&self, batch: KvBatch) -> Result<(), StoreError> {
        self.kv.batch_write(batch)
    }

    // ---- head / heights -------------------------------------------------

    pub fn head(&self) -> Result<Option<(u64, [u8; 32])>, StoreError> {
        let height = match self.kv.get(NS_META, KEY_HEIGHT)? {
            Some(raw) => decode_u64(&raw)?,
            None => return Ok(None),
        };
        let hash = self
            .kv
            .get(NS_META, KEY_HEAD_HASH)?
            .ok_or(StoreError::Corruption("height present but head hash missing"))?;
        Ok(Some((height, decode_hash(&hash)?)))
    }

    pub fn block_hash_at(&self, height: u64) -> Result<Option<[u8; 32]>, StoreError> {
        self.kv.get(NS_META, &key_h2h(height))?.map(|raw| decode_hash(&raw)).transpose()
    }

    pub fn height_of(&self, hash: &[u8; 32]) -> Result<Option<u64>, StoreError> {
        self.kv.get(NS_META, &key_hash2h(hash))?.map(|raw| decode_u64(&raw)).transpose()
    }

    pub fn difficulty_at(&self, height: u64) -> Result<Option<u32>, StoreError> {
        self.kv.get(NS_META, &key_diff(height))?.map(|raw| decode_u32(&raw)).transpose()
    }

    /// Header timestamps of the last `window` blocks ending at the head,
    /// oldest first. Used by difficulty retargeting.
    pub fn recent_timestamps(&self, window: u64) -> Result<Vec<u64>, StoreError> {
        let Some((height, _)) = self.head()? else {
            return Ok(Vec::new());
        };
        let start = height.saturating_sub(window.saturating_sub(1));
        let mut times = Vec::with_capacity(window as usize);
        for h in start..=height {
            if let Some(hash) = self.block_hash_at(h)?
                && let Some(block) = self.block_by_hash(&hash)?
            {
                times.push(block.header.timestamp);
            }
        }
        Ok(times)
    }

    // ---- blocks ---------------------------------------------------------

    pub fn block_by_hash(&self, hash: &[u8; 32]) -> Result<Option<Block>, StoreError> {
        let Some(partition_raw) = self.kv.get(NS_META, &key_bhash(hash))? else {
            return Ok(None);
        };
        let partition = String::from_utf8(partition_raw)
            .map_err(|_| StoreError::Corruption("partition name is not utf-8"))?;
        let Some(bytes) = self.kv.get(NS_BLOCKS, &key_block(&partition, hash))? else {
            return Ok(None);
        };
        decode_block(&bytes).map(Some).map_err(|_| StoreError::Corruption("undecodable block"))
    }

    pub fn block_at(&self, height: u64) -> Result<Option<Block>, StoreError> {
        match self.block_hash_at(height)? {
            Some(hash) => self.block_by_hash(&hash),
            None => Ok(None),
        }
    }

    pub fn children_of(&self, parent: &[u8; 32]) -> Result<Vec<[u8; 32]>, StoreError> {
        match self.kv.get(NS_META, &key_pc(parent))? {
            Some(raw) => decode_hash_list(&raw),
            None => Ok(Vec::new()),
        }
    }

    // ---- account state --------------------------------------------------

    /// Missing account == zero balance; matches chain semantics.
    pub fn balance(&self, address: &str) -> Result<u64, StoreError> {
        match self.kv.get(NS_STATE, &key_bal(address))? {
            Some(raw) => decode_u64(&raw),
            None => Ok(0),
        }
    }

    pub fn nonce(&self, address: &str) -> Result<u64, StoreError> {
        match self.kv.get(NS_STATE, &key_nonce(address))? {
            Some(raw) => decode_u64(&raw),
            None => Ok(0),
        }
    }

    pub fn public_keys(&self, address: &str) -> Result<Option<PublicKeyTriple>, StoreError> {
        match self.kv.get(NS_STATE, &key_pubkey(address))? {
            Some(raw) => decode_public_keys(&raw)
                .map(Some)
                .map_err(|_| StoreError::Corruption("undecodable public key triple")),
            None => Ok(None),
        }
    }

    pub fn put_balance(&self, address: &str, value: u64) -> Result<(), StoreError> {
        self.kv.put(NS_STATE, &key_bal(address), &value.to_be_bytes())
    }

    pub fn total_supply(&self) -> Result<u64, StoreError> {
        match self.kv.get(NS_META, KEY_TOTAL_SUPPLY)? {
            Some(raw) => decode_u64(&raw),
            None => Ok(0),
        }
    }

    pub fn total_burned(&self) -> Result<u64, StoreError> {
        match self.kv.get(NS_META, KEY_TOTAL_BURNED)? {
            Some(raw) => decode_u64(&raw),
            None => Ok(0),
        }
    }

    // ---- indexes --------------------------------------------------------

    pub fn tx_location(&self, hash: &[u8; 32]) -> Result<Option<TxLocation>, StoreError> {
        match self.kv.get(NS_INDEX, &key_tx(hash))? {
            Some(raw) => TxLocation::decode(raw.as_slice())
                .map(Some)
                .map_err(|_| StoreError::Corruption("undecodable tx location")),
            None => Ok(None),
        }
    }

    pub fn address_txs(&self, address: &str) -> Result<Vec<[u8; 32]>, StoreError> {
        match self.kv.get(NS_INDEX, &key_addr(address))? {
            Some(raw) => decode_hash_list(&raw),
            None => Ok(Vec::new()),
        }
    }

    // ---- staging (all mutations funnel into one batch per block) --------

    /// Stage everything derived from the block itself: bytes in the time
    /// partition, height/hash links, timestamp and difficulty indexes, and
    /// parent→child adjacency.
    pub fn stage_block(&self, batch: &mut KvBatch, block: &Block) -> Result<String, StoreError> {
        let partition = partition_for(block.header.timestamp);
        let hash = block.hash;
        batch.put(NS_BLOCKS, key_block(&partition, &hash), encode_block(block));
        batch.put(NS_META, key_bhash(&hash), partition.clone().into_bytes());
        batch.put(NS_META, key_h2h(block.header.index), hash.to_vec());
        batch.put(NS_META, key_hash2h(&hash), block.header.index.to_be_bytes().to_vec());
        batch.put(NS_META, key_time(block.header.timestamp), hash.to_vec());
        batch.put(NS_META, key_diff(block.header.index), block.header.difficulty.to_be_bytes().to_vec());

        let mut children = self.children_of(&block.header.previous_hash)?;
        if !children.contains(&hash) {
            children.push(hash);
            let mut joined = Vec::with_capacity(children.len() * 32);
            for child in &children {
                joined.extend_from_slice(child);
            }
            batch.put(NS_META, key_pc(&block.header.previous_hash), joined);
        }
        Ok(partition)
    }

    pub fn stage_head(&self, batch: &mut KvBatch, height: u64, hash: &[u8; 32]) {
        batch.put(NS_META, KEY_HEIGHT.to_vec(), height.to_be_bytes().to_vec());
        batch.put(NS_META, KEY_HEAD_HASH.to_vec(), hash.to_vec());
    }

    pub fn stage_balance(&self, batch: &mut KvBatch, address: &str, value: u64) {
        batch.put(NS_STATE, key_bal(address), value.to_be_bytes().to_vec());
    }

    pub fn stage_nonce(&self, batch: &mut KvBatch, address: &str, value: u64) {
        batch.put(NS_STATE, key_nonce(address), value.to_be_bytes().to_vec());
    }

    pub fn stage_public_keys(&self, batch: &mut KvBatch, address: &str, keys: &PublicKeyTriple) {
        batch.put(NS_STATE, key_pubkey(address), encode_public_keys(keys));
    }

    pub fn stage_supply(&self, batch: &mut KvBatch, total_supply: u64, total_burned: u64) {
        batch.put(NS_META, KEY_TOTAL_SUPPLY.to_vec(), total_supply.to_be_bytes().to_vec());
        batch.put(NS_META, KEY_TOTAL_BURNED.to_vec(), total_burned.to_be_bytes().to_vec());
    }

    pub fn stage_tx_index(
        &self,
        batch: &mut KvBatch,
        tx_hash: &[u8; 32],
        partition: &str,
        block_hash: &[u8; 32],
        index: u32,
    ) {
        let location = TxLocation {
            partition: partition.to_string(),
            block_hash: block_hash.to_vec(),
            index,
        };
        batch.put(NS_INDEX, key_tx(tx_hash), location.encode_to_vec());
    }

    /// Appends to the per-address transaction list, bounded to the most
    /// recent ADDR_INDEX_CAP entries.
    pub fn stage_addr_index(
        &self,
        batch: &mut KvBatch,
        address: &str,
        tx_hash: &[u8; 32],
    ) -> Result<(), StoreError> {
        let mut hashes = self.address_txs(address)?;
        hashes.push(*tx_hash);
        if hashes.len() > ADDR_INDEX_CAP {
            let drop = hashes.len() - ADDR_INDEX_CAP;
            hashes.drain(..drop);
        }
        let mut joined = Vec::with_capacity(hashes.len() * 32);
        for h in &hashes {
            joined.extend_from_slice(h);
        }
        batch.put(NS_INDEX, key_addr(address), joined);
        Ok(())
    }
}

pub use codec::TxLocation as StoredTxLocation;
