// Namespaced ordered key-value store over RocksDB.
//
// Column families play the role of namespaces. All multi-key updates go
// through KvBatch so a crash never exposes a half-written block admission.
//
// Namespaces:
//   blocks — "<YYYYMM>:block:<hex hash>" → canonical block bytes
//   meta   — chain metadata, height/hash links, difficulty, adjacency
//   state  — per-address balance / nonce / public keys
//   index  — transaction and address indexes

use std::path::Path;
use std::sync::Arc;

use rocksdb::{ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch};

pub const NS_BLOCKS: &str = "blocks";
pub const NS_META: &str = "meta";
pub const NS_STATE: &str = "state";
pub const NS_INDEX: &str = "index";

const NAMESPACES: &[&str] = &[NS_BLOCKS, NS_META, NS_STATE, NS_INDEX];

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("rocksdb error: {0}")]
    RocksDb(#[from] rocksdb::Error),
    #[error("data corruption: {0}")]
    Corruption(&'static str),
    #[error("unknown namespace: {0}")]
    UnknownNamespace(&'static str),
}

/// A set of writes applied atomically across namespaces.
#[derive(Default)]
pub struct KvBatch {
    puts: Vec<(&'static str, Vec<u8>, Vec<u8>)>,
    deletes: Vec<(&'static str, Vec<u8>)>,
}

impl KvBatch {
    pub fn put(&mut self, ns: &'static str, key: Vec<u8>, value: Vec<u8>) {
        self.puts.push((ns, key, value));
    }

    pub fn delete(&mut self, ns: &'static str, key: Vec<u8>) {
        self.deletes.push((ns, key));
    }

    pub fn is_empty(&self) -> bool {
        self.puts.is_empty() && self.deletes.is_empty()
    }
}

/// Ordered map with prefix/range scans and atomic cross-namespace batches.
/// Keys sort lexicographically; numeric keys are zero-padded by callers.
pub trait OrderedKv: Send + Sync {
    fn get(&self, ns: &'static str, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
    fn put(&self, ns: &'static str, key: &[u8], value: &[u8]) -> Result<(), StoreError>;
    fn delete(&self, ns: &'static str, key: &[u8]) -> Result<(), StoreError>;
    fn batch_write(&self, batch: KvBatch) -> Result<(), StoreError>;
    /// All entries with `min <= key <= max`, ascending.
    fn range_scan(
        &self,
        ns: &'static str,
        min: &[u8],
        max: &[u8],
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError>;
    fn scan_prefix(
        &self,
        ns: &'static str,
        prefix: &[u8],
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError>;
}

#[derive(Clone)]
pub struct RocksKv {
    db: Arc<DB>,
}

impl RocksKv {
    /// Open or create the database. Options are tuned for a blockchain
    /// workload: sequential block appends, point lookups on state.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        opts.set_write_buffer_size(64 * 1024 * 1024);
        opts.set_max_write_buffer_number(3);
        opts.set_target_file_size_base(64 * 1024 * 1024);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts.set_level_compaction_dynamic_level_bytes(true);
        opts.set_max_background_jobs(4);

        // WAL limits; crash recovery replays it on open.
        opts.set_wal_bytes_per_sync(1024 * 1024);
        opts.set_max_total_wal_size(128 * 1024 * 1024);

        let cfs: Vec<ColumnFamilyDescriptor> = NAMESPACES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, opts.clone()))
            .collect();

        let db = DB::open_cf_descriptors(&opts, path, cfs)?;
        Ok(RocksKv { db: Arc::new(db) })
    }

    fn cf(&self, name: &'static str) -> Result<&rocksdb::ColumnFamily, StoreError> {
        self.db.cf_handle(name).ok_or(StoreError::UnknownNamespace(name))
    }
}

impl OrderedKv for RocksKv {
    fn get(&self, ns: &'static str, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.db.get_cf(self.cf(ns)?, key)?)
    }

    fn put(&self, ns: &'static str, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        Ok(self.db.put_cf(self.cf(ns)?, key, value)?)
    }

    fn delete(&self, ns: &'static str, key: &[u8]) -> Result<(), StoreError> {
        Ok(self.db.delete_cf(self.cf(ns)?, key)?)
    }

    fn batch_write(&self, batch: KvBatch) -> Result<(), StoreError> {
        let mut wb = WriteBatch::default();
        for (ns, key, value) in &batch.puts {
            wb.put_cf(self.cf(ns)?, key, value);
        }
        for (ns, key) in &batch.deletes {
            wb.delete_cf(self.cf(ns)?, key);
        }

        // Block commits must survive power loss; force fsync.
        let mut write_opts = rocksdb::WriteOptions::default();
        write_opts.set_sync(true);
        Ok(self.db.write_opt(wb, &write_opts)?)
    }

    fn range_scan(
        &self,
        ns: &'static str,
        min: &[u8],
        max: &[u8],
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let cf = self.cf(ns)?;
        let mut out = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::From(min, Direction::Forward)) {
            let (key, value) = item?;
            if key.as_ref() > max {
                break;
            }
            out.push((key.to_vec(), value.to_vec()));
        }
        Ok(out)
    }

    fn scan_prefix(
        &self,
        ns: &'static str,
        prefix: &[u8],
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let cf = self.cf(ns)?;
        let mut out = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward)) {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            out.push((key.to_vec(), value.to_vec()));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp() -> (tempfile::TempDir, RocksKv) {
        let dir = tempfile::tempdir().unwrap();
        let kv = RocksKv::open(dir.path()).unwrap();
        (dir, kv)
    }

    #[test]
    fn test_put_get_delete() {
        let (_dir, kv) = tmp();
        kv.put(NS_META, b"meta:height", b"7").unwrap();
        assert_eq!(kv.get(NS_META, b"meta:height").unwrap(), Some(b"7".to_vec()));
        kv.delete(NS_META, b"meta:height").unwrap();
        assert_eq!(kv.get(NS_META, b"meta:height").unwrap(), None);
    }

    #[test]
    fn test_namespaces_are_disjoint() {
        let (_dir, kv) = tmp();
        kv.put(NS_STATE, b"bal:x", b"1").unwrap();
        assert_eq!(kv.get(NS_INDEX, b"bal:x").unwrap(), None);
    }

    #[test]
    fn test_batch_is_atomic_unit() {
        let (_dir, kv) = tmp();
        let mut batch = KvBatch::default();
        batch.put(NS_META, b"a".to_vec(), b"1".to_vec());
        batch.put(NS_STATE, b"b".to_vec(), b"2".to_vec());
        kv.batch_write(batch).unwrap();
        assert_eq!(kv.get(NS_META, b"a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(kv.get(NS_STATE, b"b").unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn test_prefix_scan_orders_lexicographically() {
        let (_dir, kv) = tmp();
        for height in [3u64, 1, 2, 12] {
            kv.put(NS_META, format!("h2h:{height:020}").as_bytes(), &height.to_be_bytes())
                .unwrap();
        }
        let entries = kv.scan_prefix(NS_META, b"h2h:").unwrap();
        let heights: Vec<u64> = entries
            .iter()
            .map(|(_, v)| u64::from_be_bytes(v[..8].try_into().unwrap()))
            .collect();
        assert_eq!(heights, vec![1, 2, 3, 12], "zero padding preserves numeric order");
    }

    #[test]
    fn test_range_scan_inclusive() {
        let (_dir, kv) = tmp();
        for k in ["k1", "k2", "k3", "k4"] {
            kv.put(NS_INDEX, k.as_bytes(), b"v").unwrap();
        }
        let entries = kv.range_scan(NS_INDEX, b"k2", b"k3").unwrap();
        let keys: Vec<&[u8]> = entries.iter().map(|(k, _)| k.as_slice()).collect();
        assert_eq!(keys, vec![b"k2".as_slice(), b"k3".as_slice()]);
    }
}
