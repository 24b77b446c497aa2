pub mod kv;
pub mod store;

pub use kv::{KvBatch, OrderedKv, RocksKv, StoreError};
pub use store::ChainStore;
