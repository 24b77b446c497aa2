// Orphan block pool.
//
// Blocks that arrive ahead of their parent wait here, bounded by count
// and age. Admitting a block drains its children back into the engine.

use std::collections::HashMap;

use crate::primitives::block::Block;

struct OrphanEntry {
    block: Block,
    received_at_ms: u64,
}

pub struct OrphanPool {
    max_orphans: usize,
    max_age_ms: u64,
    entries: HashMap<[u8; 32], OrphanEntry>,
    by_parent: HashMap<[u8; 32], Vec<[u8; 32]>>,
}

impl OrphanPool {
    pub fn new(max_orphans: usize, max_age_ms: u64) -> Self {
        OrphanPool {
            max_orphans,
            max_age_ms,
            entries: HashMap::new(),
            by_parent: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, hash: &[u8; 32]) -> bool {
        self.entries.contains_key(hash)
    }

    /// Parks a block. Returns false on duplicates. At capacity the oldest
    /// entry is evicted first.
    pub fn insert(&mut self, block: Block, now_ms: u64) -> bool {
        let hash = block.hash;
        if self.entries.contains_key(&hash) {
            return false;
        }

        if self.entries.len() >= self.max_orphans
            && let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.received_at_ms)
                .map(|(h, _)| *h)
        {
            self.remove(&oldest);
        }

        self.by_parent.entry(block.header.previous_hash).or_default().push(hash);
        self.entries.insert(hash, OrphanEntry { block, received_at_ms: now_ms });
        true
    }

    /// Removes and returns the children of a just-admitted parent.
    pub fn take_children(&mut self, parent: &[u8; 32]) -> Vec<Block> {
        let Some(hashes) = self.by_parent.remove(parent) else {
            return Vec::new();
        };
        hashes
            .into_iter()
            .filter_map(|h| self.entries.remove(&h).map(|e| e.block))
            .collect()
    }

    pub fn evict_expired(&mut self, now_ms: u64) {
        let expired: Vec<[u8; 32]> = self
            .entries
            .iter()
            .filter(|(_, e)| now_ms.saturating_sub(e.received_at_ms) > self.max_age_ms)
            .map(|(h, _)| *h)
            .collect();
        for hash in expired {
            self.remove(&hash);
        }
    }

    fn remove(&mut self, hash: &[u8; 32]) {
        if let Some(entry) = self.entries.remove(hash) {
            let parent = entry.block.header.previous_hash;
            if let Some(children) = self.by_parent.get_mut(&parent) {
                children.retain(|h| h != hash);
                if children.is_empty() {
                    self.by_parent.remove(&parent);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::block::BlockHeader;

    fn orphan(index: u64, parent: [u8; 32], tag: u8) -> Block {
        let mut block = Block {
            header: BlockHeader {
                index,
                previous_hash: parent,
                timestamp: 1_752_451_210_000 + index,
                merkle_root: [0u8; 32],
                nonce: tag as u64,
                difficulty: 1,
                consensus_data: Default::default(),
            },
            transactions: Vec::new(),
            hash: [0u8; 32],
        };
        block.seal();
        block
    }

    #[test]
    fn test_children_drained_by_parent() {
        let mut pool = OrphanPool::new(10, 1000);
        let parent = [1u8; 32];
        let a = orphan(5, parent, 1);
        let b = orphan(5, parent, 2);
        let c = orphan(6, [2u8; 32], 3);
        assert!(pool.insert(a.clone(), 0));
        assert!(pool.insert(b.clone(), 0));
        assert!(pool.insert(c.clone(), 0));
        assert!(!pool.insert(a.clone(), 0), "duplicate rejected");

        let drained = pool.take_children(&parent);
        assert_eq!(drained.len(), 2);
        assert_eq!(pool.len(), 1);
        assert!(pool.contains(&c.hash));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut pool = OrphanPool::new(2, 10_000);
        let a = orphan(5, [1u8; 32], 1);
        let b = orphan(6, [2u8; 32], 2);
        let c = orphan(7, [3u8; 32], 3);
        pool.insert(a.clone(), 100);
        pool.insert(b.clone(), 200);
        pool.insert(c.clone(), 300);

        assert_eq!(pool.len(), 2);
        assert!(!pool.contains(&a.hash));
        assert!(pool.contains(&c.hash));
    }

    #[test]
    fn test_age_eviction() {
        let mut pool = OrphanPool::new(10, 1000);
        let a = orphan(5, [1u8; 32], 1);
        pool.insert(a.clone(), 0);
        pool.evict_expired(500);
        assert!(pool.contains(&a.hash));
        pool.evict_expired(1501);
        assert!(pool.is_empty());
        assert!(pool.take_children(&[1u8; 32]).is_empty());
    }
}
