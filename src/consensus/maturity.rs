// Coinbase maturity ledger.
//
// Block rewards are credited to the balance immediately on block apply,
// but stay unspendable until the maturity window has passed. The ledger
// tracks those immature slices in RAM, indexed by the minting block's
// hash; the chain engine applies the balance revocations it reports.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardStatus {
    Immature,
    Mature,
    Orphaned,
}

#[derive(Debug, Clone)]
pub struct ImmatureReward {
    pub block_hash: [u8; 32],
    pub amount: u64,
    pub address: String,
    pub block_height: u64,
    pub created_at_ms: u64,
    pub maturity_height: u64,
    pub status: RewardStatus,
}

/// total = stored balance; immature = unexpired coinbase slices;
/// mature = what a transaction may actually spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceBreakdown {
    pub total: u64,
    pub mature: u64,
    pub immature: u64,
}

/// A reward the engine must claw back from the address balance.
pub type Revocation = (String, u64);

const ENTRY_TTL_MS: u64 = 24 * 60 * 60 * 1000;

pub struct MaturityLedger {
    window: u64,
    entries: HashMap<[u8; 32], ImmatureReward>,
}

impl MaturityLedger {
    pub fn new(window: u64) -> Self {
        MaturityLedger { window, entries: HashMap::new() }
    }

    pub fn window(&self) -> u64 {
        self.window
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, block_hash: &[u8; 32]) -> Option<&ImmatureReward> {
        self.entries.get(block_hash)
    }

    /// Registers the coinbase of a freshly applied block.
    pub fn add(
        &mut self,
        block_hash: [u8; 32],
        amount: u64,
        address: String,
        block_height: u64,
        now_ms: u64,
    ) {
        self.entries.insert(
            block_hash,
            ImmatureReward {
                block_hash,
                amount,
                address,
                block_height,
                created_at_ms: now_ms,
                maturity_height: block_height + self.window,
                status: RewardStatus::Immature,
            },
        );
    }

    pub fn immature_total(&self, address: &str) -> u64 {
        self.entries
            .values()
            .filter(|e| e.status == RewardStatus::Immature && e.address == address)
            .fold(0u64, |acc, e| acc.saturating_add(e.amount))
    }

    pub fn breakdown(&self, address: &str, stored_balance: u64) -> BalanceBreakdown {
        let immature = self.immature_total(address);
        BalanceBreakdown {
            total: stored_balance,
            mature: stored_balance.saturating_sub(immature),
            immature,
        }
    }

    /// Height advanced: promote entries whose window elapsed, flag entries
    /// whose minting block fell off the main chain. Returned revocations
    /// must be applied to balances by the caller.
    pub fn process_maturity(
        &mut self,
        current_height: u64,
        on_main_chain: impl Fn(&[u8; 32]) -> bool,
    ) -> Vec<Revocation> {
        for entry in self.entries.values_mut() {
            if entry.status == RewardStatus::Immature && current_height >= entry.maturity_height {
                entry.status = RewardStatus::Mature;
            }
        }

        let mut revocations = Vec::new();
        for entry in self.entries.values_mut() {
            if entry.status == RewardStatus::Immature && !on_main_chain(&entry.block_hash) {
                entry.status = RewardStatus::Orphaned;
                revocations.push((entry.address.clone(), entry.amount));
            }
        }
        revocations
    }

    /// Direct orphaning of a known block. Only an immature entry yields a
    /// revocation; anything else is a no-op.
    pub fn mark_orphaned(&mut self, block_hash: &[u8; 32]) -> Option<Revocation> {
        match self.entries.get(block_hash) {
            Some(entry) if entry.status == RewardStatus::Immature => {
                let entry = self.entries.remove(block_hash).expect("entry just observed");
                Some((entry.address, entry.amount))
            }
            _ => None,
        }
    }

    /// Drops entries past any usefulness: settled long ago or stale.
    pub fn gc(&mut self, now_ms: u64, current_height: u64) {
        let window = self.window;
        self.entries.retain(|_, e| {
            let expired_by_age = now_ms.saturating_sub(e.created_at_ms) > ENTRY_TTL_MS;
            let expired_by_height = current_height > e.block_height + 4 * window;
            !(expired_by_age || expired_by_height)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REWARD: u64 = 178_900_000_000_000_000;

    fn hash(n: u8) -> [u8; 32] {
        [n; 32]
    }

    #[test]
    fn test_lifecycle_promotion() {
        // Window of 5: a reward mined at height 1 matures at height 6.
        let mut ledger = MaturityLedger::new(5);
        ledger.add(hash(1), REWARD, "addr-a".into(), 1, 0);
        for height in 2..=5 {
            ledger.add(hash(height as u8), REWARD, "addr-b".into(), height, 0);
        }

        assert_eq!(ledger.breakdown("addr-a", REWARD).mature, 0);
        assert_eq!(ledger.breakdown("addr-a", REWARD).immature, REWARD);

        let revoked = ledger.process_maturity(6, |_| true);
        assert!(revoked.is_empty());
        assert_eq!(ledger.breakdown("addr-a", REWARD).mature, REWARD);
        assert_eq!(ledger.breakdown("addr-a", REWARD).immature, 0);

        // addr-b holds four rewards; at height 7 only the height-2 one has
        // matured.
        ledger.process_maturity(7, |_| true);
        let b = ledger.breakdown("addr-b", 4 * REWARD);
        assert_eq!(b.mature, REWARD);
        assert_eq!(b.immature, 3 * REWARD);
    }

    #[test]
    fn test_mark_orphaned_revokes_once() {
        let mut ledger = MaturityLedger::new(5);
        ledger.add(hash(1), REWARD, "addr-a".into(), 1, 0);

        assert_eq!(ledger.mark_orphaned(&hash(1)), Some(("addr-a".into(), REWARD)));
        assert!(ledger.is_empty());
        // Unknown or already-removed hash is a no-op.
        assert_eq!(ledger.mark_orphaned(&hash(1)), None);
    }

    #[test]
    fn test_mature_entry_cannot_be_orphaned() {
        let mut ledger = MaturityLedger::new(5);
        ledger.add(hash(1), REWARD, "addr-a".into(), 1, 0);
        ledger.process_maturity(6, |_| true);
        assert_eq!(ledger.mark_orphaned(&hash(1)), None);
    }

    #[test]
    fn test_off_chain_entries_revoked() {
        let mut ledger = MaturityLedger::new(5);
        ledger.add(hash(1), REWARD, "addr-a".into(), 1, 0);
        ledger.add(hash(2), REWARD, "addr-b".into(), 2, 0);

        let revoked = ledger.process_maturity(3, |h| h != &hash(2));
        assert_eq!(revoked, vec![("addr-b".to_string(), REWARD)]);
        assert_eq!(ledger.get(&hash(2)).unwrap().status, RewardStatus::Orphaned);
        // Orphaned entries no longer count as immature.
        assert_eq!(ledger.immature_total("addr-b"), 0);
    }

    #[test]
    fn test_breakdown_floors_at_zero() {
        let mut ledger = MaturityLedger::new(5);
        ledger.add(hash(1), REWARD, "addr-a".into(), 1, 0);
        // Stored balance smaller than the immature sum must not underflow.
        let b = ledger.breakdown("addr-a", REWARD / 2);
        assert_eq!(b.mature, 0);
        assert_eq!(b.total, REWARD / 2);
    }

    #[test]
    fn test_gc_by_age_and_height() {
        let mut ledger = MaturityLedger::new(5);
        ledger.add(hash(1), REWARD, "addr-a".into(), 1, 0);
        ledger.add(hash(2), REWARD, "addr-b".into(), 40, 0);

        // Height 1 entry is more than 4 × window past; height 40 is not.
        ledger.gc(1000, 40);
        assert!(ledger.get(&hash(1)).is_none());
        assert!(ledger.get(&hash(2)).is_some());

        // A day later everything goes.
        ledger.gc(ENTRY_TTL_MS + 1001, 40);
        assert!(ledger.is_empty());
    }
}
