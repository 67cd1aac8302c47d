//! Per-tier quota bookkeeping shared by all campaign workers.

use std::{
    collections::BTreeSet,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::Tier;

type Slots = [BTreeSet<usize>; Tier::ALL.len()];

/// Counts accepted levels per tier and hands out artifact slot numbers.
///
/// Slots run from `0` to `quota - 1` within each tier. A released slot is
/// handed out again before higher numbers.
#[derive(Debug)]
pub struct QuotaLedger {
    quota: usize,
    slots: Mutex<Slots>,
}

impl QuotaLedger {
    /// Creates an empty ledger allowing `quota` levels per tier.
    #[must_use]
    pub fn new(quota: usize) -> Self {
        Self {
            quota,
            slots: Mutex::new(Slots::default()),
        }
    }

    /// Levels allowed per tier.
    #[must_use]
    pub const fn quota(&self) -> usize {
        self.quota
    }

    /// Claims the lowest free slot in `tier`, or `None` when the tier is full.
    pub fn try_reserve(&self, tier: Tier) -> Option<usize> {
        let mut slots = self.lock();
        let taken = &mut slots[tier.index()];
        let slot = (0..self.quota).find(|slot| !taken.contains(slot))?;
        let _ = taken.insert(slot);
        Some(slot)
    }

    /// Returns a previously reserved slot. Reports whether it was held.
    pub fn release(&self, tier: Tier, slot: usize) -> bool {
        self.lock()[tier.index()].remove(&slot)
    }

    /// Slots currently held in `tier`.
    #[must_use]
    pub fn accepted(&self, tier: Tier) -> usize {
        self.lock()[tier.index()].len()
    }

    /// Reports whether `tier` has no free slot.
    #[must_use]
    pub fn is_full(&self, tier: Tier) -> bool {
        self.accepted(tier) >= self.quota
    }

    /// Reports whether every tier is full.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.lock().iter().all(|taken| taken.len() >= self.quota)
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reservations_stop_at_the_quota() {
        let ledger = QuotaLedger::new(2);
        assert_eq!(ledger.try_reserve(Tier::Expert), Some(0));
        assert_eq!(ledger.try_reserve(Tier::Expert), Some(1));
        assert_eq!(ledger.try_reserve(Tier::Expert), None);
        assert!(ledger.is_full(Tier::Expert));
        assert!(!ledger.is_complete(), "other tiers are still empty");
        assert_eq!(ledger.accepted(Tier::Beginner), 0);
    }

    #[test]
    fn released_slots_are_reused_first() {
        let ledger = QuotaLedger::new(3);
        for _ in 0..3 {
            let _ = ledger.try_reserve(Tier::Beginner);
        }
        assert!(ledger.release(Tier::Beginner, 1));
        assert!(!ledger.release(Tier::Beginner, 1), "slot already free");
        assert_eq!(ledger.try_reserve(Tier::Beginner), Some(1));
    }

    #[test]
    fn zero_quota_is_complete_immediately() {
        let ledger = QuotaLedger::new(0);
        assert!(ledger.is_complete());
        assert_eq!(ledger.try_reserve(Tier::Advanced), None);
    }

    #[test]
    fn concurrent_reservations_never_share_a_slot() {
        let ledger = QuotaLedger::new(35);
        let claimed: Vec<usize> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        let mut mine = Vec::new();
                        while let Some(slot) = ledger.try_reserve(Tier::Intermediate) {
                            mine.push(slot);
                        }
                        mine
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| handle.join().expect("worker"))
                .collect()
        });

        let unique: BTreeSet<usize> = claimed.iter().copied().collect();
        assert_eq!(claimed.len(), 35);
        assert_eq!(unique, (0..35).collect());
    }
}
