use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Numeric position of an item within its group.
///
/// Keys are fractional: inserting between two neighbors takes their
/// midpoint, so a move never has to rewrite the keys of untouched
/// items. The server's canonical keys overwrite local ones on commit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SortKey(pub f64);

/// Spacing used when a key is minted with no neighbor on one side.
const STEP: f64 = 1.0;

impl SortKey {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Midpoint between two existing neighbors.
    pub fn between(prev: SortKey, next: SortKey) -> Self {
        Self((prev.0 + next.0) / 2.0)
    }

    /// A key ordered before `next` (insertion at the head of a group).
    pub fn before(next: SortKey) -> Self {
        Self(next.0 - STEP)
    }

    /// A key ordered after `prev` (insertion at the tail of a group).
    pub fn after(prev: SortKey) -> Self {
        Self(prev.0 + STEP)
    }

    /// Evenly spaced keys for seeding a group of `n` items.
    pub fn sequence(n: usize) -> Vec<SortKey> {
        (0..n).map(|i| Self(i as f64 * STEP)).collect()
    }
}

impl Default for SortKey {
    fn default() -> Self {
        Self(0.0)
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_between_is_strictly_inside() {
        let prev = SortKey::new(1.0);
        let next = SortKey::new(2.0);
        let mid = SortKey::between(prev, next);
        assert!(prev < mid);
        assert!(mid < next);
    }

    #[test]
    fn test_between_distinct_after_repeated_splits() {
        // Repeatedly inserting at the same gap must keep minting
        // distinct keys, unlike reusing a neighbor's key outright.
        let prev = SortKey::new(0.0);
        let mut next = SortKey::new(1.0);
        let mut seen = vec![prev, next];
        for _ in 0..20 {
            next = SortKey::between(prev, next);
            assert!(!seen.contains(&next));
            seen.push(next);
        }
    }

    #[test]
    fn test_before_and_after() {
        let key = SortKey::new(5.0);
        assert!(SortKey::before(key) < key);
        assert!(SortKey::after(key) > key);
    }

    #[test]
    fn test_sequence_is_strictly_increasing() {
        let keys = SortKey::sequence(4);
        assert_eq!(keys.len(), 4);
        for pair in keys.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }
}
