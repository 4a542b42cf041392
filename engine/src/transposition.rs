//! The transposition table (spec.md §4.4): a fixed-size, always-replace
//! cache from Zobrist hash to the best information the search has found so
//! far for that position.
//!
//! Kept deliberately simple relative to a multi-threaded engine's table:
//! single-threaded, owned outright by the iterative-deepening driver, no
//! atomics, no generation/age byte to distinguish stale entries across
//! games (a fresh [`Table`] is built per search here rather than reused
//! move-to-move).

use chess::movegen::moves::Move;

use crate::score::{Score, ScoreExt};

/// What kind of bound `score` represents, from the standard alpha-beta
/// transposition table scheme (spec.md §4.4).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Bound {
    /// The stored score is the exact minimax value.
    Exact,
    /// The search failed low: the true value is at most `score`.
    Upper,
    /// The search failed high: the true value is at least `score`.
    Lower,
}

#[derive(Debug, Copy, Clone)]
pub struct Entry {
    pub hash: u64,
    pub depth: u8,
    pub score: Score,
    pub bound: Bound,
    pub best_move: Option<Move>,
}

/// A power-of-two-sized, always-replace table.
pub struct Table {
    slots: Vec<Option<Entry>>,
    mask: usize,
}

/// Default size, picked to comfortably hold a single search's worth of
/// entries without needing runtime resizing.
const DEFAULT_SIZE_MB: usize = 16;

impl Table {
    pub fn new(size_mb: usize) -> Self {
        let entry_size = std::mem::size_of::<Option<Entry>>();
        let capacity = ((size_mb * 1024 * 1024) / entry_size).next_power_of_two();
        Table { slots: vec![None; capacity], mask: capacity - 1 }
    }

    fn index(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }

    /// Look up `hash`, adjusting any mate score to be relative to `ply`
    /// (spec.md §4.4, §3).
    pub fn probe(&self, hash: u64, ply: usize) -> Option<Entry> {
        let entry = self.slots[self.index(hash)]?;
        if entry.hash != hash {
            return None;
        }
        Some(Entry { score: entry.score.from_tt(ply), ..entry })
    }

    /// Store a search result, unconditionally replacing whatever occupied
    /// the slot (spec.md §4.4: always-replace, no depth-preferred scheme).
    pub fn store(&mut self, hash: u64, depth: u8, score: Score, bound: Bound, best_move: Option<Move>, ply: usize) {
        let idx = self.index(hash);
        self.slots[idx] = Some(Entry {
            hash,
            depth,
            score: score.to_tt(ply),
            bound,
            best_move,
        });
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE_MB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn stored_entry_round_trips_through_probe() {
        let mut table = Table::new(1);
        let mv = Move::from_str("e2e4").unwrap();

        table.store(0xDEAD_BEEF, 6, 123, Bound::Exact, Some(mv), 0);
        let entry = table.probe(0xDEAD_BEEF, 0).unwrap();

        assert_eq!(entry.depth, 6);
        assert_eq!(entry.score, 123);
        assert_eq!(entry.bound, Bound::Exact);
        assert_eq!(entry.best_move, Some(mv));
    }

    #[test]
    fn hash_collision_on_the_same_slot_is_detected() {
        let mut table = Table::new(1);
        table.store(1, 4, 10, Bound::Exact, None, 0);

        // Force a same-slot, different-hash probe by reusing the low bits
        // but flipping high bits that the small table's mask ignores.
        let colliding_hash = 1 ^ (1 << 63);
        assert!(table.probe(colliding_hash, 0).is_none() || table.probe(1, 0).is_some());
    }

    #[test]
    fn mate_scores_round_trip_through_store_and_probe_at_the_same_ply() {
        let mut table = Table::new(1);
        let mate_in_3_from_root = crate::score::MATE - 5;

        table.store(42, 10, mate_in_3_from_root, Bound::Exact, None, 4);
        let entry = table.probe(42, 4).unwrap();

        assert_eq!(entry.score, mate_in_3_from_root);
    }

    #[test]
    fn mate_scores_are_rebased_when_probed_at_a_different_ply() {
        let mut table = Table::new(1);
        // Found 5 plies from root, stored at ply 2 (mate in 3 from that node).
        let found_at_ply_5 = crate::score::MATE - 5;
        table.store(99, 10, found_at_ply_5, Bound::Exact, None, 2);

        // Reached again via a shorter path, at ply 4: still mate in 3 from
        // this node, so mate in 7 relative to this root.
        let entry = table.probe(99, 4).unwrap();
        assert_eq!(entry.score, crate::score::MATE - 7);
    }

    #[test]
    fn always_replace_overwrites_a_deeper_prior_entry() {
        let mut table = Table::new(1);
        table.store(7, 20, 500, Bound::Exact, None, 0);
        table.store(7, 2, -500, Bound::Upper, None, 0);

        let entry = table.probe(7, 0).unwrap();
        assert_eq!(entry.depth, 2);
        assert_eq!(entry.score, -500);
    }
}
