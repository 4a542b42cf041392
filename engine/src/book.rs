//! Opening book lookup (spec.md §6, SPEC_FULL.md §3): an external
//! collaborator consulted once, before the first search, so the engine can
//! play known theory instantly instead of spending its time budget
//! rediscovering it.
//!
//! The Polyglot binary layout is widely documented and simple enough to
//! read directly (16-byte big-endian entries, sorted by key), but its move
//! encoding depends on the *exact* random-key table the book was built
//! against. We don't reproduce the official Polyglot key table here (see
//! DESIGN.md), so [`PolyglotBook`] is only useful with books generated by
//! this crate's own [`crate::zobrist::ZHash`] — reading a third-party
//! `.bin` book is out of scope.

use std::io::Read;

use chess::movegen::moves::Move;
use rand::Rng;

use crate::position::Position;

/// An external source of known-good moves for a position.
pub trait OpeningBook {
    fn lookup(&self, position: &Position) -> Option<Move>;
}

/// The default collaborator: no book configured, so the driver always falls
/// through to search (spec.md §4.6 step 1).
pub struct NoBook;

impl OpeningBook for NoBook {
    fn lookup(&self, _position: &Position) -> Option<Move> {
        None
    }
}

/// One 16-byte Polyglot book entry.
#[derive(Debug, Copy, Clone)]
struct Entry {
    key: u64,
    raw_move: u16,
    weight: u16,
}

/// An in-memory, key-sorted Polyglot book.
pub struct PolyglotBook {
    entries: Vec<Entry>,
}

impl PolyglotBook {
    /// Read every entry from a Polyglot `.bin` file into memory. The file is
    /// expected to already be sorted by key (the standard Polyglot layout);
    /// we don't re-sort it, since a binary search over an unsorted file
    /// would silently miss entries.
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let mut file = std::fs::File::open(path.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to open opening book {}: {e}", path.as_ref().display()))?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        if bytes.len() % 16 != 0 {
            anyhow::bail!("opening book {} has a size that isn't a multiple of 16 bytes", path.as_ref().display());
        }

        let entries = bytes
            .chunks_exact(16)
            .map(|chunk| Entry {
                key: u64::from_be_bytes(chunk[0..8].try_into().unwrap()),
                raw_move: u16::from_be_bytes(chunk[8..10].try_into().unwrap()),
                weight: u16::from_be_bytes(chunk[10..12].try_into().unwrap()),
            })
            .collect();

        Ok(PolyglotBook { entries })
    }

    /// Decode a Polyglot move field into a UCI move string, so it can be
    /// matched against `Position::legal_moves` (which is how we recover the
    /// actual `Move`, rather than trying to replicate the board library's
    /// internal move encoding).
    fn decode(raw_move: u16) -> String {
        let to_file = raw_move & 0x7;
        let to_rank = (raw_move >> 3) & 0x7;
        let from_file = (raw_move >> 6) & 0x7;
        let from_rank = (raw_move >> 9) & 0x7;
        let promo = (raw_move >> 12) & 0x7;

        let mut uci = format!(
            "{}{}{}{}",
            (b'a' + from_file as u8) as char,
            from_rank + 1,
            (b'a' + to_file as u8) as char,
            to_rank + 1,
        );

        if let Some(label) = match promo {
            1 => Some('n'),
            2 => Some('b'),
            3 => Some('r'),
            4 => Some('q'),
            _ => None,
        } {
            uci.push(label);
        }

        uci
    }
}

impl OpeningBook for PolyglotBook {
    fn lookup(&self, position: &Position) -> Option<Move> {
        let key = position.zobrist_hash();
        let start = self.entries.partition_point(|e| e.key < key);

        let candidates = &self.entries[start..];
        let candidates = &candidates[..candidates.iter().take_while(|e| e.key == key).count()];
        if candidates.is_empty() {
            return None;
        }

        let total_weight: u32 = candidates.iter().map(|e| e.weight as u32).sum();
        if total_weight == 0 {
            return None;
        }

        let mut pick = rand::thread_rng().gen_range(0..total_weight);
        let chosen = candidates
            .iter()
            .find(|e| {
                if pick < e.weight as u32 {
                    true
                } else {
                    pick -= e.weight as u32;
                    false
                }
            })
            .unwrap_or(&candidates[0]);

        let uci = Self::decode(chosen.raw_move);
        let candidate: Move = uci.parse().ok()?;
        position.find_legal(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::board::Board;

    #[test]
    fn no_book_never_suggests_a_move() {
        let position = Position::new(Board::default());
        assert_eq!(NoBook.lookup(&position), None);
    }

    #[test]
    fn polyglot_decode_round_trips_a_simple_move() {
        // e2-e4: from e2 (file 4, rank 1), to e4 (file 4, rank 3).
        let raw_move = (4u16) | (3 << 3) | (4 << 6) | (1 << 9);
        assert_eq!(PolyglotBook::decode(raw_move), "e2e4");
    }

    #[test]
    fn polyglot_decode_includes_a_promotion_label() {
        // a7-a8=Q: from a7 (file 0, rank 6), to a8 (file 0, rank 7), promo 4=queen.
        let raw_move = (0u16) | (7 << 3) | (0 << 6) | (6 << 9) | (4 << 12);
        assert_eq!(PolyglotBook::decode(raw_move), "a7a8q");
    }

    #[test]
    fn lookup_against_an_empty_book_returns_none() {
        let book = PolyglotBook { entries: Vec::new() };
        let position = Position::new(Board::default());
        assert_eq!(book.lookup(&position), None);
    }
}
