//! Quiescence search (spec.md §4.3): once the main search reaches the
//! frontier, keep searching captures and promotions only, until the
//! position is "quiet" enough to trust the static evaluation. This avoids
//! the horizon effect, where cutting the search off mid-exchange makes a
//! position look better or worse than it really is.
//!
//! No transposition table, killers, or history here: a quiescence node only
//! ever sees captures/promotions, so there's little to gain from ordering
//! heuristics built for quiet moves, and the extra bookkeeping isn't worth
//! it for how shallow this part of the tree usually runs.

use crate::position::Position;
use crate::score::{Score, ScoreExt};

use super::Searcher;

/// How many plies past the main search's frontier quiescence is allowed to
/// run, as a hard backstop against runaway exchange sequences (spec.md
/// §4.3).
const MAX_QUIESCENCE_PLY: usize = 32;

impl Searcher<'_> {
    /// Fail-hard alpha-beta search restricted to captures and promotions
    /// (spec.md §4.3).
    pub fn quiescence(&mut self, pos: &mut Position, ply: usize, mut alpha: Score, beta: Score) -> Score {
        if self.should_stop() {
            self.aborted = true;
            return alpha;
        }

        self.nodes += 1;
        self.seldepth = self.seldepth.max(ply);

        // Fail-hard stand-pat: assume we can always choose to stop capturing.
        // `evaluate` already folds in checkmate/stalemate/draw detection, so
        // a position with no noisy moves left falls out of the loop below
        // with exactly that score.
        let stand_pat = crate::evaluate::evaluate(pos);
        if stand_pat >= beta {
            return beta;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        if ply >= MAX_QUIESCENCE_PLY {
            return alpha;
        }

        let mut noisy = pos.legal_noisy();
        crate::move_order::order_noisy(&mut noisy, pos);

        for mv in noisy {
            pos.make(mv);
            let score = -self.quiescence(pos, ply + 1, -beta, -alpha);
            pos.unmake();

            if self.aborted {
                return alpha;
            }

            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::Heuristics;
    use crate::transposition::Table;
    use chess::board::Board;
    use std::str::FromStr;
    use std::time::{Duration, Instant};

    fn searcher(table: &mut Table) -> Searcher<'_> {
        Searcher {
            tt: table,
            heuristics: Heuristics::new(),
            nodes: 0,
            seldepth: 0,
            deadline: Instant::now() + Duration::from_secs(10),
            aborted: false,
        }
    }

    #[test]
    fn quiescence_resolves_a_hanging_queen_capture() {
        let board = Board::from_str("4k3/8/8/8/8/3q4/8/4KQ2 w - - 0 1").unwrap();
        let mut pos = Position::new(board);
        let mut table = Table::new(1);
        let mut searcher = searcher(&mut table);

        let score = searcher.quiescence(&mut pos, 0, Score::MINUS_INF, Score::PLUS_INF);
        assert!(score > 0);
    }

    #[test]
    fn quiescence_resolves_a_straight_push_promotion() {
        // a7-a8=Q is a quiet move (no capture on a8), not generated by
        // `legal_captures` alone.
        let board = Board::from_str("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let mut pos = Position::new(board);
        let mut table = Table::new(1);
        let mut searcher = searcher(&mut table);

        let static_eval = crate::evaluate::evaluate(&pos);
        let score = searcher.quiescence(&mut pos, 0, Score::MINUS_INF, Score::PLUS_INF);
        assert!(score > static_eval);
    }

    #[test]
    fn quiescence_is_a_no_op_on_a_quiet_position() {
        let board = Board::default();
        let mut pos = Position::new(board);
        let mut table = Table::new(1);
        let mut searcher = searcher(&mut table);

        let static_eval = crate::evaluate::evaluate(&pos);
        let score = searcher.quiescence(&mut pos, 0, Score::MINUS_INF, Score::PLUS_INF);
        assert_eq!(score, static_eval);
    }
}
