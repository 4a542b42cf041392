//! Iterative deepening (spec.md §4.6): the entry point external callers
//! actually use. Owns the transposition table and heuristic state for one
//! `find_best_move` call, re-searching at increasing depth until the time
//! budget or `max_depth` runs out, printing a UCI `info` line after every
//! completed iteration.

use std::time::{Duration, Instant};

use chess::movegen::moves::Move;

use crate::book::OpeningBook;
use crate::heuristics::HISTORY_CAP;
use crate::position::Position;
use crate::score::{Score, ScoreExt, MATE};
use crate::transposition::Table;
use crate::uci_info::SearchInfo;

use super::Searcher;

/// Re-search depth 1 with a generous allowance, so the engine always comes
/// away with *some* move even if `time_limit` turns out to be unreasonably
/// tight (spec.md §4.6 step 3).
const FIRST_ITERATION_TIME_FACTOR: f64 = 2.0;
const LATER_ITERATION_TIME_FACTOR: f64 = 0.95;

/// How many iterative-deepening depths between history-table aging passes
/// (spec.md §4.6 step 4).
const HISTORY_AGING_INTERVAL: u8 = 5;

/// A mate score this close to [`MATE`] is treated as "forced", stopping
/// iterative deepening early (spec.md §4.6 step 4: no point searching
/// deeper once a mate has been found).
const FORCED_MATE_MARGIN: Score = 100;

/// Search `position` to `max_depth`, or until `time_limit` (if given) runs
/// out, and return the best move found (spec.md §4.6).
pub fn find_best_move(
    position: &mut Position,
    max_depth: u8,
    time_limit: Option<Duration>,
    book: &dyn OpeningBook,
) -> Option<Move> {
    // Step 1: book lookup.
    if let Some(book_move) = book.lookup(position) {
        if position.find_legal(book_move).is_some() {
            return Some(book_move);
        }
    }

    // Step 2: fresh heuristic state for this call.
    let mut table = Table::default();
    let start = Instant::now();
    let deadline_for = |factor: f64| match time_limit {
        Some(limit) => start + Duration::from_secs_f64(limit.as_secs_f64() * factor),
        None => start + Duration::from_secs(u64::MAX / 2),
    };

    let mut searcher = Searcher::new(&mut table, deadline_for(FIRST_ITERATION_TIME_FACTOR));

    let mut best_overall: Option<Move> = None;

    // Step 3/4: iterative deepening.
    for depth in 1..=max_depth {
        searcher.deadline = deadline_for(if depth == 1 {
            FIRST_ITERATION_TIME_FACTOR
        } else {
            LATER_ITERATION_TIME_FACTOR
        });

        let iteration_start = Instant::now();
        let (score, best) = searcher.negamax_root(position, depth, best_overall);
        let elapsed = start.elapsed();

        if let Some(mv) = best {
            if position.find_legal(mv).is_some() {
                best_overall = Some(mv);

                let info = SearchInfo {
                    depth,
                    seldepth: searcher.seldepth,
                    time_ms: elapsed.as_millis() as u64,
                    nodes: searcher.nodes,
                    score,
                    pv: vec![mv],
                };
                println!("{info}");
            }
        }

        if depth % HISTORY_AGING_INTERVAL == 0 && searcher.heuristics.history.max() > HISTORY_CAP {
            searcher.heuristics.history.halve();
        }

        if score.is_mate() && score.abs() > MATE - FORCED_MATE_MARGIN {
            break;
        }

        if searcher.aborted {
            break;
        }

        let elapsed_last_iter = iteration_start.elapsed();
        if let Some(limit) = time_limit {
            if elapsed + elapsed_last_iter * 3 > limit {
                break;
            }
        }
    }

    // Step 5: fallback.
    match best_overall {
        Some(mv) if position.find_legal(mv).is_some() => Some(mv),
        _ => {
            if best_overall.is_some() {
                eprintln!("[warning] search returned an illegal move, falling back to the first legal move");
            }
            position.legal_moves().into_iter().next()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::NoBook;
    use chess::board::Board;
    use chess::movegen::moves::BareMove;
    use std::str::FromStr;

    #[test]
    fn finds_mate_in_one_within_a_generous_time_budget() {
        let board = Board::from_str("rnbqkbnr/pppp1ppp/8/4p2Q/4P3/8/PPPP1PPP/RNB1KBNR w KQkq - 2 3").unwrap();
        let mut position = Position::new(board);

        let best = find_best_move(&mut position, 4, Some(Duration::from_secs(5)), &NoBook);
        // `Qxf7` is a capture; a bare UCI string always parses as quiet, so
        // compare by source/target/promotion only.
        assert_eq!(best.unwrap(), BareMove::from_str("h5f7").unwrap());
    }

    #[test]
    fn falls_back_to_the_first_legal_move_when_depth_is_zero() {
        let mut position = Position::new(Board::default());
        let best = find_best_move(&mut position, 0, Some(Duration::from_secs(1)), &NoBook);
        assert!(best.is_some());
    }

    #[test]
    fn returns_none_when_there_is_no_legal_move() {
        let board = Board::from_str("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let mut position = Position::new(board);
        assert!(position.is_stalemate());

        let best = find_best_move(&mut position, 3, Some(Duration::from_secs(1)), &NoBook);
        assert_eq!(best, None);
    }

    #[test]
    fn a_legal_book_move_short_circuits_the_search() {
        struct AlwaysE4;
        impl OpeningBook for AlwaysE4 {
            fn lookup(&self, _position: &Position) -> Option<Move> {
                Some(Move::from_str("e2e4").unwrap())
            }
        }

        let mut position = Position::new(Board::default());
        let best = find_best_move(&mut position, 10, Some(Duration::from_secs(5)), &AlwaysE4);
        assert_eq!(best, Some(Move::from_str("e2e4").unwrap()));
    }
}
