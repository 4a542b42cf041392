//! Minor/major piece terms (spec.md §4.1.3): rook file and rank bonuses,
//! the bishop pair, and knight outposts.

use chess::constants::FILES;
use chess::piece::Color;

use crate::position::Position;
use crate::score::S;

use super::pawns::{adjacent_files, is_defended_by_pawn, ranks_ahead_of};
use super::params::{
    BISHOP_PAIR, KNIGHT_OUTPOST, ROOK_OPEN_FILE, ROOK_SEMIOPEN_FILE, ROOK_SEVENTH_RANK,
};

pub fn evaluate(position: &Position, color: Color) -> S {
    let board = &position.board;
    let own_pawns = board.pawns(color);
    let enemy_pawns = board.pawns(color.opp());

    let mut total = S::default();

    let seventh_rank = if color.is_white() { 6 } else { 1 };
    for rook in board.rooks(color) {
        let file = FILES[rook.file()];
        let no_own_pawns = (file & own_pawns).is_empty();
        let no_enemy_pawns = (file & enemy_pawns).is_empty();

        if no_own_pawns && no_enemy_pawns {
            total += ROOK_OPEN_FILE;
        } else if no_own_pawns {
            total += ROOK_SEMIOPEN_FILE;
        }

        if rook.rank() == seventh_rank {
            total += ROOK_SEVENTH_RANK;
        }
    }

    if board.bishops(color).count() == 2 {
        total += BISHOP_PAIR;
    }

    let outpost_ranks = if color.is_white() { 4..8 } else { 0..4 };
    for knight in board.knights(color) {
        if !outpost_ranks.contains(&knight.rank()) {
            continue;
        }

        let supported = is_defended_by_pawn(knight, color, own_pawns);
        if !supported {
            continue;
        }

        // No enemy pawn anywhere on an adjacent file, ahead of the knight,
        // can ever capture it by advancing.
        let threatened_by = adjacent_files(knight.file()) & ranks_ahead_of(color, knight.rank());
        if (threatened_by & enemy_pawns).is_empty() {
            total += KNIGHT_OUTPOST;
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::board::Board;
    use std::str::FromStr;

    #[test]
    fn rook_on_open_file_beats_rook_on_closed_file() {
        let open = Position::new(Board::from_str("4k3/8/8/8/8/8/p6p/R3K2R w KQ - 0 1").unwrap());
        let closed =
            Position::new(Board::from_str("4k3/8/8/8/8/8/P6P/R3K2R w KQ - 0 1").unwrap());

        assert!(evaluate(&open, Color::White).mg() > evaluate(&closed, Color::White).mg());
    }

    #[test]
    fn bishop_pair_is_rewarded() {
        let pair = Position::new(Board::from_str("4k3/8/8/8/8/8/8/2B1KB2 w - - 0 1").unwrap());
        let single = Position::new(Board::from_str("4k3/8/8/8/8/8/8/3BK3 w - - 0 1").unwrap());

        assert!(evaluate(&pair, Color::White).mg() > evaluate(&single, Color::White).mg());
    }

    #[test]
    fn supported_knight_on_rank_five_is_an_outpost() {
        let outpost =
            Position::new(Board::from_str("4k3/8/8/3N4/2P5/8/8/4K3 w - - 0 1").unwrap());
        let no_support =
            Position::new(Board::from_str("4k3/8/8/3N4/8/8/8/4K3 w - - 0 1").unwrap());

        assert!(evaluate(&outpost, Color::White).mg() > evaluate(&no_support, Color::White).mg());
    }
}
