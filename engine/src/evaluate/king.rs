//! King safety and king activity terms (spec.md §4.1.4).

use chess::piece::{Color, PieceType};
use chess::square::Square;

use crate::position::Position;
use crate::score::S;

use super::params::{
    ADVANCED_SHIELD_PAWN, CASTLED_KING, KING_ACTIVITY_SCALAR, KING_ON_CENTER_SQUARE,
    KING_ZONE_ATTACKER_MULTIPLIER, KING_ZONE_WEIGHT, MISSING_SHIELD_PAWN, MOVED_WITHOUT_CASTLING,
    TRAPPED_KING,
};

const CENTER_SQUARES: [Square; 4] = [Square::D4, Square::D5, Square::E4, Square::E5];
const CASTLED_SQUARES: [Square; 4] = [Square::G1, Square::C1, Square::G8, Square::C8];
const WHITE_TRAPPED_SQUARES: [Square; 4] = [Square::F1, Square::F2, Square::D1, Square::D2];
const BLACK_TRAPPED_SQUARES: [Square; 4] = [Square::F8, Square::F7, Square::D8, Square::D7];

fn home_square(color: Color) -> Square {
    if color.is_white() { Square::E1 } else { Square::E8 }
}

/// Distance (in files+ranks) from `sq` to the nearest of the four central
/// squares.
fn distance_to_center(sq: Square) -> usize {
    CENTER_SQUARES.iter().map(|&c| sq.distance(c)).min().unwrap()
}

pub fn evaluate(position: &Position, color: Color) -> S {
    let board = &position.board;
    let king_sq = board.kings(color).first();
    let own_pawns = board.pawns(color);

    let mut total = S::default();

    ////////////////////////////////////////////////////////////////////////
    // Pawn shield
    ////////////////////////////////////////////////////////////////////////

    let file = king_sq.file();
    if file <= 2 || file >= 5 {
        let wing_files: [usize; 3] = if file <= 2 { [0, 1, 2] } else { [5, 6, 7] };
        let (home_rank, advanced_rank) = if color.is_white() { (1, 2) } else { (6, 5) };

        for f in wing_files {
            let home = Square::from(home_rank * 8 + f);
            if own_pawns.contains(home) {
                continue;
            }

            let advanced = Square::from(advanced_rank * 8 + f);
            total += if own_pawns.contains(advanced) {
                ADVANCED_SHIELD_PAWN
            } else {
                MISSING_SHIELD_PAWN
            };
        }
    }

    ////////////////////////////////////////////////////////////////////////
    // King attack zone: how exposed is this king to the enemy's minor/major
    // pieces. A penalty on this color, scaled by how many attackers join in.
    ////////////////////////////////////////////////////////////////////////

    let zone = king_sq.king_squares() | chess::bitboard::Bitboard::from(king_sq);
    let enemy = color.opp();

    let mut raw_attack = 0i32;
    let mut attacker_count = 0usize;

    for (kind, pieces) in [
        (PieceType::Knight, board.knights(enemy)),
        (PieceType::Bishop, board.bishops(enemy)),
        (PieceType::Rook, board.rooks(enemy)),
        (PieceType::Queen, board.queens(enemy)),
    ] {
        for sq in pieces {
            let attacks = position.attacks_from(sq) & zone;
            if attacks.is_empty() {
                continue;
            }
            attacker_count += 1;
            raw_attack += attacks.count() as i32 * KING_ZONE_WEIGHT[kind];
        }
    }

    let percent = KING_ZONE_ATTACKER_MULTIPLIER[attacker_count.min(7)];
    total -= S::new(raw_attack * percent / 100, 0);

    ////////////////////////////////////////////////////////////////////////
    // King activity (endgame): reward centralization once the middlegame
    // has receded.
    ////////////////////////////////////////////////////////////////////////

    if board.full_moves > 30 {
        let closeness = 7 - distance_to_center(king_sq) as i32;
        total += S::new(0, closeness * KING_ACTIVITY_SCALAR);
    }

    ////////////////////////////////////////////////////////////////////////
    // Miscellaneous positional bonuses/penalties
    ////////////////////////////////////////////////////////////////////////

    if CENTER_SQUARES.contains(&king_sq) {
        total += KING_ON_CENTER_SQUARE;
    }

    if CASTLED_SQUARES.contains(&king_sq) {
        total += CASTLED_KING;
    }

    if king_sq != home_square(color)
        && (position.has_kingside_castling_rights(color)
            || position.has_queenside_castling_rights(color))
    {
        total += MOVED_WITHOUT_CASTLING;
    }

    let trapped_squares = if color.is_white() { &WHITE_TRAPPED_SQUARES } else { &BLACK_TRAPPED_SQUARES };
    if trapped_squares.contains(&king_sq) {
        total += TRAPPED_KING;
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::board::Board;
    use std::str::FromStr;

    #[test]
    fn bare_king_without_shield_is_penalized_relative_to_sheltered_king() {
        let exposed = Position::new(Board::from_str("4k3/8/8/8/8/8/8/6K1 w - - 0 1").unwrap());
        let sheltered =
            Position::new(Board::from_str("4k3/8/8/8/8/8/5PPP/6K1 w - - 0 1").unwrap());

        assert!(evaluate(&sheltered, Color::White).mg() > evaluate(&exposed, Color::White).mg());
    }

    #[test]
    fn king_on_center_square_is_penalized() {
        let centered = Position::new(Board::from_str("4k3/8/8/3K4/8/8/8/8 w - - 0 1").unwrap());
        let corner = Position::new(Board::from_str("4k3/8/8/8/8/8/8/7K w - - 0 1").unwrap());

        assert!(evaluate(&corner, Color::White).mg() > evaluate(&centered, Color::White).mg());
    }

    #[test]
    fn centralized_king_scores_better_in_the_endgame_after_move_thirty() {
        let centered =
            Position::new(Board::from_str("4k3/8/8/3K4/8/8/8/8 b - - 0 31").unwrap());
        let corner = Position::new(Board::from_str("4k3/8/8/8/8/8/8/7K b - - 0 31").unwrap());

        assert!(evaluate(&centered, Color::White).eg() > evaluate(&corner, Color::White).eg());
    }
}
