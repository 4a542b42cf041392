//! Threats and center-control terms (spec.md §4.1.5).
//!
//! "Attacks on king" subsumes spec.md §4.1.4's "direct attack on opposing
//! king" bullet — both describe the same flat per-attacker bonus for a
//! minor/major piece that attacks the enemy king's square, so it's computed
//! once here rather than twice (see DESIGN.md).

use chess::bitboard::Bitboard;
use chess::piece::{Color, PieceType};

use crate::position::Position;
use crate::score::S;

use super::params::{ATTACK_ON_KING, ATTACK_ON_PIECE, CENTER_CONTROL};

const CENTER_SQUARES: [chess::square::Square; 4] = [
    chess::square::Square::D4,
    chess::square::Square::D5,
    chess::square::Square::E4,
    chess::square::Square::E5,
];

pub fn evaluate(position: &Position, color: Color) -> S {
    let board = &position.board;
    let enemy = color.opp();
    let enemy_pieces = board.occupied_by(enemy);
    let enemy_king = board.kings(enemy).first();

    let mut total = S::default();
    let mut credited = Bitboard::EMPTY;

    for kind in [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ] {
        for sq in board.get_bb(kind, color) {
            let attacks = position.attacks_from(sq);

            for target in attacks & enemy_pieces & !credited {
                if let Some((_, target_kind)) = position.piece_at(target) {
                    total += ATTACK_ON_PIECE[target_kind];
                    credited |= Bitboard::from(target);
                }
            }

            if matches!(kind, PieceType::Knight | PieceType::Bishop | PieceType::Rook | PieceType::Queen)
                && attacks.contains(enemy_king)
            {
                total += ATTACK_ON_KING[kind];
            }
        }
    }

    for &sq in &CENTER_SQUARES {
        if board.occupied_by(color).contains(sq) {
            total += CENTER_CONTROL;
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
    fn attacking_a_piece_scores_above_not_attacking_anything() {
        let attacking =
            Position::new(Board::from_str("4k3/8/4r3/8/4N3/8/8/4K3 w - - 0 1").unwrap());
        let quiet = Position::new(Board::from_str("4k3/8/8/8/4N3/8/8/4K3 w - - 0 1").unwrap());

        assert!(evaluate(&attacking, Color::White).mg() > evaluate(&quiet, Color::White).mg());
    }

    #[test]
    fn occupying_a_center_square_is_rewarded() {
        let centered = Position::new(Board::from_str("4k3/8/8/8/3N4/8/8/4K3 w - - 0 1").unwrap());
        let edge = Position::new(Board::from_str("4k3/8/8/8/8/8/8/3NK3 w - - 0 1").unwrap());

        assert!(evaluate(&centered, Color::White).mg() > evaluate(&edge, Color::White).mg());
    }
}
