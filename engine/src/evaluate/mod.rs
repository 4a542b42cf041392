//! Tapered static evaluation (spec.md §4.1).
//!
//! [`evaluate`] is a pure function from a [`Position`] to a centipawn
//! [`Score`], taken from the side-to-move's perspective. It composes
//! material + piece-square tables, pawn structure, minor/major piece
//! terms, king safety/activity, and threats/center-control for each color,
//! then interpolates the midgame/endgame halves by the position's phase.

mod king;
mod params;
mod pawns;
mod pieces;
mod threats;

use chess::piece::{Color, PieceType};

use crate::position::Position;
use crate::score::{Score, S};

pub use params::{MVV_LVA, PST};

/// Pure function: position -> centipawn score, from the side-to-move's
/// perspective. Safe to call on a terminal position (spec.md §4.1).
pub fn evaluate(position: &Position) -> Score {
    if position.is_checkmate() {
        return -crate::score::MATE;
    }

    if position.is_stalemate()
        || position.is_insufficient_material()
        || position.is_fifty_move()
    {
        return 0;
    }

    let white = material_and_pst(position, Color::White) + structural(position, Color::White);
    let black = material_and_pst(position, Color::Black) + structural(position, Color::Black);
    let total = white - black;

    let mg_total = total.mg();
    let eg_total = total.eg();

    // Promotions can push material above the normal starting phase count, so
    // clamp before interpolating (spec.md §3: phase sum clamped to 24).
    let phase = position.board.phase().min(24);
    let tapered = (mg_total * phase as Score + eg_total * (24 - phase as Score)) / 24;

    if position.turn().is_white() { tapered } else { -tapered }
}

fn material_and_pst(position: &Position, color: Color) -> S {
    let board = &position.board;
    let mut total = S::default();

    for kind in [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ] {
        for sq in board.get_bb(kind, color) {
            let pst_sq = if color.is_white() { sq } else { chess::square::Square::from(sq as usize ^ 56) };
            total += params::PIECE_VALUES[kind] + PST[kind][pst_sq];
        }
    }

    total
}

fn structural(position: &Position, color: Color) -> S {
    pawns::evaluate(position, color)
        + pieces::evaluate(position, color)
        + king::evaluate(position, color)
        + threats::evaluate(position, color)
}
