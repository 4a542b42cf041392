//! [`Position`] wraps a [`Board`] with the bookkeeping the board library
//! itself doesn't own: a running Zobrist hash and the history needed to
//! detect repetitions, plus a make/unmake stack so the search can walk the
//! tree and always restore the board on every return path.
//!
//! `Board::play_move` is a pure function (it returns a new board rather than
//! mutating in place), so `make`/`unmake` here just push/pop the previous
//! board and hash rather than trying to undo individual field writes.

use chess::board::Board;
use chess::movegen::castling::CastleType;
use chess::movegen::legal_moves::{All, Captures};
use chess::movegen::moves::{BareMove, Move};
use chess::piece::{Color, Piece, PieceType};
use chess::square::Square;

use crate::zobrist::ZHash;

/// We never expect to need more than this many plies of unmake history in a
/// single search (see `MAX_PLY` in `search::params`); bound it generously so
/// a runaway game of null moves can't grow it unbounded in debug builds.
const HIST_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct Position {
    pub board: Board,
    pub hash: ZHash,
    board_stack: Vec<Board>,
    hash_history: Vec<ZHash>,
}

impl Position {
    pub fn new(board: Board) -> Self {
        let hash = ZHash::from(&board);
        Position {
            board,
            hash,
            board_stack: Vec::with_capacity(HIST_CAPACITY),
            hash_history: Vec::with_capacity(HIST_CAPACITY),
        }
    }

    ////////////////////////////////////////////////////////////////////////
    // External interface (spec.md §6)
    ////////////////////////////////////////////////////////////////////////

    pub fn turn(&self) -> Color {
        self.board.current
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.board.legal_moves::<All>()
    }

    pub fn legal_captures(&self) -> Vec<Move> {
        self.board.legal_moves::<Captures>()
    }

    /// Captures plus non-capture promotions: the "noisy" move set quiescence
    /// searches (spec.md §4.3). The board crate's `Captures` generator only
    /// emits promotions that are *also* captures; a pawn queening by a quiet
    /// push is generated in its `QUIETS` branch, so it has to be pulled out
    /// of the full move list separately.
    pub fn legal_noisy(&self) -> Vec<Move> {
        let mut moves = self.board.legal_moves::<Captures>();
        moves.extend(
            self.board
                .legal_moves::<All>()
                .into_iter()
                .filter(|mv| mv.get_promo_type().is_some() && !mv.is_capture()),
        );
        moves
    }

    pub fn make(&mut self, mv: Move) {
        self.board_stack.push(self.board);
        self.hash_history.push(self.hash);
        self.board = self.board.play_move(mv);
        self.hash = ZHash::from(&self.board);
    }

    pub fn unmake(&mut self) {
        self.board = self
            .board_stack
            .pop()
            .expect("unmake() called without a matching make()");
        self.hash = self
            .hash_history
            .pop()
            .expect("unmake() called without a matching make()");
    }

    pub fn make_null(&mut self) {
        self.make(Move::NULL);
    }

    pub fn unmake_null(&mut self) {
        self.unmake();
    }

    pub fn is_check(&self) -> bool {
        self.board.in_check()
    }

    pub fn is_capture(&self, mv: Move) -> bool {
        mv.is_capture()
    }

    pub fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_stalemate() || self.is_insufficient_material()
    }

    pub fn is_checkmate(&self) -> bool {
        self.is_check() && self.legal_moves().is_empty()
    }

    pub fn is_stalemate(&self) -> bool {
        !self.is_check() && self.legal_moves().is_empty()
    }

    pub fn is_insufficient_material(&self) -> bool {
        self.board.insufficient_material()
    }

    pub fn is_fifty_move(&self) -> bool {
        self.board.half_moves >= 100
    }

    /// A position repeats if the same hash occurred earlier at a matching
    /// parity (only positions with the same side to move can repeat).
    pub fn is_repetition(&self) -> bool {
        self.hash_history
            .iter()
            .rev()
            .skip(1)
            .step_by(2)
            .any(|&prior| prior == self.hash)
    }

    pub fn piece_at(&self, sq: Square) -> Option<(Color, PieceType)> {
        self.board
            .get_at(sq)
            .map(|piece| (piece.color(), piece.piece_type()))
    }

    pub fn pieces(&self, kind: PieceType, color: Color) -> chess::bitboard::Bitboard {
        self.board.get_bb(kind, color)
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        let kings = self.board.kings(color);
        if kings.is_empty() {
            None
        } else {
            Some(kings.first())
        }
    }

    /// Bitboard of squares attacked by whatever piece sits on `sq` (empty if
    /// the square is unoccupied).
    pub fn attacks_from(&self, sq: Square) -> chess::bitboard::Bitboard {
        use chess::bitboard::Bitboard;
        use PieceType::*;

        let Some((color, kind)) = self.piece_at(sq) else {
            return Bitboard::EMPTY;
        };

        let blockers = self.board.all_occupied();
        let ours = self.board.occupied_by(color);
        let theirs = self.board.occupied_by(color.opp());

        match kind {
            Pawn => sq.pawn_attacks(color),
            Knight => sq.knight_squares(),
            King => sq.king_squares(),
            Bishop | Rook | Queen => {
                chess::piece::Piece::new(kind, color).visible_squares(sq, ours, theirs)
            }
        }
    }

    pub fn is_attacked_by(&self, color: Color, sq: Square) -> bool {
        let attackers = self.board.attackers(sq, self.board.all_occupied());
        !(attackers & self.board.occupied_by(color)).is_empty()
    }

    pub fn zobrist_hash(&self) -> u64 {
        self.hash.0
    }

    pub fn fullmove_number(&self) -> u32 {
        self.board.full_moves as u32
    }

    pub fn has_kingside_castling_rights(&self, color: Color) -> bool {
        let ctype = if color.is_white() { CastleType::WK } else { CastleType::BK };
        self.board.castling_rights.is_available(ctype)
    }

    pub fn has_queenside_castling_rights(&self, color: Color) -> bool {
        let ctype = if color.is_white() { CastleType::WQ } else { CastleType::BQ };
        self.board.castling_rights.is_available(ctype)
    }

    /// Find the legal move matching `candidate`'s source, target, and
    /// promotion kind (e.g. for validating a book or TT move against the
    /// current position). Matches by those three fields rather than full
    /// structural equality: a `Move` parsed from a bare UCI string (as book
    /// and TT moves are) always carries `MoveType::Quiet`, so it would never
    /// equal the `Capture`/`EnPassant`/`*Castle`-typed legal move it's
    /// actually meant to name.
    pub fn find_legal(&self, candidate: Move) -> Option<Move> {
        let promo_type = candidate
            .get_promo_type()
            .map(|kind| Piece::new(kind, self.turn()));
        let bare = BareMove::new(candidate.src(), candidate.tgt(), promo_type);
        self.board.find_move(bare)
    }
}
