//! Non-placement game state: side to move, castle rights, en-passant targets.
//!
//! These changes are not reversible from the move alone, so search copies the
//! record before a trial move and updates the copy.

use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::moves::chess_move::{Move, MoveKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameInformation {
    pub side_to_move: Color,
    kingside_castle: [bool; 2],
    queenside_castle: [bool; 2],
    has_castled: [bool; 2],
    /// Square a pawn of the indexed side may capture onto en passant.
    en_passant: [Option<Square>; 2],
}

impl GameInformation {
    /// State at the start of a game: White to move, all rights held.
    pub fn new() -> Self {
        Self {
            side_to_move: Color::White,
            kingside_castle: [true; 2],
            queenside_castle: [true; 2],
            has_castled: [false; 2],
            en_passant: [None; 2],
        }
    }

    /// State with no castle rights and no en-passant target.
    pub fn without_rights(side_to_move: Color) -> Self {
        Self {
            side_to_move,
            kingside_castle: [false; 2],
            queenside_castle: [false; 2],
            has_castled: [false; 2],
            en_passant: [None; 2],
        }
    }

    #[inline]
    pub fn kingside_castle_right(&self, side: Color) -> bool {
        self.kingside_castle[side.index()]
    }

    #[inline]
    pub fn queenside_castle_right(&self, side: Color) -> bool {
        self.queenside_castle[side.index()]
    }

    #[inline]
    pub fn has_castled(&self, side: Color) -> bool {
        self.has_castled[side.index()]
    }

    /// En-passant target available to `side`.
    #[inline]
    pub fn en_passant_square(&self, side: Color) -> Option<Square> {
        self.en_passant[side.index()]
    }

    pub fn set_castle_rights(&mut self, side: Color, kingside: bool, queenside: bool) {
        self.kingside_castle[side.index()] = kingside;
        self.queenside_castle[side.index()] = queenside;
    }

    pub fn set_has_castled(&mut self, side: Color, castled: bool) {
        self.has_castled[side.index()] = castled;
    }

    pub fn set_en_passant_square(&mut self, side: Color, square: Option<Square>) {
        self.en_passant[side.index()] = square;
    }

    /// Brings the record up to date after `mv` was made on `board` by the side to move.
    pub fn update(&mut self, board: &Board, mv: &Move) {
        let mover = self.side_to_move;

        if mv.kind.is_castle() {
            self.has_castled[mover.index()] = true;
        }

        // Rights only ever shrink: a king or rook away from home loses them for good.
        for side in [Color::White, Color::Black] {
            let s = side.index();
            let king = PieceKind::King.on(side);
            let rook = PieceKind::Rook.on(side);
            if board.piece_at(KING_HOME[s]) != king {
                self.kingside_castle[s] = false;
                self.queenside_castle[s] = false;
            }
            if board.piece_at(KINGSIDE_ROOK_HOME[s]) != rook {
                self.kingside_castle[s] = false;
            }
            if board.piece_at(QUEENSIDE_ROOK_HOME[s]) != rook {
                self.queenside_castle[s] = false;
            }
        }

        self.en_passant = [None; 2];
        if mv.kind == MoveKind::DoublePawnPush {
            let passed = match mover {
                Color::White => mv.to + 8,
                Color::Black => mv.to - 8,
            };
            self.en_passant[mover.opposite().index()] = Some(passed);
        }

        self.side_to_move = mover.opposite();
    }

    /// Copy of `self` updated for `mv`; the original stays untouched.
    pub fn after(&self, board: &Board, mv: &Move) -> Self {
        let mut next = self.clone();
        next.update(board, mv);
        next
    }
}

impl Default for GameInformation {
    fn default() -> Self {
        Self::new()
    }
}

/// Updates `info` once `mv` has been made on `board` by the side to move.
pub fn update_game_information(board: &Board, mv: &Move, info: &mut GameInformation) {
    info.update(board, mv);
}
