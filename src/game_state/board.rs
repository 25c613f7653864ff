//! Mailbox board with incremental make/unmake.
//!
//! `make_move` returns the code of the captured piece and `unmake_move` must be
//! handed that exact value back, in strict LIFO order. [`ScopedMove`] pairs the
//! two so an early return cannot leave a trial move on the board.

use std::fmt;
use std::ops::{Deref, DerefMut, Index};

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::*;
use crate::moves::chess_move::{Move, MoveKind};

#[rustfmt::skip]
const START_POSITION: [PieceCode; 64] = [
    -4, -2, -3, -6, -5, -3, -2, -4,
    -1, -1, -1, -1, -1, -1, -1, -1,
     0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,
     1,  1,  1,  1,  1,  1,  1,  1,
     4,  2,  3,  6,  5,  3,  2,  4,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [PieceCode; 64],
    king_squares: [Square; 2],
}

impl Board {
    /// Standard starting position.
    pub fn new() -> Self {
        Self {
            squares: START_POSITION,
            king_squares: KING_HOME,
        }
    }

    /// Builds a board from raw codes. Exactly one king per side is required.
    pub fn from_squares(squares: [PieceCode; 64]) -> ChessResult<Self> {
        let mut king_squares = [None, None];
        for (square, &code) in squares.iter().enumerate() {
            if code.unsigned_abs() > 6 {
                return Err(ChessError::InvalidBoard(format!(
                    "unknown piece code {code} on square {square}"
                )));
            }
            if PieceKind::from_code(code) != Some(PieceKind::King) {
                continue;
            }
            let Some(color) = color_of(code) else {
                continue;
            };
            let slot = &mut king_squares[color.index()];
            if slot.is_some() {
                return Err(ChessError::InvalidBoard(format!(
                    "more than one {} king",
                    color.name()
                )));
            }
            *slot = Some(square);
        }

        match king_squares {
            [Some(white), Some(black)] => Ok(Self {
                squares,
                king_squares: [white, black],
            }),
            _ => Err(ChessError::InvalidBoard(
                "each side needs exactly one king".to_owned(),
            )),
        }
    }

    /// Skips king validation so tests can build corrupt boards.
    #[cfg(test)]
    pub(crate) fn from_squares_unchecked(squares: [PieceCode; 64], king_squares: [Square; 2]) -> Self {
        Self {
            squares,
            king_squares,
        }
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> PieceCode {
        self.squares[square]
    }

    #[inline]
    pub fn squares(&self) -> &[PieceCode; 64] {
        &self.squares
    }

    #[inline]
    pub fn king_square(&self, side: Color) -> Square {
        self.king_squares[side.index()]
    }

    /// Applies `mv` for `side` and returns the captured code (or `EMPTY`).
    pub fn make_move(&mut self, mv: &Move, side: Color) -> PieceCode {
        let (from, to) = (mv.from, mv.to);
        match mv.kind {
            MoveKind::KingsideCastle => {
                self.squares[to] = self.squares[from];
                self.squares[from] = EMPTY;
                self.squares[from + 1] = self.squares[to + 1];
                self.squares[to + 1] = EMPTY;
                self.king_squares[side.index()] = to;
                EMPTY
            }
            MoveKind::QueensideCastle => {
                self.squares[to] = self.squares[from];
                self.squares[from] = EMPTY;
                self.squares[from - 1] = self.squares[to - 2];
                self.squares[to - 2] = EMPTY;
                self.king_squares[side.index()] = to;
                EMPTY
            }
            MoveKind::EnPassant => {
                let victim_square = en_passant_victim(to, side);
                let captured = self.squares[victim_square];
                self.squares[to] = self.squares[from];
                self.squares[from] = EMPTY;
                self.squares[victim_square] = EMPTY;
                captured
            }
            MoveKind::Promotion { piece, .. } => {
                let captured = self.squares[to];
                self.squares[to] = piece.kind().on(side);
                self.squares[from] = EMPTY;
                captured
            }
            _ => {
                let captured = self.squares[to];
                self.squares[to] = self.squares[from];
                self.squares[from] = EMPTY;
                if PieceKind::from_code(self.squares[to]) == Some(PieceKind::King) {
                    self.king_squares[side.index()] = to;
                }
                captured
            }
        }
    }

    /// Exact inverse of [`Board::make_move`].
    pub fn unmake_move(&mut self, mv: &Move, side: Color, captured: PieceCode) {
        let (from, to) = (mv.from, mv.to);
        match mv.kind {
            MoveKind::KingsideCastle => {
                self.squares[from] = self.squares[to];
                self.squares[to] = EMPTY;
                self.squares[to + 1] = self.squares[from + 1];
                self.squares[from + 1] = EMPTY;
                self.king_squares[side.index()] = from;
            }
            MoveKind::QueensideCastle => {
                self.squares[from] = self.squares[to];
                self.squares[to] = EMPTY;
                self.squares[to - 2] = self.squares[from - 1];
                self.squares[from - 1] = EMPTY;
                self.king_squares[side.index()] = from;
            }
            MoveKind::EnPassant => {
                self.squares[from] = self.squares[to];
                self.squares[to] = EMPTY;
                self.squares[en_passant_victim(to, side)] = captured;
            }
            MoveKind::Promotion { .. } => {
                self.squares[from] = PieceKind::Pawn.on(side);
                self.squares[to] = captured;
            }
            _ => {
                self.squares[from] = self.squares[to];
                self.squares[to] = captured;
                if PieceKind::from_code(self.squares[from]) == Some(PieceKind::King) {
                    self.king_squares[side.index()] = from;
                }
            }
        }
    }

    /// Makes `mv` and returns a guard that unmakes it when dropped.
    pub fn make_scoped(&mut self, mv: &Move, side: Color) -> ScopedMove<'_> {
        let captured = self.make_move(mv, side);
        ScopedMove {
            board: self,
            mv: *mv,
            side,
            captured,
        }
    }

    /// No pawns, rooks or queens and at most one minor piece per side.
    pub fn is_insufficient_material(&self) -> bool {
        let mut minors = [0u8; 2];
        for &code in &self.squares {
            let (Some(kind), Some(color)) = (PieceKind::from_code(code), color_of(code)) else {
                continue;
            };
            match kind {
                PieceKind::Pawn | PieceKind::Rook | PieceKind::Queen => return false,
                PieceKind::Knight | PieceKind::Bishop => minors[color.index()] += 1,
                PieceKind::King => {}
            }
        }
        minors.iter().all(|&count| count <= 1)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<Square> for Board {
    type Output = PieceCode;

    #[inline]
    fn index(&self, square: Square) -> &Self::Output {
        &self.squares[square]
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::utils::render_board::render_board(self))
    }
}

/// Square of the pawn removed by an en-passant capture landing on `to`.
#[inline]
fn en_passant_victim(to: Square, side: Color) -> Square {
    match side {
        Color::White => to + 8,
        Color::Black => to - 8,
    }
}

/// A move applied to a board; dropping it restores the previous position.
pub struct ScopedMove<'a> {
    board: &'a mut Board,
    mv: Move,
    side: Color,
    captured: PieceCode,
}

impl ScopedMove<'_> {
    #[inline]
    pub fn captured(&self) -> PieceCode {
        self.captured
    }
}

impl Deref for ScopedMove<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for ScopedMove<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for ScopedMove<'_> {
    fn drop(&mut self) {
        self.board.unmake_move(&self.mv, self.side, self.captured);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::chess_move::PromotionPiece;
    use crate::utils::fen_parser::parse_fen;

    fn assert_restores(fen: &str, mv: Move, side: Color) {
        let (mut board, _) = parse_fen(fen).expect("fixture FEN should parse");
        let before = board.clone();
        let captured = board.make_move(&mv, side);
        assert_ne!(board, before, "move {mv} should change the board");
        board.unmake_move(&mv, side, captured);
        assert_eq!(board, before, "unmake of {mv} should restore the board");
    }

    #[test]
    fn start_position_has_kings_cached() {
        let board = Board::new();
        assert_eq!(board.king_square(Color::White), 60);
        assert_eq!(board.king_square(Color::Black), 4);
        assert_eq!(board[52], 1);
        assert_eq!(board[3], -6);
    }

    #[test]
    fn construction_requires_one_king_per_side() {
        let mut squares = [EMPTY; 64];
        squares[60] = 5;
        assert!(Board::from_squares(squares).is_err());
        squares[4] = -5;
        assert!(Board::from_squares(squares).is_ok());
        squares[5] = -5;
        assert!(Board::from_squares(squares).is_err());
    }

    #[test]
    fn castles_move_king_and_rook_and_restore() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let (mut board, _) = parse_fen(fen).expect("fixture FEN should parse");
        let castle = Move::new(60, 62, MoveKind::KingsideCastle);
        let captured = board.make_move(&castle, Color::White);
        assert_eq!(board[62], 5);
        assert_eq!(board[61], 4);
        assert_eq!(board[63], EMPTY);
        assert_eq!(board.king_square(Color::White), 62);
        board.unmake_move(&castle, Color::White, captured);

        assert_restores(fen, castle, Color::White);
        assert_restores(fen, Move::new(60, 58, MoveKind::QueensideCastle), Color::White);
        assert_restores(fen, Move::new(4, 6, MoveKind::KingsideCastle), Color::Black);
        assert_restores(fen, Move::new(4, 2, MoveKind::QueensideCastle), Color::Black);
    }

    #[test]
    fn en_passant_removes_pawn_behind_target_and_restores() {
        let fen = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1";
        let (mut board, _) = parse_fen(fen).expect("fixture FEN should parse");
        let ep = Move::new(28, 19, MoveKind::EnPassant);
        let captured = board.make_move(&ep, Color::White);
        assert_eq!(captured, -1);
        assert_eq!(board[27], EMPTY);
        assert_eq!(board[19], 1);
        board.unmake_move(&ep, Color::White, captured);
        assert_eq!(board[27], -1);

        assert_restores("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1", Move::new(35, 44, MoveKind::EnPassant), Color::Black);
    }

    #[test]
    fn every_promotion_variant_restores() {
        let fen = "1r2k3/P7/8/8/8/8/7p/4K1N1 w - - 0 1";
        for piece in PromotionPiece::ALL {
            assert_restores(fen, Move::new(8, 0, MoveKind::Promotion { piece, capture: false }), Color::White);
            assert_restores(fen, Move::new(8, 1, MoveKind::Promotion { piece, capture: true }), Color::White);
            assert_restores(fen, Move::new(55, 63, MoveKind::Promotion { piece, capture: false }), Color::Black);
            assert_restores(fen, Move::new(55, 62, MoveKind::Promotion { piece, capture: true }), Color::Black);
        }
    }

    #[test]
    fn king_move_updates_cache_and_restores() {
        let fen = "4k3/8/8/8/8/8/8/4K3 w - - 0 1";
        let (mut board, _) = parse_fen(fen).expect("fixture FEN should parse");
        let mv = Move::new(60, 52, MoveKind::Quiet);
        let captured = board.make_move(&mv, Color::White);
        assert_eq!(board.king_square(Color::White), 52);
        board.unmake_move(&mv, Color::White, captured);
        assert_eq!(board.king_square(Color::White), 60);
        assert_restores(fen, mv, Color::White);
    }

    #[test]
    fn scoped_move_unmakes_on_drop() {
        let mut board = Board::new();
        let before = board.clone();
        {
            let scoped = board.make_scoped(&Move::new(52, 36, MoveKind::DoublePawnPush), Color::White);
            assert_eq!(scoped[36], 1);
            assert_eq!(scoped.captured(), EMPTY);
        }
        assert_eq!(board, before);
    }

    #[test]
    fn insufficient_material_fixtures() {
        let material = |fen: &str| {
            parse_fen(fen)
                .expect("fixture FEN should parse")
                .0
                .is_insufficient_material()
        };
        assert!(material("4k3/8/8/8/8/8/8/4K3 w - - 0 1"));
        assert!(material("4k3/8/8/8/8/8/8/3NK3 w - - 0 1"));
        assert!(material("4k3/8/2b5/8/8/8/8/3NK3 w - - 0 1"));
        assert!(!material("4k3/8/8/8/8/8/8/3RK3 w - - 0 1"));
        assert!(!material("4k3/8/8/8/8/8/8/2NNK3 w - - 0 1"));
        assert!(!material("4k3/4p3/8/8/8/8/8/4K3 w - - 0 1"));
        assert!(!Board::new().is_insufficient_material());
    }
}
