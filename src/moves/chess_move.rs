//! Move value type.
//!
//! A move is a from/to square pair, a closed [`MoveKind`] and an ordering score.
//! The score only drives move ordering and never takes part in equality.

use std::fmt;

use crate::game_state::chess_types::{PieceKind, Square};
use crate::moves::notation::square_name;

/// Piece a pawn can promote to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromotionPiece {
    Knight,
    Bishop,
    Rook,
    Queen,
}

impl PromotionPiece {
    pub const ALL: [PromotionPiece; 4] = [
        PromotionPiece::Knight,
        PromotionPiece::Bishop,
        PromotionPiece::Rook,
        PromotionPiece::Queen,
    ];

    #[inline]
    pub const fn kind(self) -> PieceKind {
        match self {
            PromotionPiece::Knight => PieceKind::Knight,
            PromotionPiece::Bishop => PieceKind::Bishop,
            PromotionPiece::Rook => PieceKind::Rook,
            PromotionPiece::Queen => PieceKind::Queen,
        }
    }

    pub fn from_kind(kind: PieceKind) -> Option<Self> {
        match kind {
            PieceKind::Knight => Some(PromotionPiece::Knight),
            PieceKind::Bishop => Some(PromotionPiece::Bishop),
            PieceKind::Rook => Some(PromotionPiece::Rook),
            PieceKind::Queen => Some(PromotionPiece::Queen),
            _ => None,
        }
    }

    /// Ordering bonus added to promotion moves.
    #[inline]
    pub const fn ordering_bonus(self) -> i32 {
        match self {
            PromotionPiece::Knight => 320,
            PromotionPiece::Bishop => 330,
            PromotionPiece::Rook => 400,
            PromotionPiece::Queen => 900,
        }
    }
}

/// What a move does besides relocating a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Quiet,
    DoublePawnPush,
    KingsideCastle,
    QueensideCastle,
    Capture,
    EnPassant,
    Promotion { piece: PromotionPiece, capture: bool },
}

impl MoveKind {
    #[inline]
    pub const fn is_capture(self) -> bool {
        matches!(
            self,
            MoveKind::Capture | MoveKind::EnPassant | MoveKind::Promotion { capture: true, .. }
        )
    }

    #[inline]
    pub const fn is_castle(self) -> bool {
        matches!(self, MoveKind::KingsideCastle | MoveKind::QueensideCastle)
    }

    #[inline]
    pub const fn promotion(self) -> Option<PromotionPiece> {
        match self {
            MoveKind::Promotion { piece, .. } => Some(piece),
            _ => None,
        }
    }
}

/// MVV-LVA ordering scores indexed `[attacker][victim]` by piece code.
/// Capturing a king never happens in legal play and scores zero.
#[rustfmt::skip]
pub const MVV_LVA: [[i32; 7]; 7] = [
    [0,   0,   0,   0,   0, 0,   0],
    [0, 105, 205, 305, 405, 0, 505],
    [0, 104, 204, 304, 404, 0, 504],
    [0, 103, 203, 303, 403, 0, 503],
    [0, 102, 202, 302, 402, 0, 502],
    [0, 100, 200, 300, 400, 0, 500],
    [0, 101, 201, 301, 401, 0, 501],
];

#[inline]
pub fn capture_score(attacker: PieceKind, victim: PieceKind) -> i32 {
    MVV_LVA[attacker.index()][victim.index()]
}

#[derive(Debug, Clone, Copy)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub kind: MoveKind,
    pub score: i32,
}

/// Reserved "no move" value.
pub const NULL_MOVE: Move = Move {
    from: 0,
    to: 0,
    kind: MoveKind::Quiet,
    score: 0,
};

impl Move {
    #[inline]
    pub const fn new(from: Square, to: Square, kind: MoveKind) -> Self {
        Self {
            from,
            to,
            kind,
            score: 0,
        }
    }

    #[inline]
    pub const fn scored(from: Square, to: Square, kind: MoveKind, score: i32) -> Self {
        Self {
            from,
            to,
            kind,
            score,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        *self == NULL_MOVE
    }

    /// Long algebraic form (`e2e4`, `e7e8q`), used in logs.
    pub fn long_algebraic(&self) -> String {
        let mut text = format!("{}{}", square_name(self.from), square_name(self.to));
        if let Some(piece) = self.kind.promotion() {
            text.push(piece.kind().letter().to_ascii_lowercase());
        }
        text
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        if self.from != other.from || self.to != other.to {
            return false;
        }
        match (self.kind.promotion(), other.kind.promotion()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.kind == other.kind,
            _ => false,
        }
    }
}

impl Eq for Move {}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("0000");
        }
        f.write_str(&self.long_algebraic())
    }
}

/// Sorts moves by ordering score, best first.
#[inline]
pub fn sort_by_score(moves: &mut [Move]) {
    moves.sort_by(|a, b| b.score.cmp(&a.score));
}
