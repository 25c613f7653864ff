//! Primitive chess types shared by every subsystem.
//!
//! Pieces are stored as signed codes on a 64-square array: the magnitude is the
//! piece kind (`1..=6`), the sign is the side (positive for White, negative for
//! Black) and `0` is an empty square. Square `0` is a8 and square `63` is h1, so
//! White starts on the two bottom rows.
//!
//! The 10x12 mailbox tables let offset walks detect the board edge with a single
//! lookup instead of file/rank arithmetic.

use std::fmt;

/// Board square index (`0..64`, a8 = 0, h1 = 63).
pub type Square = usize;

/// Signed piece code as stored on the board.
pub type PieceCode = i8;

pub const EMPTY: PieceCode = 0;

/// Side of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Sign applied to piece codes of this side.
    #[inline]
    pub const fn sign(self) -> PieceCode {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Color::White => "White",
            Color::Black => "Black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Piece kind. The discriminants are the board codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    King = 5,
    Queen = 6,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::King,
        PieceKind::Queen,
    ];

    #[inline]
    pub const fn code(self) -> PieceCode {
        self as PieceCode
    }

    /// Table index, identical to the unsigned code.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Kind of a signed board code, `None` for an empty square.
    #[inline]
    pub fn from_code(code: PieceCode) -> Option<Self> {
        match code.unsigned_abs() {
            1 => Some(PieceKind::Pawn),
            2 => Some(PieceKind::Knight),
            3 => Some(PieceKind::Bishop),
            4 => Some(PieceKind::Rook),
            5 => Some(PieceKind::King),
            6 => Some(PieceKind::Queen),
            _ => None,
        }
    }

    pub const fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::King => 'K',
            PieceKind::Queen => 'Q',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'P' => Some(PieceKind::Pawn),
            'N' => Some(PieceKind::Knight),
            'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook),
            'K' => Some(PieceKind::King),
            'Q' => Some(PieceKind::Queen),
            _ => None,
        }
    }

    /// Signed board code for this kind on `color`'s side.
    #[inline]
    pub const fn on(self, color: Color) -> PieceCode {
        self.code() * color.sign()
    }
}

/// Owner of a non-empty piece code.
#[inline]
pub fn color_of(code: PieceCode) -> Option<Color> {
    match code {
        c if c > 0 => Some(Color::White),
        c if c < 0 => Some(Color::Black),
        _ => None,
    }
}

#[inline]
pub const fn row_of(square: Square) -> usize {
    square / 8
}

#[inline]
pub const fn file_of(square: Square) -> usize {
    square % 8
}

/// Default king square per side, indexed by `Color::index`.
pub const KING_HOME: [Square; 2] = [60, 4];
pub const KINGSIDE_ROOK_HOME: [Square; 2] = [63, 7];
pub const QUEENSIDE_ROOK_HOME: [Square; 2] = [56, 0];

#[rustfmt::skip]
pub const MAILBOX: [i32; 120] = [
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1,  0,  1,  2,  3,  4,  5,  6,  7, -1,
    -1,  8,  9, 10, 11, 12, 13, 14, 15, -1,
    -1, 16, 17, 18, 19, 20, 21, 22, 23, -1,
    -1, 24, 25, 26, 27, 28, 29, 30, 31, -1,
    -1, 32, 33, 34, 35, 36, 37, 38, 39, -1,
    -1, 40, 41, 42, 43, 44, 45, 46, 47, -1,
    -1, 48, 49, 50, 51, 52, 53, 54, 55, -1,
    -1, 56, 57, 58, 59, 60, 61, 62, 63, -1,
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
];

#[rustfmt::skip]
pub const MAILBOX64: [i32; 64] = [
    21, 22, 23, 24, 25, 26, 27, 28,
    31, 32, 33, 34, 35, 36, 37, 38,
    41, 42, 43, 44, 45, 46, 47, 48,
    51, 52, 53, 54, 55, 56, 57, 58,
    61, 62, 63, 64, 65, 66, 67, 68,
    71, 72, 73, 74, 75, 76, 77, 78,
    81, 82, 83, 84, 85, 86, 87, 88,
    91, 92, 93, 94, 95, 96, 97, 98,
];

/// One mailbox step from `square` in `direction`, `None` when it leaves the board.
#[inline]
pub fn mailbox_step(square: Square, direction: i32) -> Option<Square> {
    let padded = MAILBOX64[square] + direction;
    match MAILBOX[padded as usize] {
        -1 => None,
        target => Some(target as Square),
    }
}

/// Whether the piece kind (by code) slides along its directions.
pub const CAN_SLIDE: [bool; 7] = [false, false, false, true, true, false, true];

/// Number of meaningful entries in `OFFSETS` per piece kind.
pub const OFFSET_AMOUNT: [usize; 7] = [0, 0, 8, 4, 4, 8, 8];

/// Mailbox direction offsets per piece kind (pawns are generated separately).
pub const OFFSETS: [[i32; 8]; 7] = [
    [0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0],
    [-21, -19, -12, -8, 8, 12, 19, 21],
    [-11, -9, 9, 11, 0, 0, 0, 0],
    [-10, -1, 1, 10, 0, 0, 0, 0],
    [-11, -10, -9, -1, 1, 9, 10, 11],
    [-11, -10, -9, -1, 1, 9, 10, 11],
];

/// Directions from an attacked square towards a pawn of the given side that attacks it.
pub const PAWN_ATTACK_OFFSETS: [[i32; 2]; 2] = [[9, 11], [-9, -11]];

/// Active directions of a piece kind.
#[inline]
pub fn directions(kind: PieceKind) -> &'static [i32] {
    let index = kind.index();
    &OFFSETS[index][..OFFSET_AMOUNT[index]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mailbox_step_detects_edges() {
        assert_eq!(mailbox_step(0, -1), None);
        assert_eq!(mailbox_step(0, -10), None);
        assert_eq!(mailbox_step(0, 1), Some(1));
        assert_eq!(mailbox_step(7, 1), None);
        assert_eq!(mailbox_step(63, 10), None);
        assert_eq!(mailbox_step(60, -10), Some(52));
        assert_eq!(mailbox_step(57, -21), Some(40));
    }

    #[test]
    fn piece_codes_carry_side_in_sign() {
        assert_eq!(PieceKind::Queen.on(Color::Black), -6);
        assert_eq!(PieceKind::from_code(-5), Some(PieceKind::King));
        assert_eq!(color_of(-1), Some(Color::Black));
        assert_eq!(color_of(EMPTY), None);
        assert_eq!(directions(PieceKind::Rook), &[-10, -1, 1, 10]);
    }
}
