//! Zobrist hashing of positions.
//!
//! One table of 781 keys follows the Polyglot layout: 768 piece/square keys,
//! 4 castle-right keys, 8 en-passant file keys and one side-to-move key. The
//! built-in table is generated from a fixed seed so hashes are deterministic
//! across runs. A different table, such as the published Polyglot one, can be
//! loaded from text with [`ZobristKeys::parse`] so third-party books resolve.
//! Two hashes are built from a table: [`compute_hash`] for the transposition
//! table and [`book_key`] for opening-book lookups.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use tracing::debug;

use crate::errors::{ChessError, ChessResult};
use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::game_information::GameInformation;

pub const KEY_COUNT: usize = 781;
const CASTLE_OFFSET: usize = 768;
const EN_PASSANT_OFFSET: usize = 772;
const TURN_OFFSET: usize = 780;

static GENERATED: OnceLock<ZobristKeys> = OnceLock::new();

/// A full table of hashing keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZobristKeys {
    keys: Box<[u64; KEY_COUNT]>,
}

#[inline]
fn next_random_u64(state: &mut u64) -> u64 {
    // splitmix64
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Polyglot piece number: pawns, knights, bishops, rooks, queens, kings, black before white.
#[inline]
fn polyglot_piece(kind: PieceKind, color: Color) -> usize {
    let kind_order = match kind {
        PieceKind::Pawn => 0,
        PieceKind::Knight => 1,
        PieceKind::Bishop => 2,
        PieceKind::Rook => 3,
        PieceKind::Queen => 4,
        PieceKind::King => 5,
    };
    kind_order * 2 + usize::from(color == Color::White)
}

impl ZobristKeys {
    /// The built-in table shared by the whole process.
    pub fn generated() -> &'static ZobristKeys {
        GENERATED.get_or_init(|| {
            let mut seed: u64 = 0x9E37_79B9_7F4A_7C15;
            let mut keys = Box::new([0u64; KEY_COUNT]);
            for key in keys.iter_mut() {
                *key = next_random_u64(&mut seed);
            }
            ZobristKeys { keys }
        })
    }

    pub fn from_keys(keys: [u64; KEY_COUNT]) -> Self {
        Self { keys: Box::new(keys) }
    }

    /// Reads exactly 781 `0x`-prefixed hexadecimal keys, in table order. Any
    /// other text between them (commas, `U64(...)` wrappers, comments without
    /// hex literals) is ignored, so a C source listing can be used directly.
    pub fn parse(text: &str) -> ChessResult<Self> {
        let mut keys = Box::new([0u64; KEY_COUNT]);
        let mut count = 0;
        let literals = text
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter_map(|token| token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")));
        for digits in literals {
            let digits = digits.trim_end_matches(|c: char| matches!(c, 'u' | 'U' | 'l' | 'L'));
            let value = u64::from_str_radix(digits, 16)
                .map_err(|err| ChessError::Book(format!("bad key 0x{digits}: {err}")))?;
            let slot = keys
                .get_mut(count)
                .ok_or_else(|| ChessError::Book(format!("more than {KEY_COUNT} keys in key table")))?;
            *slot = value;
            count += 1;
        }
        if count != KEY_COUNT {
            return Err(ChessError::Book(format!(
                "key table has {count} keys, expected {KEY_COUNT}"
            )));
        }
        Ok(Self { keys })
    }

    pub fn from_path(path: impl AsRef<Path>) -> ChessResult<Self> {
        let keys = Self::parse(&fs::read_to_string(path.as_ref())?)?;
        debug!(path = %path.as_ref().display(), "zobrist key table loaded");
        Ok(keys)
    }

    /// Key of a piece standing on `square`.
    #[inline]
    pub fn piece_square_key(&self, kind: PieceKind, color: Color, square: Square) -> u64 {
        let rank = 7 - row_of(square);
        self.keys[64 * polyglot_piece(kind, color) + 8 * rank + file_of(square)]
    }

    fn placement_and_rights(&self, board: &Board, info: &GameInformation) -> u64 {
        let mut key = 0u64;
        for (square, &code) in board.squares().iter().enumerate() {
            if let (Some(kind), Some(color)) = (PieceKind::from_code(code), color_of(code)) {
                key ^= self.piece_square_key(kind, color, square);
            }
        }

        let rights = [
            info.kingside_castle_right(Color::White),
            info.queenside_castle_right(Color::White),
            info.kingside_castle_right(Color::Black),
            info.queenside_castle_right(Color::Black),
        ];
        for (offset, held) in rights.into_iter().enumerate() {
            if held {
                key ^= self.keys[CASTLE_OFFSET + offset];
            }
        }
        key
    }

    /// Transposition-table hash: placement, rights, any en-passant file, side key when Black moves.
    pub fn position_hash(&self, board: &Board, info: &GameInformation) -> u64 {
        let mut key = self.placement_and_rights(board, info);

        let target = info
            .en_passant_square(Color::White)
            .or(info.en_passant_square(Color::Black));
        if let Some(square) = target {
            key ^= self.keys[EN_PASSANT_OFFSET + file_of(square)];
        }

        if info.side_to_move == Color::Black {
            key ^= self.keys[TURN_OFFSET];
        }
        key
    }

    /// Opening-book key. The en-passant file only counts when a pawn of the
    /// side to move stands next to the pawn that just double-pushed, and the
    /// turn key is applied when White is to move.
    pub fn book_key(&self, board: &Board, info: &GameInformation) -> u64 {
        let side = info.side_to_move;
        let mut key = self.placement_and_rights(board, info);

        if let Some(target) = info.en_passant_square(side) {
            let pushed = match side {
                Color::White => target + 8,
                Color::Black => target - 8,
            };
            let own_pawn = PieceKind::Pawn.on(side);
            let can_capture = [-1, 1]
                .iter()
                .filter_map(|&direction| mailbox_step(pushed, direction))
                .any(|neighbour| board.piece_at(neighbour) == own_pawn);
            if can_capture {
                key ^= self.keys[EN_PASSANT_OFFSET + file_of(target)];
            }
        }

        if side == Color::White {
            key ^= self.keys[TURN_OFFSET];
        }
        key
    }
}

/// [`ZobristKeys::position_hash`] on the built-in table.
pub fn compute_hash(board: &Board, info: &GameInformation) -> u64 {
    ZobristKeys::generated().position_hash(board, info)
}

/// [`ZobristKeys::book_key`] on the built-in table.
pub fn book_key(board: &Board, info: &GameInformation) -> u64 {
    ZobristKeys::generated().book_key(board, info)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{book_key, compute_hash, ZobristKeys, KEY_COUNT};
    use crate::errors::ChessError;
    use crate::game_state::board::Board;
    use crate::game_state::chess_types::{Color, PieceKind};
    use crate::game_state::game_information::GameInformation;
    use crate::moves::chess_move::{Move, MoveKind};
    use crate::utils::fen_parser::parse_fen;

    fn hash(fen: &str) -> u64 {
        let (board, info) = parse_fen(fen).expect("FEN should parse");
        compute_hash(&board, &info)
    }

    #[test]
    fn hashing_is_idempotent() {
        let board = Board::new();
        let info = GameInformation::new();
        assert_eq!(compute_hash(&board, &info), compute_hash(&board, &info));
        assert_eq!(book_key(&board, &info), book_key(&board, &info));
    }

    #[test]
    fn side_to_move_changes_hash() {
        assert_ne!(
            hash("4k3/8/8/8/8/8/8/4K3 w - - 0 1"),
            hash("4k3/8/8/8/8/8/8/4K3 b - - 0 1")
        );
    }

    #[test]
    fn castling_rights_change_hash() {
        assert_ne!(
            hash("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1"),
            hash("4k3/8/8/8/8/8/8/R3K2R w - - 0 1")
        );
    }

    #[test]
    fn en_passant_file_changes_hash() {
        assert_ne!(
            hash("4k3/8/8/3pP3/8/8/8/4K3 w - - 0 1"),
            hash("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1")
        );
    }

    #[test]
    fn distinct_positions_do_not_collide() {
        let fixtures = [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "rnbqkbnr/pppppppp/8/8/3P4/8/PPP1PPPP/RNBQKBNR b KQkq d3 0 1",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/3K4 w - - 0 1",
            "3k4/8/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/3NK3 w - - 0 1",
            "4k3/8/8/8/8/8/8/3BK3 w - - 0 1",
        ];
        let hashes: HashSet<u64> = fixtures.iter().map(|fen| hash(fen)).collect();
        assert_eq!(hashes.len(), fixtures.len());
    }

    #[test]
    fn transposed_move_orders_hash_identically() {
        let play = |moves: &[Move]| {
            let mut board = Board::new();
            let mut info = GameInformation::new();
            for mv in moves {
                board.make_move(mv, info.side_to_move);
                info.update(&board, mv);
            }
            compute_hash(&board, &info)
        };
        let nf3 = Move::new(62, 45, MoveKind::Quiet);
        let nc3 = Move::new(57, 42, MoveKind::Quiet);
        let nf6 = Move::new(6, 21, MoveKind::Quiet);
        let nc6 = Move::new(1, 18, MoveKind::Quiet);
        assert_eq!(play(&[nf3, nf6, nc3, nc6]), play(&[nc3, nc6, nf3, nf6]));
        assert_ne!(play(&[nf3, nf6]), play(&[nc3, nc6]));
    }

    #[test]
    fn book_key_ignores_uncapturable_en_passant() {
        let (board, info) =
            parse_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").expect("FEN");
        let (plain_board, plain_info) =
            parse_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1").expect("FEN");
        assert_eq!(book_key(&board, &info), book_key(&plain_board, &plain_info));
        assert_ne!(compute_hash(&board, &info), compute_hash(&plain_board, &plain_info));

        let (board, info) = parse_fen("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1").expect("FEN");
        let (plain_board, plain_info) = parse_fen("4k3/8/8/8/3pP3/8/8/4K3 b - - 0 1").expect("FEN");
        assert_ne!(book_key(&board, &info), book_key(&plain_board, &plain_info));
        assert_eq!(info.side_to_move, Color::Black);
    }

    fn c_listing(keys: &[u64]) -> String {
        let mut text = String::from("const U64 Random64[781] = {\n");
        for key in keys {
            text.push_str(&format!("   U64(0x{key:016X}),\n"));
        }
        text.push_str("};\n");
        text
    }

    #[test]
    fn key_table_reads_a_c_listing() {
        let keys: Vec<u64> = (1..=KEY_COUNT as u64).map(|n| n.wrapping_mul(0x0123_4567_89AB_CDEF)).collect();
        let table = ZobristKeys::parse(&c_listing(&keys)).expect("listing should parse");
        let expected: [u64; KEY_COUNT] = keys.try_into().expect("781 keys");
        assert_eq!(table, ZobristKeys::from_keys(expected));

        let board = Board::new();
        let info = GameInformation::new();
        assert_ne!(table.book_key(&board, &info), book_key(&board, &info));
        assert_eq!(
            ZobristKeys::generated().book_key(&board, &info),
            book_key(&board, &info)
        );
    }

    #[test]
    fn key_table_needs_every_key() {
        let short = c_listing(&[7; KEY_COUNT - 1]);
        assert!(matches!(ZobristKeys::parse(&short), Err(ChessError::Book(_))));
        let long = c_listing(&[7; KEY_COUNT + 1]);
        assert!(matches!(ZobristKeys::parse(&long), Err(ChessError::Book(_))));
    }

    #[test]
    fn piece_keys_follow_the_polyglot_layout() {
        let keys: [u64; KEY_COUNT] = std::array::from_fn(|index| index as u64);
        let table = ZobristKeys::from_keys(keys);
        // White pawn on e4: piece 1, rank 3, file 4.
        assert_eq!(
            table.piece_square_key(PieceKind::Pawn, Color::White, 36),
            (64 + 8 * 3 + 4) as u64
        );
        // Black king on e8: piece 10, rank 7, file 4.
        assert_eq!(
            table.piece_square_key(PieceKind::King, Color::Black, 4),
            (64 * 10 + 8 * 7 + 4) as u64
        );
    }
}
