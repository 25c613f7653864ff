//! Polyglot-format opening book.
//!
//! A book file is a flat array of 16-byte big-endian records: position key
//! (u64), encoded move (u16), weight (u16) and a learn value (u32). Records are
//! looked up by exact [`book_key`] match. Book moves are resolved against the
//! legal moves of the position, so a corrupt or foreign entry can never produce
//! an illegal move.

use std::fs;
use std::path::Path;

use rand::Rng;
use tracing::debug;

use crate::errors::{ChessError, ChessResult};
use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::game_information::GameInformation;
use crate::move_generation::legal_move_checks::legal_moves;
use crate::moves::chess_move::{Move, MoveKind, PromotionPiece, NULL_MOVE};
use crate::search::zobrist::{book_key, ZobristKeys};

pub const RECORD_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookEntry {
    pub key: u64,
    pub raw_move: u16,
    pub weight: u16,
    pub learn: u32,
}

impl BookEntry {
    fn read(record: &[u8]) -> Self {
        let mut key = [0u8; 8];
        key.copy_from_slice(&record[0..8]);
        Self {
            key: u64::from_be_bytes(key),
            raw_move: u16::from_be_bytes([record[8], record[9]]),
            weight: u16::from_be_bytes([record[10], record[11]]),
            learn: u32::from_be_bytes([record[12], record[13], record[14], record[15]]),
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.key.to_be_bytes());
        out.extend_from_slice(&self.raw_move.to_be_bytes());
        out.extend_from_slice(&self.weight.to_be_bytes());
        out.extend_from_slice(&self.learn.to_be_bytes());
    }
}

/// Square from a Polyglot (file, rank) pair, rank 0 being White's back rank.
#[inline]
fn square_at(file: u16, rank: u16) -> Square {
    (7 - rank as usize) * 8 + file as usize
}

/// Decoded (from, to, promotion) of a raw book move. Castling stays in the
/// king-takes-rook form here.
pub fn decode_move(raw: u16) -> (Square, Square, Option<PromotionPiece>) {
    let to = square_at(raw & 7, (raw >> 3) & 7);
    let from = square_at((raw >> 6) & 7, (raw >> 9) & 7);
    let promotion = match (raw >> 12) & 7 {
        1 => Some(PromotionPiece::Knight),
        2 => Some(PromotionPiece::Bishop),
        3 => Some(PromotionPiece::Rook),
        4 => Some(PromotionPiece::Queen),
        _ => None,
    };
    (from, to, promotion)
}

/// Polyglot encoding of `mv`; castles are written as the king taking its rook.
pub fn encode_move(mv: &Move) -> u16 {
    let to = match mv.kind {
        MoveKind::KingsideCastle => mv.from + 3,
        MoveKind::QueensideCastle => mv.from - 4,
        _ => mv.to,
    };
    let promotion = match mv.kind.promotion() {
        Some(PromotionPiece::Knight) => 1,
        Some(PromotionPiece::Bishop) => 2,
        Some(PromotionPiece::Rook) => 3,
        Some(PromotionPiece::Queen) => 4,
        None => 0,
    };
    let field = |square: Square| ((7 - row_of(square)) as u16, file_of(square) as u16);
    let (to_rank, to_file) = field(to);
    let (from_rank, from_file) = field(mv.from);
    to_file | (to_rank << 3) | (from_file << 6) | (from_rank << 9) | (promotion << 12)
}

/// Whether a decoded king move is the Polyglot spelling of castling.
fn castle_kind(board: &Board, from: Square, to: Square) -> Option<MoveKind> {
    let side = color_of(board.piece_at(from))?;
    if board.piece_at(from) != PieceKind::King.on(side) || from != KING_HOME[side.index()] {
        return None;
    }
    if to == KINGSIDE_ROOK_HOME[side.index()] {
        Some(MoveKind::KingsideCastle)
    } else if to == QUEENSIDE_ROOK_HOME[side.index()] {
        Some(MoveKind::QueensideCastle)
    } else {
        None
    }
}

#[derive(Debug, Clone, Default)]
pub struct OpeningBook {
    entries: Vec<BookEntry>,
    /// Table the record keys were built with; the built-in one when `None`.
    keys: Option<ZobristKeys>,
}

impl OpeningBook {
    pub fn from_entries(mut entries: Vec<BookEntry>) -> Self {
        entries.sort_by_key(|entry| entry.key);
        Self { entries, keys: None }
    }

    /// Looks positions up with `keys` instead of the built-in table.
    pub fn with_keys(mut self, keys: ZobristKeys) -> Self {
        self.keys = Some(keys);
        self
    }

    /// Book key of a position under this book's key table.
    pub fn key_for(&self, board: &Board, info: &GameInformation) -> u64 {
        match &self.keys {
            Some(keys) => keys.book_key(board, info),
            None => book_key(board, info),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> ChessResult<Self> {
        if bytes.len() % RECORD_SIZE != 0 {
            return Err(ChessError::Book(format!(
                "book size {} is not a multiple of {RECORD_SIZE} bytes",
                bytes.len()
            )));
        }
        let entries = bytes.chunks_exact(RECORD_SIZE).map(BookEntry::read).collect();
        Ok(Self::from_entries(entries))
    }

    pub fn from_path(path: impl AsRef<Path>) -> ChessResult<Self> {
        let bytes = fs::read(path.as_ref())?;
        let book = Self::from_bytes(&bytes)?;
        debug!(path = %path.as_ref().display(), entries = book.len(), "opening book loaded");
        Ok(book)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.entries.len() * RECORD_SIZE);
        for entry in &self.entries {
            entry.write(&mut out);
        }
        out
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records stored under `key`.
    pub fn entries_for(&self, key: u64) -> &[BookEntry] {
        let start = self.entries.partition_point(|entry| entry.key < key);
        let end = self.entries.partition_point(|entry| entry.key <= key);
        &self.entries[start..end]
    }

    /// Legal moves the book lists for this position, with their weights.
    pub fn book_moves(&self, board: &mut Board, info: &GameInformation) -> ChessResult<Vec<(Move, u16)>> {
        let entries = self.entries_for(self.key_for(board, info));
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let legal = legal_moves(board, info)?;
        let mut found = Vec::with_capacity(entries.len());
        for entry in entries {
            let (from, to, promotion) = decode_move(entry.raw_move);
            let castle = castle_kind(board, from, to);
            let matched = legal.iter().find(|mv| match castle {
                Some(kind) => mv.kind == kind,
                None => mv.from == from && mv.to == to && mv.kind.promotion() == promotion,
            });
            if let Some(mv) = matched {
                found.push((*mv, entry.weight));
            }
        }
        Ok(found)
    }

    /// Weighted random pick among the book moves. `None` when the position is
    /// not in the book.
    pub fn choose_weighted_move<R: Rng + ?Sized>(
        &self,
        board: &mut Board,
        info: &GameInformation,
        rng: &mut R,
    ) -> ChessResult<Option<Move>> {
        let moves = self.book_moves(board, info)?;
        let Some(&(first, _)) = moves.first() else {
            return Ok(None);
        };

        let total_weight: u64 = moves.iter().map(|&(_, weight)| u64::from(weight)).sum();
        if total_weight == 0 {
            return Ok(Some(first));
        }

        let mut pick = rng.random_range(0..total_weight);
        for &(mv, weight) in &moves {
            let weight = u64::from(weight);
            if pick < weight {
                return Ok(Some(mv));
            }
            pick -= weight;
        }
        Ok(Some(first))
    }

    /// A book move for the position, or [`NULL_MOVE`] when there is none.
    pub fn book_move<R: Rng + ?Sized>(
        &self,
        board: &mut Board,
        info: &GameInformation,
        rng: &mut R,
    ) -> ChessResult<Move> {
        Ok(self.choose_weighted_move(board, info, rng)?.unwrap_or(NULL_MOVE))
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::utils::fen_parser::{parse_fen, STARTING_POSITION_FEN};

    fn entry(fen: &str, mv: Move, weight: u16) -> BookEntry {
        let (board, info) = parse_fen(fen).expect("fixture FEN should parse");
        BookEntry {
            key: book_key(&board, &info),
            raw_move: encode_move(&mv),
            weight,
            learn: 0,
        }
    }

    #[test]
    fn encodes_e2e4_like_polyglot() {
        // e2 = file 4 rank 1, e4 = file 4 rank 3
        let raw = encode_move(&Move::new(52, 36, MoveKind::DoublePawnPush));
        assert_eq!(raw, 4 | (3 << 3) | (4 << 6) | (1 << 9));
        assert_eq!(decode_move(raw), (52, 36, None));
    }

    #[test]
    fn weighted_choice_returns_listed_moves() {
        let e4 = Move::new(52, 36, MoveKind::DoublePawnPush);
        let d4 = Move::new(51, 35, MoveKind::DoublePawnPush);
        let book = OpeningBook::from_entries(vec![
            entry(STARTING_POSITION_FEN, e4, 4),
            entry(STARTING_POSITION_FEN, d4, 1),
        ]);
        let (mut board, info) = parse_fen(STARTING_POSITION_FEN).expect("fixture FEN should parse");
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let mv = book
                .book_move(&mut board, &info, &mut rng)
                .expect("lookup should run");
            assert!(mv == e4 || mv == d4);
        }
        assert_eq!(board, Board::new());
    }

    #[test]
    fn zero_weight_entries_fall_back_to_first() {
        let e4 = Move::new(52, 36, MoveKind::DoublePawnPush);
        let book = OpeningBook::from_entries(vec![entry(STARTING_POSITION_FEN, e4, 0)]);
        let (mut board, info) = parse_fen(STARTING_POSITION_FEN).expect("fixture FEN should parse");
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(book.book_move(&mut board, &info, &mut rng).expect("lookup"), e4);
    }

    #[test]
    fn unknown_position_yields_null_move() {
        let e4 = Move::new(52, 36, MoveKind::DoublePawnPush);
        let book = OpeningBook::from_entries(vec![entry(STARTING_POSITION_FEN, e4, 3)]);
        let (mut board, info) =
            parse_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").expect("fixture FEN should parse");
        let mut rng = StdRng::seed_from_u64(3);
        assert!(book.book_move(&mut board, &info, &mut rng).expect("lookup").is_null());
    }

    #[test]
    fn king_takes_rook_resolves_to_castle() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let castle = Move::new(60, 62, MoveKind::KingsideCastle);
        let book = OpeningBook::from_entries(vec![entry(fen, castle, 1)]);
        assert_eq!(decode_move(book.entries[0].raw_move), (60, 63, None));

        let (mut board, info) = parse_fen(fen).expect("fixture FEN should parse");
        let moves = book.book_moves(&mut board, &info).expect("lookup should run");
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].0.kind, MoveKind::KingsideCastle);
    }

    #[test]
    fn illegal_book_entries_are_skipped() {
        let bogus = Move::new(52, 28, MoveKind::Quiet);
        let book = OpeningBook::from_entries(vec![entry(STARTING_POSITION_FEN, bogus, 9)]);
        let (mut board, info) = parse_fen(STARTING_POSITION_FEN).expect("fixture FEN should parse");
        assert!(book.book_moves(&mut board, &info).expect("lookup").is_empty());
    }

    #[test]
    fn byte_format_is_sixteen_byte_records() {
        let e4 = Move::new(52, 36, MoveKind::DoublePawnPush);
        let book = OpeningBook::from_entries(vec![entry(STARTING_POSITION_FEN, e4, 2)]);
        let bytes = book.to_bytes();
        assert_eq!(bytes.len(), RECORD_SIZE);
        assert_eq!(&bytes[10..12], &[0, 2]);
        let reloaded = OpeningBook::from_bytes(&bytes).expect("bytes should load");
        assert_eq!(reloaded.entries, book.entries);
        assert!(matches!(OpeningBook::from_bytes(&bytes[..15]), Err(ChessError::Book(_))));
    }

    #[test]
    fn external_key_table_resolves_its_own_records() {
        let keys = ZobristKeys::from_keys(std::array::from_fn(|index| {
            (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        }));
        let (mut board, info) = parse_fen(STARTING_POSITION_FEN).expect("fixture FEN should parse");
        let e4 = Move::new(52, 36, MoveKind::DoublePawnPush);
        let record = BookEntry {
            key: keys.book_key(&board, &info),
            raw_move: encode_move(&e4),
            weight: 1,
            learn: 0,
        };

        let plain = OpeningBook::from_entries(vec![record]);
        assert!(plain.book_moves(&mut board, &info).expect("lookup").is_empty());

        let keyed = OpeningBook::from_entries(vec![record]).with_keys(keys);
        let moves = keyed.book_moves(&mut board, &info).expect("lookup");
        assert_eq!(moves, vec![(e4, 1)]);
    }
}
