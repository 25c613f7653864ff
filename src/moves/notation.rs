//! Square names and the human-readable move notation used in save files.
//!
//! A move is written as `<piece> <from> <to>[ <promotion>][ (ep)]`, for
//! example `P e2 e4`, `P e7 e8 Q` or `P e5 d6 (ep)`; castles are `o-o` and
//! `o-o-o`. Captures are not marked: their kind is recovered from the board
//! when the move is replayed.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::{
    file_of, row_of, Color, PieceKind, Square, KING_HOME,
};
use crate::moves::chess_move::{Move, MoveKind, PromotionPiece};

pub const KINGSIDE_CASTLE_TEXT: &str = "o-o";
pub const QUEENSIDE_CASTLE_TEXT: &str = "o-o-o";
pub const EN_PASSANT_MARKER: &str = "(ep)";

/// Algebraic name of a square (`0` is `a8`).
pub fn square_name(square: Square) -> String {
    let file = (b'a' + file_of(square) as u8) as char;
    let rank = 8 - row_of(square);
    format!("{file}{rank}")
}

/// Square index of an algebraic name such as `e4`.
pub fn square_from_name(name: &str) -> Option<Square> {
    let bytes = name.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let file = bytes[0];
    let rank = bytes[1];
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return None;
    }
    let row = 7 - usize::from(rank - b'1');
    Some(row * 8 + usize::from(file - b'a'))
}

/// King destination of a castle for `side`.
pub const fn castle_target(side: Color, kingside: bool) -> Square {
    let home = KING_HOME[side.index()];
    if kingside {
        home + 2
    } else {
        home - 2
    }
}

/// Writes a move in save-file notation. `piece` is the kind that moved.
pub fn format_move(mv: &Move, piece: PieceKind) -> String {
    match mv.kind {
        MoveKind::KingsideCastle => KINGSIDE_CASTLE_TEXT.to_string(),
        MoveKind::QueensideCastle => QUEENSIDE_CASTLE_TEXT.to_string(),
        kind => {
            let mut text = format!(
                "{} {} {}",
                piece.letter(),
                square_name(mv.from),
                square_name(mv.to)
            );
            if let Some(promoted) = kind.promotion() {
                text.push(' ');
                text.push(promoted.kind().letter());
            }
            if kind == MoveKind::EnPassant {
                text.push(' ');
                text.push_str(EN_PASSANT_MARKER);
            }
            text
        }
    }
}

fn parse_error(input: &str, reason: &str) -> ChessError {
    ChessError::MoveParse {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

fn is_promotion_path(from: Square, to: Square, side: Color) -> bool {
    match side {
        Color::White => row_of(from) == 1 && row_of(to) == 0,
        Color::Black => row_of(from) == 6 && row_of(to) == 7,
    }
}

/// Parses save-file notation for a move made by `side`.
///
/// Plain captures come back as [`MoveKind::Quiet`]; the game controller fixes
/// their kind against the board before validating them.
pub fn parse_move(text: &str, side: Color) -> ChessResult<Move> {
    let trimmed = text.trim();
    let tokens: Vec<&str> = trimmed
        .split_whitespace()
        .filter(|token| *token != "+" && *token != "#")
        .collect();

    match tokens.as_slice() {
        [castle] if *castle == KINGSIDE_CASTLE_TEXT => {
            return Ok(Move::new(
                KING_HOME[side.index()],
                castle_target(side, true),
                MoveKind::KingsideCastle,
            ));
        }
        [castle] if *castle == QUEENSIDE_CASTLE_TEXT => {
            return Ok(Move::new(
                KING_HOME[side.index()],
                castle_target(side, false),
                MoveKind::QueensideCastle,
            ));
        }
        _ => {}
    }

    if tokens.len() < 3 {
        return Err(parse_error(trimmed, "Not enough move arguments!"));
    }

    let piece = match tokens[0] {
        "K" | "Q" | "R" | "B" | "N" | "P" => tokens[0]
            .chars()
            .next()
            .and_then(PieceKind::from_letter)
            .ok_or_else(|| parse_error(trimmed, "Unrecognized piece code!"))?,
        _ => return Err(parse_error(trimmed, "Unrecognized piece code!")),
    };

    let (from, to) = match (square_from_name(tokens[1]), square_from_name(tokens[2])) {
        (Some(from), Some(to)) => (from, to),
        _ => return Err(parse_error(trimmed, "Unrecognized square name/names!")),
    };

    let home = KING_HOME[side.index()];
    if piece == PieceKind::King && from == home {
        if to == castle_target(side, true) {
            return Ok(Move::new(from, to, MoveKind::KingsideCastle));
        }
        if to == castle_target(side, false) {
            return Ok(Move::new(from, to, MoveKind::QueensideCastle));
        }
    }

    if piece == PieceKind::Pawn && is_promotion_path(from, to, side) {
        let letter = tokens.get(3).ok_or_else(|| {
            parse_error(
                trimmed,
                "This move appears to be a promotion, but no promotion piece code was found!",
            )
        })?;
        let promoted = match *letter {
            "Q" => PromotionPiece::Queen,
            "R" => PromotionPiece::Rook,
            "N" => PromotionPiece::Knight,
            "B" => PromotionPiece::Bishop,
            _ => return Err(parse_error(trimmed, "Unrecognized promotion piece code!")),
        };
        return Ok(Move::new(
            from,
            to,
            MoveKind::Promotion {
                piece: promoted,
                capture: false,
            },
        ));
    }

    let kind = if piece == PieceKind::Pawn && from.abs_diff(to) == 16 {
        MoveKind::DoublePawnPush
    } else if piece == PieceKind::Pawn
        && tokens
            .get(3)
            .is_some_and(|marker| *marker == EN_PASSANT_MARKER || marker.eq_ignore_ascii_case("ep"))
    {
        MoveKind::EnPassant
    } else {
        MoveKind::Quiet
    };
    Ok(Move::new(from, to, kind))
}
