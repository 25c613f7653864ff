//! FEN-to-position parser.
//!
//! Builds a [`Board`] and its [`GameInformation`] from a Forsyth-Edwards
//! Notation string. The move clocks are optional and ignored since nothing in
//! the engine tracks them.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::game_information::GameInformation;
use crate::moves::notation::square_from_name;

pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn invalid(message: impl Into<String>) -> ChessError {
    ChessError::InvalidFen(message.into())
}

pub fn parse_fen(fen: &str) -> ChessResult<(Board, GameInformation)> {
    let mut parts = fen.split_whitespace();

    let board_part = parts.next().ok_or_else(|| invalid("Missing board layout in FEN"))?;
    let side_part = parts.next().ok_or_else(|| invalid("Missing side-to-move in FEN"))?;
    let castling_part = parts.next().ok_or_else(|| invalid("Missing castling rights in FEN"))?;
    let en_passant_part = parts
        .next()
        .ok_or_else(|| invalid("Missing en-passant square in FEN"))?;

    for clock in parts.by_ref().take(2) {
        clock
            .parse::<u16>()
            .map_err(|_| invalid(format!("Invalid move clock: {clock}")))?;
    }
    if parts.next().is_some() {
        return Err(invalid("FEN has extra trailing fields"));
    }

    let board = Board::from_squares(parse_board(board_part)?)?;
    let side_to_move = parse_side_to_move(side_part)?;

    let mut info = GameInformation::without_rights(side_to_move);
    parse_castling_rights(castling_part, &mut info)?;
    if en_passant_part != "-" {
        let square = square_from_name(en_passant_part)
            .ok_or_else(|| invalid(format!("Invalid en-passant square: {en_passant_part}")))?;
        info.set_en_passant_square(side_to_move, Some(square));
    }

    Ok((board, info))
}

fn parse_board(board_part: &str) -> ChessResult<[PieceCode; 64]> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(invalid("Board layout must contain 8 ranks"));
    }

    let mut squares = [EMPTY; 64];
    for (row, rank_str) in ranks.iter().enumerate() {
        let mut file = 0usize;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                if !(1..=8).contains(&empty_count) {
                    return Err(invalid(format!("Invalid empty-square count '{ch}'")));
                }
                file += empty_count as usize;
                continue;
            }

            let code = piece_from_fen_char(ch)
                .ok_or_else(|| invalid(format!("Invalid piece character '{ch}' in board layout")))?;
            if file >= 8 {
                return Err(invalid("Board rank has too many files"));
            }
            squares[row * 8 + file] = code;
            file += 1;
        }

        if file != 8 {
            return Err(invalid("Board rank does not sum to 8 files"));
        }
    }

    Ok(squares)
}

fn parse_side_to_move(side_part: &str) -> ChessResult<Color> {
    match side_part {
        "w" => Ok(Color::White),
        "b" => Ok(Color::Black),
        _ => Err(invalid(format!("Invalid side-to-move field: {side_part}"))),
    }
}

fn parse_castling_rights(castling_part: &str, info: &mut GameInformation) -> ChessResult<()> {
    if castling_part == "-" {
        return Ok(());
    }

    let mut kingside = [false; 2];
    let mut queenside = [false; 2];
    for ch in castling_part.chars() {
        match ch {
            'K' => kingside[Color::White.index()] = true,
            'Q' => queenside[Color::White.index()] = true,
            'k' => kingside[Color::Black.index()] = true,
            'q' => queenside[Color::Black.index()] = true,
            _ => return Err(invalid(format!("Invalid castling rights character: {ch}"))),
        }
    }
    for side in [Color::White, Color::Black] {
        info.set_castle_rights(side, kingside[side.index()], queenside[side.index()]);
    }
    Ok(())
}

fn piece_from_fen_char(ch: char) -> Option<PieceCode> {
    let color = if ch.is_ascii_uppercase() {
        Color::White
    } else if ch.is_ascii_lowercase() {
        Color::Black
    } else {
        return None;
    };

    let kind = match ch.to_ascii_lowercase() {
        'p' => PieceKind::Pawn,
        'n' => PieceKind::Knight,
        'b' => PieceKind::Bishop,
        'r' => PieceKind::Rook,
        'q' => PieceKind::Queen,
        'k' => PieceKind::King,
        _ => return None,
    };

    Some(kind.on(color))
}

#[cfg(test)]
mod tests {
    use super::{parse_fen, STARTING_POSITION_FEN};
    use crate::game_state::board::Board;
    use crate::game_state::chess_types::Color;
    use crate::game_state::game_information::GameInformation;

    #[test]
    fn parse_starting_fen_matches_new_game() {
        let (board, info) = parse_fen(STARTING_POSITION_FEN).expect("starting FEN should parse");
        assert_eq!(board, Board::new());
        assert_eq!(info, GameInformation::new());
    }

    #[test]
    fn parse_sets_en_passant_for_side_to_move() {
        let (_, info) = parse_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").expect("FEN should parse");
        assert_eq!(info.en_passant_square(Color::White), Some(19));
        assert!(!info.kingside_castle_right(Color::White));
    }

    #[test]
    fn clocks_are_optional() {
        assert!(parse_fen("4k3/8/8/8/8/8/8/4K3 b - -").is_ok());
    }

    #[test]
    fn rejects_bad_layouts() {
        assert!(parse_fen("4k3/8/8/8/8/8/8 w - - 0 1").is_err());
        assert!(parse_fen("4k3/8/8/8/8/8/8/4K4 w - - 0 1").is_err());
        assert!(parse_fen("4k3/8/8/8/8/8/8/4X3 w - - 0 1").is_err());
        assert!(parse_fen("8/8/8/8/8/8/8/4K3 w - - 0 1").is_err());
        assert!(parse_fen("4k3/8/8/8/8/8/8/4K3 x - - 0 1").is_err());
    }
}
