//! Pseudo-legal move generation over the mailbox board.
//!
//! Generated moves obey piece movement, blocking and capture rules but may
//! leave the mover's king in check; see `legal_move_checks` for the filter.
//! Every move carries an MVV-LVA ordering score.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::game_information::GameInformation;
use crate::moves::chess_move::{capture_score, Move, MoveKind, PromotionPiece};

/// Forward step of a pawn of `side` on the 64-square board.
#[inline]
const fn pawn_forward(side: Color) -> isize {
    match side {
        Color::White => -8,
        Color::Black => 8,
    }
}

/// Row a pawn of `side` double-pushes from.
#[inline]
const fn pawn_start_row(side: Color) -> usize {
    match side {
        Color::White => 6,
        Color::Black => 1,
    }
}

/// Row from which a pawn step promotes.
#[inline]
const fn pawn_promotion_row(side: Color) -> usize {
    match side {
        Color::White => 1,
        Color::Black => 6,
    }
}

/// Mailbox directions of pawn captures.
#[inline]
const fn pawn_capture_directions(side: Color) -> [i32; 2] {
    match side {
        Color::White => [-11, -9],
        Color::Black => [9, 11],
    }
}

/// Fills `moves` with every pseudo-legal move of `side`. The list is cleared first.
pub fn generate_pseudo_legal_moves(
    board: &Board,
    info: &GameInformation,
    side: Color,
    moves: &mut Vec<Move>,
) -> ChessResult<()> {
    moves.clear();
    let mut kings_found = 0usize;

    for from in 0..64 {
        let code = board.piece_at(from);
        let Some(kind) = PieceKind::from_code(code) else {
            continue;
        };
        if kind == PieceKind::King {
            kings_found += 1;
            if kings_found > 2 {
                return Err(ChessError::InvalidBoard(
                    "more than two kings found during move generation".to_owned(),
                ));
            }
        }
        if color_of(code) != Some(side) {
            continue;
        }

        match kind {
            PieceKind::Pawn => pawn_moves(board, info, side, from, moves),
            _ => piece_moves(board, side, kind, from, moves),
        }
    }

    castle_moves(board, info, side, moves);
    Ok(())
}

/// Convenience wrapper returning a fresh list.
pub fn pseudo_legal_moves(board: &Board, info: &GameInformation, side: Color) -> ChessResult<Vec<Move>> {
    let mut moves = Vec::with_capacity(48);
    generate_pseudo_legal_moves(board, info, side, &mut moves)?;
    Ok(moves)
}

fn push_promotions(moves: &mut Vec<Move>, from: Square, to: Square, capture_bonus: Option<i32>) {
    for piece in PromotionPiece::ALL {
        let kind = MoveKind::Promotion {
            piece,
            capture: capture_bonus.is_some(),
        };
        let score = capture_bonus.unwrap_or(0) + piece.ordering_bonus();
        moves.push(Move::scored(from, to, kind, score));
    }
}

fn pawn_moves(board: &Board, info: &GameInformation, side: Color, from: Square, moves: &mut Vec<Move>) {
    let row = row_of(from);
    let promotes = row == pawn_promotion_row(side);
    let forward = pawn_forward(side);

    // The promotion row is never the last one, so one step forward stays on the board.
    let one_step = from.wrapping_add_signed(forward);
    if one_step < 64 && board.piece_at(one_step) == EMPTY {
        if promotes {
            push_promotions(moves, from, one_step, None);
        } else {
            moves.push(Move::new(from, one_step, MoveKind::Quiet));
            if row == pawn_start_row(side) {
                let two_steps = one_step.wrapping_add_signed(forward);
                if board.piece_at(two_steps) == EMPTY {
                    moves.push(Move::new(from, two_steps, MoveKind::DoublePawnPush));
                }
            }
        }
    }

    for direction in pawn_capture_directions(side) {
        let Some(target) = mailbox_step(from, direction) else {
            continue;
        };
        let victim = board.piece_at(target);
        if color_of(victim) == Some(side.opposite()) {
            let Some(victim_kind) = PieceKind::from_code(victim) else {
                continue;
            };
            let score = capture_score(PieceKind::Pawn, victim_kind);
            if promotes {
                push_promotions(moves, from, target, Some(score));
            } else {
                moves.push(Move::scored(from, target, MoveKind::Capture, score));
            }
        } else if !promotes && victim == EMPTY && info.en_passant_square(side) == Some(target) {
            let score = capture_score(PieceKind::Pawn, PieceKind::Pawn);
            moves.push(Move::scored(from, target, MoveKind::EnPassant, score));
        }
    }
}

fn piece_moves(board: &Board, side: Color, kind: PieceKind, from: Square, moves: &mut Vec<Move>) {
    let slides = CAN_SLIDE[kind.index()];
    for &direction in directions(kind) {
        let mut square = from;
        while let Some(target) = mailbox_step(square, direction) {
            let occupant = board.piece_at(target);
            if occupant != EMPTY {
                if color_of(occupant) == Some(side.opposite()) {
                    if let Some(victim) = PieceKind::from_code(occupant) {
                        moves.push(Move::scored(from, target, MoveKind::Capture, capture_score(kind, victim)));
                    }
                }
                break;
            }
            moves.push(Move::new(from, target, MoveKind::Quiet));
            if !slides {
                break;
            }
            square = target;
        }
    }
}

/// Castles by occupancy and rights only; attacked squares are checked by legality.
fn castle_moves(board: &Board, info: &GameInformation, side: Color, moves: &mut Vec<Move>) {
    let s = side.index();
    let king_home = KING_HOME[s];
    let king = PieceKind::King.on(side);
    let rook = PieceKind::Rook.on(side);
    if board.piece_at(king_home) != king {
        return;
    }

    let kingside_rook = KINGSIDE_ROOK_HOME[s];
    if info.kingside_castle_right(side)
        && board.piece_at(kingside_rook) == rook
        && (king_home + 1..kingside_rook).all(|sq| board.piece_at(sq) == EMPTY)
    {
        moves.push(Move::new(king_home, king_home + 2, MoveKind::KingsideCastle));
    }

    let queenside_rook = QUEENSIDE_ROOK_HOME[s];
    if info.queenside_castle_right(side)
        && board.piece_at(queenside_rook) == rook
        && (queenside_rook + 1..king_home).all(|sq| board.piece_at(sq) == EMPTY)
    {
        moves.push(Move::new(king_home, king_home - 2, MoveKind::QueensideCastle));
    }
}
