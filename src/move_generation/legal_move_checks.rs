//! Attack detection and legality filtering of pseudo-legal moves.
//!
//! Every probe here makes the move through a [`ScopedMove`](crate::game_state::board::ScopedMove)
//! guard, so the board is always left exactly as it was found.

use crate::errors::{ChessResult, IllegalMoveReason};
use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::game_information::GameInformation;
use crate::move_generation::move_generator::generate_pseudo_legal_moves;
use crate::moves::chess_move::{Move, MoveKind};

/// Whether `square` is attacked by any piece of `attacker`.
///
/// Walks outward from the square along queen directions (sliding) and knight
/// offsets (one step); the first piece met in each direction decides.
pub fn is_attacked(board: &Board, attacker: Color, square: Square) -> bool {
    let walks = [
        (directions(PieceKind::Queen), true),
        (directions(PieceKind::Knight), false),
    ];
    for (walk_directions, slides) in walks {
        for &direction in walk_directions {
            let mut distance = 0u32;
            let mut current = square;
            while let Some(next) = mailbox_step(current, direction) {
                distance += 1;
                let code = board.piece_at(next);
                if code != EMPTY {
                    if color_of(code) == Some(attacker) {
                        if let Some(kind) = PieceKind::from_code(code) {
                            if attacks_along(kind, attacker, direction, distance) {
                                return true;
                            }
                        }
                    }
                    break;
                }
                if !slides {
                    break;
                }
                current = next;
            }
        }
    }
    false
}

/// Whether a piece found `distance` steps away along `direction` reaches back.
#[inline]
fn attacks_along(kind: PieceKind, attacker: Color, direction: i32, distance: u32) -> bool {
    match kind {
        PieceKind::Pawn => distance == 1 && PAWN_ATTACK_OFFSETS[attacker.index()].contains(&direction),
        _ if CAN_SLIDE[kind.index()] => directions(kind).contains(&direction),
        _ => distance == 1 && directions(kind).contains(&direction),
    }
}

/// Whether `side`'s king is currently attacked.
#[inline]
pub fn is_in_check(board: &Board, side: Color) -> bool {
    is_attacked(board, side.opposite(), board.king_square(side))
}

/// Squares a castling king starts on, crosses and lands on.
fn castle_path(mv: &Move) -> [Square; 3] {
    match mv.kind {
        MoveKind::QueensideCastle => [mv.from, mv.from - 1, mv.from - 2],
        _ => [mv.from, mv.from + 1, mv.from + 2],
    }
}

/// Legality of a pseudo-legal move for the side to move. No net effect on `board`.
pub fn is_legal_move(mv: &Move, board: &mut Board, info: &GameInformation) -> bool {
    let side = info.side_to_move;
    let enemy = side.opposite();
    let probe = board.make_scoped(mv, side);
    match mv.kind {
        MoveKind::KingsideCastle => {
            info.kingside_castle_right(side)
                && castle_path(mv).iter().all(|&sq| !is_attacked(&probe, enemy, sq))
        }
        MoveKind::QueensideCastle => {
            info.queenside_castle_right(side)
                && castle_path(mv).iter().all(|&sq| !is_attacked(&probe, enemy, sq))
        }
        _ => !is_attacked(&probe, enemy, probe.king_square(side)),
    }
}

/// Outcome of [`is_valid_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveCheck {
    /// The move is among the side's pseudo-legal moves.
    pub pseudo_legal: bool,
    pub verdict: Result<(), IllegalMoveReason>,
    /// Code the move would capture, `EMPTY` for none.
    pub captured: PieceCode,
}

impl MoveCheck {
    #[inline]
    pub fn is_legal(&self) -> bool {
        self.verdict.is_ok()
    }

    fn rejected(pseudo_legal: bool, reason: IllegalMoveReason, captured: PieceCode) -> Self {
        Self {
            pseudo_legal,
            verdict: Err(reason),
            captured,
        }
    }
}

/// Like [`is_legal_move`] but explains a refusal. `pseudo_legal` must be the
/// pseudo-legal moves of the side to move. No net effect on `board`.
pub fn is_valid_move(
    mv: &Move,
    board: &mut Board,
    info: &GameInformation,
    pseudo_legal: &[Move],
) -> MoveCheck {
    let side = info.side_to_move;
    let enemy = side.opposite();

    match mv.kind {
        MoveKind::KingsideCastle if !info.kingside_castle_right(side) => {
            return MoveCheck::rejected(false, IllegalMoveReason::LostKingsideRight, EMPTY);
        }
        MoveKind::QueensideCastle if !info.queenside_castle_right(side) => {
            return MoveCheck::rejected(false, IllegalMoveReason::LostQueensideRight, EMPTY);
        }
        _ => {}
    }

    if !pseudo_legal.contains(mv) {
        return MoveCheck::rejected(false, IllegalMoveReason::NotPseudoLegal, EMPTY);
    }

    let probe = board.make_scoped(mv, side);
    let captured = probe.captured();
    if mv.kind.is_castle() {
        if castle_path(mv).iter().any(|&sq| is_attacked(&probe, enemy, sq)) {
            return MoveCheck::rejected(true, IllegalMoveReason::CastleThroughCheck, captured);
        }
    } else if is_attacked(&probe, enemy, probe.king_square(side)) {
        return MoveCheck::rejected(true, IllegalMoveReason::LeavesKingInCheck, captured);
    }

    MoveCheck {
        pseudo_legal: true,
        verdict: Ok(()),
        captured,
    }
}

/// All legal moves of the side to move, in generation order.
pub fn legal_moves(board: &mut Board, info: &GameInformation) -> ChessResult<Vec<Move>> {
    let mut moves = Vec::with_capacity(48);
    generate_pseudo_legal_moves(board, info, info.side_to_move, &mut moves)?;
    moves.retain(|mv| is_legal_move(mv, board, info));
    Ok(moves)
}

/// Whether any of `moves` is legal, stopping at the first one.
pub fn has_legal_move(moves: &[Move], board: &mut Board, info: &GameInformation) -> bool {
    moves.iter().any(|mv| is_legal_move(mv, board, info))
}
