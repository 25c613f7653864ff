//! Perft node counting for move-generator validation.

use crate::errors::ChessResult;
use crate::game_state::board::Board;
use crate::game_state::game_information::GameInformation;
use crate::move_generation::legal_move_checks::{has_legal_move, is_in_check, legal_moves};
use crate::move_generation::move_generator::pseudo_legal_moves;
use crate::moves::chess_move::MoveKind;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: u64,
    pub captures: u64,
    pub en_passant: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
    pub checkmates: u64,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.checks += rhs.checks;
        self.checkmates += rhs.checkmates;
    }
}

/// Counts leaf positions `depth` plies below the given one, with move-kind tallies
/// for the last ply.
pub fn perft(board: &mut Board, info: &GameInformation, depth: u8) -> ChessResult<PerftCounts> {
    if depth == 0 {
        return Ok(PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        });
    }

    let side = info.side_to_move;
    let mut total = PerftCounts::default();
    for mv in legal_moves(board, info)? {
        let mut child = board.make_scoped(&mv, side);
        let child_info = info.after(&child, &mv);

        if depth == 1 {
            let mut leaf = PerftCounts {
                nodes: 1,
                ..PerftCounts::default()
            };
            if mv.kind.is_capture() {
                leaf.captures = 1;
            }
            if mv.kind == MoveKind::EnPassant {
                leaf.en_passant = 1;
            }
            if mv.kind.is_castle() {
                leaf.castles = 1;
            }
            if mv.kind.promotion().is_some() {
                leaf.promotions = 1;
            }
            let opponent = child_info.side_to_move;
            if is_in_check(&child, opponent) {
                leaf.checks = 1;
                let replies = pseudo_legal_moves(&child, &child_info, opponent)?;
                if !has_legal_move(&replies, &mut child, &child_info) {
                    leaf.checkmates = 1;
                }
            }
            total.merge(leaf);
        } else {
            total.merge(perft(&mut child, &child_info, depth - 1)?);
        }
    }

    Ok(total)
}
