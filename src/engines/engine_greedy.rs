//! One-ply greedy player.
//!
//! Tries every legal move, scores the resulting position with the static
//! evaluator (or the terminal score when the reply side is mated, stalemated
//! or out of mating material) and keeps the best. Ties go to the later move.

use crate::engines::player_trait::{Player, PositionTracker};
use crate::errors::{ChessError, ChessResult};
use crate::game_state::board::Board;
use crate::game_state::chess_types::Color;
use crate::game_state::game_information::GameInformation;
use crate::move_generation::legal_move_checks::{has_legal_move, is_legal_move};
use crate::move_generation::move_generator::pseudo_legal_moves;
use crate::moves::chess_move::Move;
use crate::search::board_scoring::{is_special_board, BoardScorer, PositionalScorer, WORST_VALUE};

pub struct GreedyPlayer {
    side: Color,
    position: PositionTracker,
    scorer: Box<dyn BoardScorer>,
}

impl GreedyPlayer {
    pub fn new(side: Color) -> Self {
        Self::from_position(side, Board::new(), GameInformation::new())
    }

    pub fn from_position(side: Color, board: Board, info: GameInformation) -> Self {
        Self {
            side,
            position: PositionTracker::new(board, info),
            scorer: Box::new(PositionalScorer),
        }
    }

    /// Best one-ply move for the side to move and its score.
    fn choose(&mut self) -> ChessResult<(Move, i32)> {
        let (board, info) = self.position.parts_mut();
        let side = info.side_to_move;
        let moves = pseudo_legal_moves(board, info, side)?;

        let mut best = None;
        let mut best_score = WORST_VALUE;
        for mv in &moves {
            if !is_legal_move(mv, board, info) {
                continue;
            }
            let mut child = board.make_scoped(mv, side);
            let child_info = info.after(&child, mv);
            let replies = pseudo_legal_moves(&child, &child_info, side.opposite())?;
            let reply_exists = has_legal_move(&replies, &mut child, &child_info);
            let score = match is_special_board(side.opposite(), &child, reply_exists, 1) {
                Some(special) => -special,
                None => self.scorer.score(side, &child, &child_info, moves.len()),
            };
            if score >= best_score {
                best_score = score;
                best = Some(*mv);
            }
        }

        best.map(|mv| (mv, best_score)).ok_or(ChessError::NoLegalMoves)
    }
}

impl Player for GreedyPlayer {
    fn make_move(&mut self, history: &[Move]) -> ChessResult<Move> {
        self.position.catch_up(history)?;
        let (mv, _) = self.choose()?;
        self.position.apply(&mv);
        Ok(mv)
    }

    fn description(&self) -> String {
        format!("Greedy move maker ({})", self.side.name())
    }
}
