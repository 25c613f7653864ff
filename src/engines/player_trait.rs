//! Player abstraction used by the game controller.
//!
//! A player only sees the move history. Automated players keep a private copy
//! of the position and bring it up to date from the history before choosing.

use std::sync::mpsc::Sender;

use crate::errors::{ChessError, ChessResult};
use crate::game_state::board::Board;
use crate::game_state::chess_types::Color;
use crate::game_state::game_information::GameInformation;
use crate::moves::chess_move::Move;
use crate::search::negamax::SearchProgress;

pub trait Player: Send {
    /// Chooses the next move. `history` holds every move played so far, this
    /// player's own included. Giving up is reported as [`ChessError::Resigned`].
    fn make_move(&mut self, history: &[Move]) -> ChessResult<Move>;

    fn description(&self) -> String;

    /// True for players driven by a person rather than the program.
    fn is_interactive(&self) -> bool {
        false
    }

    /// Installs a channel for root-search progress. Players that do not search ignore it.
    fn set_progress_sender(&mut self, _sender: Sender<SearchProgress>) {}
}

/// A player's private view of the game, replayed from the shared history.
#[derive(Debug, Clone)]
pub struct PositionTracker {
    board: Board,
    info: GameInformation,
    applied: usize,
}

impl PositionTracker {
    pub fn new(board: Board, info: GameInformation) -> Self {
        Self {
            board,
            info,
            applied: 0,
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn info(&self) -> &GameInformation {
        &self.info
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.info.side_to_move
    }

    /// Board and state together, for searches that need the board mutably.
    #[inline]
    pub fn parts_mut(&mut self) -> (&mut Board, &GameInformation) {
        (&mut self.board, &self.info)
    }

    /// Plays every history entry this tracker has not seen yet.
    pub fn catch_up(&mut self, history: &[Move]) -> ChessResult<()> {
        if history.len() < self.applied {
            return Err(ChessError::InvalidBoard(format!(
                "move history shrank from {} to {} entries",
                self.applied,
                history.len()
            )));
        }
        for mv in &history[self.applied..] {
            self.apply(mv);
        }
        Ok(())
    }

    /// Plays `mv` for the side to move.
    pub fn apply(&mut self, mv: &Move) {
        self.board.make_move(mv, self.info.side_to_move);
        self.info.update(&self.board, mv);
        self.applied += 1;
    }
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new(Board::new(), GameInformation::new())
    }
}
