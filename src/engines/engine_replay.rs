//! Plays back one side of a saved game.

use tracing::debug;

use crate::engines::player_trait::Player;
use crate::errors::{ChessError, ChessResult};
use crate::game::game_controller::{EndReason, GameResult};
use crate::game::saved_game::SavedGame;
use crate::game_state::chess_types::Color;
use crate::moves::chess_move::Move;

pub struct ReplayPlayer {
    side: Color,
    name: String,
    moves: Vec<Move>,
    next: usize,
    resigns_at_end: bool,
}

impl ReplayPlayer {
    pub fn new(saved: &SavedGame, side: Color) -> Self {
        let parity = side.index();
        let moves = saved
            .move_list()
            .into_iter()
            .skip(parity)
            .step_by(2)
            .collect();
        let resigned = EndReason::parse(&saved.reason) == Some(EndReason::Resignation);
        let lost = GameResult::parse(&saved.result).and_then(GameResult::loser) == Some(side);
        let name = match side {
            Color::White => saved.white.clone(),
            Color::Black => saved.black.clone(),
        };
        Self {
            side,
            name,
            moves,
            next: 0,
            resigns_at_end: resigned && lost,
        }
    }

    pub fn remaining(&self) -> usize {
        self.moves.len() - self.next
    }
}

impl Player for ReplayPlayer {
    fn make_move(&mut self, _history: &[Move]) -> ChessResult<Move> {
        match self.moves.get(self.next) {
            Some(&mv) => {
                self.next += 1;
                Ok(mv)
            }
            None if self.resigns_at_end => {
                debug!(side = self.side.name(), "replay ends in resignation");
                Err(ChessError::Resigned)
            }
            None => Err(ChessError::ReplayExhausted),
        }
    }

    fn description(&self) -> String {
        self.name.clone()
    }
}
