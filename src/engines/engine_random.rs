//! Random-move player.
//!
//! Picks uniformly among the legal moves. Useful as a sparring partner and
//! for exercising the game controller.

use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::engines::player_trait::{Player, PositionTracker};
use crate::errors::{ChessError, ChessResult};
use crate::game_state::board::Board;
use crate::game_state::game_information::GameInformation;
use crate::move_generation::legal_move_checks::legal_moves;
use crate::moves::chess_move::Move;

pub struct RandomPlayer {
    position: PositionTracker,
    rng: StdRng,
}

impl RandomPlayer {
    pub fn new() -> Self {
        Self::from_position(Board::new(), GameInformation::new(), None)
    }

    /// Deterministic player for reproducible games.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_position(Board::new(), GameInformation::new(), Some(seed))
    }

    pub fn from_position(board: Board, info: GameInformation, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self {
            position: PositionTracker::new(board, info),
            rng,
        }
    }
}

impl Default for RandomPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Player for RandomPlayer {
    fn make_move(&mut self, history: &[Move]) -> ChessResult<Move> {
        self.position.catch_up(history)?;
        let (board, info) = self.position.parts_mut();
        let moves = legal_moves(board, info)?;
        let picked = *moves.as_slice().choose(&mut self.rng).ok_or(ChessError::NoLegalMoves)?;
        self.position.apply(&picked);
        Ok(picked)
    }

    fn description(&self) -> String {
        "Random move maker".to_string()
    }
}
