//! Runs a player's move computation on its own thread.
//!
//! The player is moved into the worker and handed back by [`PendingMove::join`],
//! so nothing else can touch its private board while it searches. Progress
//! arrives over a channel and is best-effort. There is no cancellation: a
//! started computation always runs to completion.

use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use crate::engines::player_trait::Player;
use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::Color;
use crate::moves::chess_move::Move;
use crate::search::negamax::SearchProgress;

/// What a finished worker hands back.
pub struct FinishedMove {
    pub player: Box<dyn Player>,
    pub result: ChessResult<Move>,
}

pub struct PendingMove {
    side: Color,
    handle: JoinHandle<FinishedMove>,
    progress: Receiver<SearchProgress>,
    latest: Option<SearchProgress>,
}

/// Starts `player` choosing a move for `side` on a worker thread.
pub fn spawn_move(mut player: Box<dyn Player>, side: Color, history: Vec<Move>) -> ChessResult<PendingMove> {
    let (sender, progress) = mpsc::channel();
    player.set_progress_sender(sender);
    let handle = thread::Builder::new()
        .name(format!("tchess-{}", side.name().to_ascii_lowercase()))
        .spawn(move || {
            let result = player.make_move(&history);
            FinishedMove { player, result }
        })?;
    Ok(PendingMove {
        side,
        handle,
        progress,
        latest: None,
    })
}

impl PendingMove {
    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }

    /// Most recent progress report, without blocking.
    pub fn try_progress(&mut self) -> Option<SearchProgress> {
        if let Some(last) = self.progress.try_iter().last() {
            self.latest = Some(last);
        }
        self.latest
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the worker and returns the player with its result.
    pub fn join(self) -> ChessResult<FinishedMove> {
        self.handle.join().map_err(|_| ChessError::WorkerPanicked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::engine_random::RandomPlayer;
    use crate::engines::engine_search::{EngineConfig, EnginePlayer};
    use crate::game_state::board::Board;
    use crate::game_state::game_information::GameInformation;
    use crate::move_generation::legal_move_checks::legal_moves;
    use crate::search::negamax::SearchConfig;

    struct Panicking;

    impl Player for Panicking {
        fn make_move(&mut self, _history: &[Move]) -> ChessResult<Move> {
            panic!("boom");
        }

        fn description(&self) -> String {
            "panics".to_string()
        }
    }

    #[test]
    fn worker_returns_player_and_move() {
        let pending = spawn_move(Box::new(RandomPlayer::with_seed(3)), Color::White, Vec::new())
            .expect("worker should start");
        assert_eq!(pending.side(), Color::White);
        let finished = pending.join().expect("worker should not panic");
        let mv = finished.result.expect("random move");
        let legal = legal_moves(&mut Board::new(), &GameInformation::new()).expect("start moves");
        assert!(legal.contains(&mv));
        assert_eq!(finished.player.description(), "Random move maker");
    }

    #[test]
    fn engine_progress_reaches_the_total() {
        let config = EngineConfig {
            search: SearchConfig { depth: 1, tt_size_mb: 1 },
            use_book: false,
            ..EngineConfig::default()
        };
        let engine = EnginePlayer::new(config).expect("engine");
        let mut pending = spawn_move(Box::new(engine), Color::White, Vec::new()).expect("worker should start");
        while !pending.is_finished() {
            pending.try_progress();
            std::thread::yield_now();
        }
        let progress = pending.try_progress().expect("progress was reported");
        assert_eq!(progress, SearchProgress { evaluated: 20, total: 20 });
        assert!(pending.join().expect("no panic").result.is_ok());
    }

    #[test]
    fn panicking_player_is_reported() {
        let pending = spawn_move(Box::new(Panicking), Color::Black, Vec::new()).expect("worker should start");
        assert!(matches!(pending.join(), Err(ChessError::WorkerPanicked)));
    }
}
