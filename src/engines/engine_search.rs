//! The searching engine: opening book first, then negamax.

use std::path::PathBuf;
use std::sync::mpsc::Sender;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::engines::player_trait::{Player, PositionTracker};
use crate::errors::ChessResult;
use crate::game_state::board::Board;
use crate::game_state::game_information::GameInformation;
use crate::moves::chess_move::Move;
use crate::search::negamax::{NegamaxSearch, SearchConfig, SearchProgress};
use crate::search::zobrist::ZobristKeys;
use crate::tables::opening_book::OpeningBook;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub search: SearchConfig,
    pub book_path: Option<PathBuf>,
    /// Key table the book was built with, e.g. the published Polyglot one.
    pub book_keys_path: Option<PathBuf>,
    pub use_book: bool,
    /// Seed for book move choice; entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            book_path: None,
            book_keys_path: None,
            use_book: true,
            seed: None,
        }
    }
}

pub struct EnginePlayer {
    position: PositionTracker,
    search: NegamaxSearch,
    book: Option<OpeningBook>,
    in_opening: bool,
    rng: StdRng,
}

impl EnginePlayer {
    /// Engine for a game from the standard starting position.
    pub fn new(config: EngineConfig) -> ChessResult<Self> {
        Self::from_position(config, Board::new(), GameInformation::new())
    }

    /// Engine for a game starting from `board` and `info`. Loads the book named
    /// in `config` when books are enabled.
    pub fn from_position(config: EngineConfig, board: Board, info: GameInformation) -> ChessResult<Self> {
        let book = match (&config.book_path, config.use_book) {
            (Some(path), true) => {
                let book = OpeningBook::from_path(path)?;
                match &config.book_keys_path {
                    Some(keys) => Some(book.with_keys(ZobristKeys::from_path(keys)?)),
                    None => Some(book),
                }
            }
            _ => None,
        };
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Ok(Self {
            position: PositionTracker::new(board, info),
            search: NegamaxSearch::new(config.search),
            in_opening: book.is_some(),
            book,
            rng,
        })
    }

    /// Replaces the opening book.
    pub fn with_book(mut self, book: OpeningBook) -> Self {
        self.in_opening = true;
        self.book = Some(book);
        self
    }

    #[inline]
    pub fn in_opening(&self) -> bool {
        self.in_opening
    }

    fn book_move(&mut self) -> ChessResult<Option<Move>> {
        if !self.in_opening {
            return Ok(None);
        }
        let Some(book) = &self.book else {
            return Ok(None);
        };
        let (board, info) = self.position.parts_mut();
        let mv = book.book_move(board, info, &mut self.rng)?;
        if mv.is_null() {
            // Once out of book, stay out.
            self.in_opening = false;
            return Ok(None);
        }
        Ok(Some(mv))
    }
}

impl Player for EnginePlayer {
    fn make_move(&mut self, history: &[Move]) -> ChessResult<Move> {
        self.position.catch_up(history)?;

        let mv = match self.book_move()? {
            Some(mv) => {
                info!(%mv, "playing from the opening book");
                mv
            }
            None => {
                let (board, info) = self.position.parts_mut();
                let result = self.search.best_move(board, info)?;
                debug!(mv = %result.best_move, score = result.score, "engine chose move");
                result.best_move
            }
        };

        self.position.apply(&mv);
        Ok(mv)
    }

    fn description(&self) -> String {
        "Tchess engine".to_string()
    }

    fn set_progress_sender(&mut self, sender: Sender<SearchProgress>) {
        self.search.set_progress_sender(sender);
    }
}
