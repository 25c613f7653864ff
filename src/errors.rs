use thiserror::Error;

use crate::game_state::chess_types::Color;

/// Why a submitted move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IllegalMoveReason {
    /// The move is not among the pseudo-legal moves of the side.
    #[error("This move is not legal for this side!")]
    NotPseudoLegal,
    /// The mover's king would be attacked after the move.
    #[error("This move leave the king in check!")]
    LeavesKingInCheck,
    /// The king starts on, passes or lands on an attacked square.
    #[error("Can't castle out of/through check!")]
    CastleThroughCheck,
    #[error("Don't have kingside castle rights anymore!")]
    LostKingsideRight,
    #[error("Don't have queenside castle rights anymore!")]
    LostQueensideRight,
}

/// Errors produced by the chess core and the layers built on it.
#[derive(Debug, Error)]
pub enum ChessError {
    /// Malformed textual move; the caller may ask again.
    #[error("could not parse move '{input}': {reason}")]
    MoveParse { input: String, reason: String },

    /// A player submitted a move that cannot be played.
    #[error("illegal move by {}: {reason}", side.name())]
    IllegalMove {
        side: Color,
        reason: IllegalMoveReason,
    },

    /// Structural invariant broken (wrong number of kings).
    #[error("invalid board: {0}")]
    InvalidBoard(String),

    /// A save file that cannot be replayed.
    #[error("corrupt save file (line {line}): {reason}")]
    CorruptSave { line: usize, reason: String },

    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("opening book error: {0}")]
    Book(String),

    #[error("no legal moves available")]
    NoLegalMoves,

    /// The player gave up. Not a failure of the core.
    #[error("player resigned")]
    Resigned,

    #[error("saved game has no more moves for this side")]
    ReplayExhausted,

    #[error("move worker thread panicked")]
    WorkerPanicked,

    /// The player is still computing a move on a worker thread.
    #[error("{} player is busy computing a move", side.name())]
    PlayerBusy { side: Color },

    #[error("the game is already over")]
    GameOver,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type ChessResult<T> = Result<T, ChessError>;
