//! Plain-text save files.
//!
//! Layout: white player, black player, result (`1 - 0`, `0 - 1`,
//! `1/2 - 1/2`), end reason, a blank line, then one move per line in the
//! notation of [`crate::moves::notation`], White first. A move may carry a
//! trailing `+` or `#`. Games always start from the standard position.

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use crate::errors::{ChessError, ChessResult};
use crate::game::game_controller::{
    play_validated_move, EndReason, GameOutcome, GameResult, MoveRecord, PositionStatus,
};
use crate::game_state::board::Board;
use crate::game_state::game_information::GameInformation;
use crate::moves::chess_move::Move;
use crate::moves::notation::parse_move;

const HEADER_LINES: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedGame {
    pub white: String,
    pub black: String,
    pub result: String,
    pub reason: String,
    pub moves: Vec<MoveRecord>,
}

/// File name for a save made at `now`, e.g. `tchess_2024-03-01_17-42-05.txt`.
pub fn default_save_file_name(now: DateTime<Local>) -> String {
    format!("tchess_{}.txt", now.format("%Y-%m-%d_%H-%M-%S"))
}

fn corrupt(line: usize, reason: impl Into<String>) -> ChessError {
    ChessError::CorruptSave {
        line,
        reason: reason.into(),
    }
}

impl SavedGame {
    /// Reads a save file, replaying every move through the same validation as
    /// live play. Any bad line fails the whole file.
    pub fn parse(text: &str) -> ChessResult<Self> {
        let mut lines = text.lines().enumerate().map(|(index, line)| (index + 1, line));

        let mut header = Vec::with_capacity(HEADER_LINES);
        for expected in 1..=HEADER_LINES {
            let (_, line) = lines
                .next()
                .ok_or_else(|| corrupt(expected, "missing header line"))?;
            header.push(line.trim().to_string());
        }

        let mut board = Board::new();
        let mut info = GameInformation::new();
        let mut moves = Vec::new();
        let mut finished = false;

        for (number, line) in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if finished {
                return Err(corrupt(number, "move after the end of the game"));
            }
            let mv = parse_move(line, info.side_to_move).map_err(|err| corrupt(number, err.to_string()))?;
            let applied = play_validated_move(&mut board, &mut info, mv)
                .map_err(|err| corrupt(number, err.to_string()))?;
            finished = applied.status != PositionStatus::Ongoing;
            moves.push(applied.record);
        }

        let [white, black, result, reason]: [String; HEADER_LINES] = header
            .try_into()
            .map_err(|_| corrupt(1, "malformed header"))?;
        debug!(moves = moves.len(), "save file parsed");
        Ok(Self {
            white,
            black,
            result,
            reason,
            moves,
        })
    }

    pub fn read_from(path: impl AsRef<Path>) -> ChessResult<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::parse(&text).inspect_err(|err| {
            warn!(path = %path.as_ref().display(), %err, "could not load save file");
        })
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> ChessResult<()> {
        fs::write(path.as_ref(), self.to_string())?;
        debug!(path = %path.as_ref().display(), "game saved");
        Ok(())
    }

    /// The recorded moves without their annotations.
    pub fn move_list(&self) -> Vec<Move> {
        self.moves.iter().map(|record| record.mv).collect()
    }

    /// Result and reason, when both are ones the controller produces.
    pub fn outcome(&self) -> Option<GameOutcome> {
        Some(GameOutcome {
            result: GameResult::parse(&self.result)?,
            reason: EndReason::parse(&self.reason)?,
        })
    }
}

impl fmt::Display for SavedGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.white)?;
        writeln!(f, "{}", self.black)?;
        writeln!(f, "{}", self.result)?;
        writeln!(f, "{}", self.reason)?;
        writeln!(f)?;
        for record in &self.moves {
            writeln!(f, "{record}")?;
        }
        Ok(())
    }
}
