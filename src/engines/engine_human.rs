//! Console-driven human player.

use std::io::{self, BufRead, BufReader, Write};

use tracing::debug;

use crate::engines::player_trait::Player;
use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::Color;
use crate::moves::chess_move::Move;
use crate::moves::notation::parse_move;

pub const HELP_MESSAGE: &str = "\
Write your move using the piece code and the departure and destination squares!
 For example, to move your pawn from e2 to e4, write 'P e2 e4'.
Use these piece codes: Q (queen), K (king), N (knight), B (bishop), R (rook), P (pawn).
For special moves:
 - Kingside castling: o-o
 - Queenside castling: o-o-o
 - Promotions: also write the piece to promote to, for example 'P e7 e8 Q'.
 - En passant: write '(ep)' after the move, for example 'P e5 d6 (ep)'.
 - To resign the game, type 'resign'.
";

pub struct HumanPlayer {
    side: Color,
    input: Box<dyn BufRead + Send>,
    output: Box<dyn Write + Send>,
}

impl HumanPlayer {
    pub fn new(side: Color, input: Box<dyn BufRead + Send>, output: Box<dyn Write + Send>) -> Self {
        Self { side, input, output }
    }

    /// Player reading standard input and prompting on standard output.
    pub fn stdio(side: Color) -> Self {
        Self::new(side, Box::new(BufReader::new(io::stdin())), Box::new(io::stdout()))
    }

    fn read_line(&mut self) -> ChessResult<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "move input closed").into());
        }
        Ok(line.trim().to_string())
    }
}

impl Player for HumanPlayer {
    fn make_move(&mut self, _history: &[Move]) -> ChessResult<Move> {
        loop {
            writeln!(self.output, "--------------------------------")?;
            writeln!(self.output, "{} to move. Enter your move, or type 'help'!", self.side.name())?;
            self.output.flush()?;

            let line = self.read_line()?;
            match line.as_str() {
                "" => continue,
                "help" => write!(self.output, "{HELP_MESSAGE}")?,
                "resign" => return Err(ChessError::Resigned),
                text => match parse_move(text, self.side) {
                    Ok(mv) => return Ok(mv),
                    Err(ChessError::MoveParse { reason, .. }) => {
                        debug!(input = text, %reason, "unparsable move");
                        writeln!(self.output, "Could not parse this move: {reason}")?;
                    }
                    Err(other) => return Err(other),
                },
            }
        }
    }

    fn description(&self) -> String {
        format!("Human controlled player ({})", self.side.name())
    }

    fn is_interactive(&self) -> bool {
        true
    }
}
