//! Authoritative game state and turn handling.
//!
//! The controller owns the real board, asks players for moves, validates and
//! applies them, charges illegal submissions against a per-side budget and
//! detects the end of the game.

use std::fmt;

use tracing::{info, warn};

use crate::engines::player_trait::Player;
use crate::engines::worker::{spawn_move, PendingMove};
use crate::errors::{ChessError, ChessResult};
use crate::game::saved_game::SavedGame;
use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::game_information::GameInformation;
use crate::move_generation::legal_move_checks::{has_legal_move, is_in_check, is_valid_move};
use crate::move_generation::move_generator::pseudo_legal_moves;
use crate::moves::chess_move::{Move, MoveKind};
use crate::moves::notation::format_move;

pub const DEFAULT_ILLEGAL_MOVE_BUDGET: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    /// Illegal submissions each side may make before forfeiting.
    pub illegal_move_budget: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            illegal_move_budget: DEFAULT_ILLEGAL_MOVE_BUDGET,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
}

impl GameResult {
    pub fn win_for(side: Color) -> Self {
        match side {
            Color::White => GameResult::WhiteWins,
            Color::Black => GameResult::BlackWins,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1 - 0",
            GameResult::BlackWins => "0 - 1",
            GameResult::Draw => "1/2 - 1/2",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "1 - 0" => Some(GameResult::WhiteWins),
            "0 - 1" => Some(GameResult::BlackWins),
            "1/2 - 1/2" => Some(GameResult::Draw),
            _ => None,
        }
    }

    /// The losing side, if any.
    pub fn loser(self) -> Option<Color> {
        match self {
            GameResult::WhiteWins => Some(Color::Black),
            GameResult::BlackWins => Some(Color::White),
            GameResult::Draw => None,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    Resignation,
    TooManyIllegalMoves,
}

impl EndReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            EndReason::Checkmate => "Checkmate",
            EndReason::Stalemate => "Stalemate",
            EndReason::InsufficientMaterial => "Insufficient mating material",
            EndReason::Resignation => "Resignation",
            EndReason::TooManyIllegalMoves => "Too many illegal moves!",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        [
            EndReason::Checkmate,
            EndReason::Stalemate,
            EndReason::InsufficientMaterial,
            EndReason::Resignation,
            EndReason::TooManyIllegalMoves,
        ]
        .into_iter()
        .find(|reason| reason.as_str() == text.trim())
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOutcome {
    pub result: GameResult,
    pub reason: EndReason,
}

/// A played move with what the save format needs to print it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    pub mv: Move,
    pub piece: PieceKind,
    /// `"+"` after a check, `"#"` after mate, empty otherwise.
    pub annotation: &'static str,
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_move(&self.mv, self.piece))?;
        if !self.annotation.is_empty() {
            write!(f, " {}", self.annotation)?;
        }
        Ok(())
    }
}

/// State of the position for the side to move after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionStatus {
    Ongoing,
    Checkmate,
    Stalemate,
    InsufficientMaterial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedMove {
    pub record: MoveRecord,
    pub status: PositionStatus,
}

/// Gives a move the kind the board implies. Notation does not mark captures,
/// so a plain move onto an enemy piece becomes a capture and a sideways pawn
/// move onto an empty square becomes en passant.
pub fn normalize_move(board: &Board, side: Color, mv: Move) -> Move {
    let target = board.piece_at(mv.to);
    let mover = board.piece_at(mv.from);
    if color_of(target) == Some(side.opposite()) {
        let kind = match mv.kind {
            MoveKind::Promotion { piece, .. } => MoveKind::Promotion { piece, capture: true },
            MoveKind::KingsideCastle | MoveKind::QueensideCastle => mv.kind,
            _ => MoveKind::Capture,
        };
        return Move::new(mv.from, mv.to, kind);
    }
    if mover == PieceKind::Pawn.on(side)
        && target == EMPTY
        && file_of(mv.from) != file_of(mv.to)
        && mv.kind.promotion().is_none()
    {
        return Move::new(mv.from, mv.to, MoveKind::EnPassant);
    }
    mv
}

/// Normalizes, validates and plays `mv` for the side to move. On refusal the
/// position is unchanged and the error names the reason.
pub fn play_validated_move(
    board: &mut Board,
    info: &mut GameInformation,
    mv: Move,
) -> ChessResult<AppliedMove> {
    let side = info.side_to_move;
    let mv = normalize_move(board, side, mv);
    let pseudo_legal = pseudo_legal_moves(board, info, side)?;
    let check = is_valid_move(&mv, board, info, &pseudo_legal);
    if let Err(reason) = check.verdict {
        return Err(ChessError::IllegalMove { side, reason });
    }
    let piece = PieceKind::from_code(board.piece_at(mv.from))
        .ok_or_else(|| ChessError::InvalidBoard(format!("no piece on {} for a legal move", mv.from)))?;

    board.make_move(&mv, side);
    info.update(board, &mv);

    let opponent = side.opposite();
    let in_check = is_in_check(board, opponent);
    let replies = pseudo_legal_moves(board, info, opponent)?;
    let can_reply = has_legal_move(&replies, board, info);

    let status = match (can_reply, in_check) {
        (false, true) => PositionStatus::Checkmate,
        (false, false) => PositionStatus::Stalemate,
        _ if board.is_insufficient_material() => PositionStatus::InsufficientMaterial,
        _ => PositionStatus::Ongoing,
    };
    let annotation = match status {
        PositionStatus::Checkmate => "#",
        _ if in_check => "+",
        _ => "",
    };

    Ok(AppliedMove {
        record: MoveRecord { mv, piece, annotation },
        status,
    })
}

pub struct GameController {
    board: Board,
    info: GameInformation,
    players: [Option<Box<dyn Player>>; 2],
    descriptions: [String; 2],
    moves: Vec<Move>,
    records: Vec<MoveRecord>,
    illegal_budget: [u32; 2],
    outcome: Option<GameOutcome>,
}

impl GameController {
    pub fn new(white: Box<dyn Player>, black: Box<dyn Player>, config: GameConfig) -> Self {
        Self::from_position(white, black, Board::new(), GameInformation::new(), config)
    }

    pub fn from_position(
        white: Box<dyn Player>,
        black: Box<dyn Player>,
        board: Board,
        info: GameInformation,
        config: GameConfig,
    ) -> Self {
        Self {
            board,
            info,
            descriptions: [white.description(), black.description()],
            players: [Some(white), Some(black)],
            moves: Vec::new(),
            records: Vec::new(),
            illegal_budget: [config.illegal_move_budget; 2],
            outcome: None,
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

    /// Every move accepted so far, in order.
    #[inline]
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    #[inline]
    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    #[inline]
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    #[inline]
    pub fn remaining_illegal_moves(&self, side: Color) -> u32 {
        self.illegal_budget[side.index()]
    }

    pub fn player_description(&self, side: Color) -> &str {
        &self.descriptions[side.index()]
    }

    /// Whether the side to move is played by a person.
    pub fn side_to_move_is_interactive(&self) -> bool {
        self.players[self.side_to_move().index()]
            .as_ref()
            .is_some_and(|player| player.is_interactive())
    }

    fn end_game(&mut self, result: GameResult, reason: EndReason) {
        info!(%result, %reason, "game over");
        self.outcome = Some(GameOutcome { result, reason });
    }

    /// Validates and plays `mv` for the side to move. An illegal move costs
    /// the mover one unit of budget; running out loses the game.
    pub fn submit_move(&mut self, mv: Move) -> ChessResult<()> {
        if self.is_over() {
            return Err(ChessError::GameOver);
        }
        let side = self.side_to_move();

        let applied = match play_validated_move(&mut self.board, &mut self.info, mv) {
            Ok(applied) => applied,
            Err(ChessError::IllegalMove { side, reason }) => {
                let budget = &mut self.illegal_budget[side.index()];
                *budget = budget.saturating_sub(1);
                let remaining = *budget;
                warn!(
                    player = %self.descriptions[side.index()],
                    mv = %mv,
                    %reason,
                    remaining,
                    "illegal move"
                );
                if remaining == 0 {
                    self.end_game(GameResult::win_for(side.opposite()), EndReason::TooManyIllegalMoves);
                }
                return Err(ChessError::IllegalMove { side, reason });
            }
            Err(other) => return Err(other),
        };

        info!(side = side.name(), mv = %applied.record, "move accepted");
        self.moves.push(applied.record.mv);
        self.records.push(applied.record);

        match applied.status {
            PositionStatus::Checkmate => self.end_game(GameResult::win_for(side), EndReason::Checkmate),
            PositionStatus::Stalemate => self.end_game(GameResult::Draw, EndReason::Stalemate),
            PositionStatus::InsufficientMaterial => {
                self.end_game(GameResult::Draw, EndReason::InsufficientMaterial)
            }
            PositionStatus::Ongoing => {}
        }
        Ok(())
    }

    /// The side to move gives up.
    pub fn resign(&mut self) -> ChessResult<()> {
        if self.is_over() {
            return Err(ChessError::GameOver);
        }
        let side = self.side_to_move();
        self.end_game(GameResult::win_for(side.opposite()), EndReason::Resignation);
        Ok(())
    }

    fn take_player(&mut self, side: Color) -> ChessResult<Box<dyn Player>> {
        self.players[side.index()]
            .take()
            .ok_or(ChessError::PlayerBusy { side })
    }

    fn handle_player_result(&mut self, result: ChessResult<Move>) -> ChessResult<()> {
        match result {
            Ok(mv) => self.submit_move(mv),
            Err(ChessError::Resigned) => self.resign(),
            Err(other) => Err(other),
        }
    }

    /// Asks the side to move for a move on this thread and submits it.
    pub fn play_turn(&mut self) -> ChessResult<()> {
        if self.is_over() {
            return Err(ChessError::GameOver);
        }
        let side = self.side_to_move();
        let mut player = self.take_player(side)?;
        let result = player.make_move(&self.moves);
        self.players[side.index()] = Some(player);
        self.handle_player_result(result)
    }

    /// Hands the side to move's player to a worker thread. Finish with [`Self::finish_turn`].
    pub fn start_turn_in_background(&mut self) -> ChessResult<PendingMove> {
        if self.is_over() {
            return Err(ChessError::GameOver);
        }
        let side = self.side_to_move();
        let player = self.take_player(side)?;
        spawn_move(player, side, self.moves.clone())
    }

    /// Takes the player back from the worker and submits its move.
    pub fn finish_turn(&mut self, pending: PendingMove) -> ChessResult<()> {
        let side = pending.side();
        let finished = pending.join()?;
        self.players[side.index()] = Some(finished.player);
        self.handle_player_result(finished.result)
    }

    /// The game as a save-file record. An unfinished game is written with `*`.
    pub fn to_saved_game(&self) -> SavedGame {
        let (result, reason) = match self.outcome {
            Some(outcome) => (outcome.result.to_string(), outcome.reason.to_string()),
            None => ("*".to_string(), "Unfinished".to_string()),
        };
        SavedGame {
            white: self.descriptions[0].clone(),
            black: self.descriptions[1].clone(),
            result,
            reason,
            moves: self.records.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::IllegalMoveReason;
    use crate::moves::chess_move::PromotionPiece;
    use crate::moves::notation::parse_move;
    use crate::utils::fen_parser::parse_fen;

    /// Plays a fixed list of moves, then resigns.
    struct Scripted {
        moves: Vec<Move>,
        next: usize,
    }

    impl Scripted {
        fn boxed(moves: Vec<Move>) -> Box<dyn Player> {
            Box::new(Self { moves, next: 0 })
        }
    }

    impl Player for Scripted {
        fn make_move(&mut self, _history: &[Move]) -> ChessResult<Move> {
            let mv = self.moves.get(self.next).copied().ok_or(ChessError::Resigned)?;
            self.next += 1;
            Ok(mv)
        }

        fn description(&self) -> String {
            "Scripted".to_string()
        }
    }

    fn notation(text: &str, side: Color) -> Move {
        parse_move(text, side).expect("fixture move should parse")
    }

    fn controller(white: Vec<Move>, black: Vec<Move>) -> GameController {
        GameController::new(Scripted::boxed(white), Scripted::boxed(black), GameConfig::default())
    }

    #[test]
    fn fools_mate_ends_in_checkmate() {
        let white = vec![notation("P f2 f3", Color::White), notation("P g2 g4", Color::White)];
        let black = vec![notation("P e7 e5", Color::Black), notation("Q d8 h4", Color::Black)];
        let mut game = controller(white, black);
        while !game.is_over() {
            game.play_turn().expect("scripted moves are legal");
        }
        let outcome = game.outcome().expect("game finished");
        assert_eq!(outcome.result, GameResult::BlackWins);
        assert_eq!(outcome.reason, EndReason::Checkmate);
        assert_eq!(game.moves().len(), 4);
        assert_eq!(game.records()[3].annotation, "#");
        assert_eq!(game.records()[3].to_string(), "Q d8 h4 #");
        assert!(matches!(game.play_turn(), Err(ChessError::GameOver)));
    }

    #[test]
    fn illegal_moves_drain_the_budget() {
        let mut game = controller(Vec::new(), Vec::new());
        for expected_left in (0..DEFAULT_ILLEGAL_MOVE_BUDGET).rev() {
            let err = game.submit_move(notation("P e2 e5", Color::White)).unwrap_err();
            assert!(matches!(
                err,
                ChessError::IllegalMove {
                    side: Color::White,
                    reason: IllegalMoveReason::NotPseudoLegal
                }
            ));
            assert_eq!(game.remaining_illegal_moves(Color::White), expected_left);
        }
        let outcome = game.outcome().expect("budget exhausted");
        assert_eq!(outcome.result, GameResult::BlackWins);
        assert_eq!(outcome.reason, EndReason::TooManyIllegalMoves);
        assert_eq!(game.board(), &Board::new());
    }

    #[test]
    fn leaving_the_king_in_check_is_reported() {
        let (board, info) = parse_fen("4k3/8/8/8/8/8/4r3/3QK3 w - - 0 1").expect("fixture FEN should parse");
        let mut game = GameController::from_position(
            Scripted::boxed(Vec::new()),
            Scripted::boxed(Vec::new()),
            board,
            info,
            GameConfig::default(),
        );
        let err = game.submit_move(notation("Q d1 a4", Color::White)).unwrap_err();
        assert!(matches!(
            err,
            ChessError::IllegalMove {
                reason: IllegalMoveReason::LeavesKingInCheck,
                ..
            }
        ));
        game.submit_move(notation("K e1 e2", Color::White)).expect("king takes rook");
        assert_eq!(game.records()[0].mv.kind, MoveKind::Capture);
        assert!(game.outcome().is_none());
    }

    #[test]
    fn notation_moves_are_normalized() {
        let board = parse_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").expect("fixture FEN should parse").0;
        let ep = normalize_move(&board, Color::White, notation("P e5 d6", Color::White));
        assert_eq!(ep.kind, MoveKind::EnPassant);

        let board = parse_fen("3rk3/4P3/8/8/8/8/8/4K3 w - - 0 1").expect("fixture FEN should parse").0;
        let promo = normalize_move(&board, Color::White, notation("P e7 d8 Q", Color::White));
        assert_eq!(
            promo.kind,
            MoveKind::Promotion {
                piece: PromotionPiece::Queen,
                capture: true
            }
        );
    }

    #[test]
    fn resignation_ends_the_game_for_the_mover() {
        let mut game = controller(vec![notation("P e2 e4", Color::White)], Vec::new());
        game.play_turn().expect("white moves");
        game.play_turn().expect("black resigns");
        let outcome = game.outcome().expect("game finished");
        assert_eq!(outcome.result, GameResult::WhiteWins);
        assert_eq!(outcome.reason, EndReason::Resignation);
    }

    #[test]
    fn background_turns_return_the_player() {
        let mut game = controller(vec![notation("P e2 e4", Color::White)], Vec::new());
        let pending = game.start_turn_in_background().expect("worker starts");
        assert!(matches!(
            game.start_turn_in_background(),
            Err(ChessError::PlayerBusy { side: Color::White })
        ));
        game.finish_turn(pending).expect("move accepted");
        assert_eq!(game.side_to_move(), Color::Black);
        assert_eq!(game.moves().len(), 1);
        assert_eq!(game.player_description(Color::White), "Scripted");
    }
}
