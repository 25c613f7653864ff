use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tchess::engines::engine_greedy::GreedyPlayer;
use tchess::engines::engine_human::HumanPlayer;
use tchess::engines::engine_random::RandomPlayer;
use tchess::engines::engine_replay::ReplayPlayer;
use tchess::engines::engine_search::{EngineConfig, EnginePlayer};
use tchess::engines::player_trait::Player;
use tchess::errors::{ChessError, ChessResult};
use tchess::game::game_controller::{GameConfig, GameController, DEFAULT_ILLEGAL_MOVE_BUDGET};
use tchess::game::saved_game::{default_save_file_name, SavedGame};
use tchess::game_state::board::Board;
use tchess::game_state::chess_types::Color;
use tchess::game_state::game_information::GameInformation;
use tchess::search::negamax::{SearchConfig, DEFAULT_SEARCH_DEPTH, DEFAULT_TT_SIZE_MB};
use tchess::utils::fen_parser::parse_fen;
use tchess::utils::render_board::render_board;

const PROGRESS_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PlayerKind {
    Human,
    Engine,
    Random,
    Greedy,
}

#[derive(Debug, Parser)]
#[command(name = "tchess", version, about = "Terminal chess against a negamax engine")]
struct Cli {
    /// Who plays White.
    #[arg(long, value_enum, default_value_t = PlayerKind::Human)]
    white: PlayerKind,

    /// Who plays Black.
    #[arg(long, value_enum, default_value_t = PlayerKind::Engine)]
    black: PlayerKind,

    /// Engine search depth in plies.
    #[arg(short, long, default_value_t = DEFAULT_SEARCH_DEPTH)]
    depth: u32,

    /// Transposition table size in megabytes.
    #[arg(long = "tt-mb", default_value_t = DEFAULT_TT_SIZE_MB)]
    tt_mb: usize,

    /// Polyglot opening book for the engine.
    #[arg(long)]
    book: Option<PathBuf>,

    /// Hashing key table the book was built with (781 hex keys, e.g. Polyglot's Random64).
    #[arg(long, requires = "book", value_name = "PATH")]
    book_keys: Option<PathBuf>,

    /// Seed for the random player and book choices.
    #[arg(long)]
    seed: Option<u64>,

    /// Start from this FEN instead of the standard position.
    #[arg(long, conflicts_with = "replay")]
    fen: Option<String>,

    /// Save the game when it ends; without a path a timestamped name is used.
    #[arg(long, num_args = 0..=1, value_name = "PATH")]
    save: Option<Option<PathBuf>>,

    /// Replay both sides of a saved game.
    #[arg(long, value_name = "PATH")]
    replay: Option<PathBuf>,

    /// Stop after this many plies.
    #[arg(long)]
    max_plies: Option<usize>,

    /// Illegal moves each side may submit before forfeiting.
    #[arg(long, default_value_t = DEFAULT_ILLEGAL_MOVE_BUDGET)]
    illegal_moves: u32,
}

fn build_player(
    kind: PlayerKind,
    side: Color,
    cli: &Cli,
    board: &Board,
    info: &GameInformation,
) -> ChessResult<Box<dyn Player>> {
    let seed = cli.seed.map(|seed| seed.wrapping_add(side.index() as u64));
    let player: Box<dyn Player> = match kind {
        PlayerKind::Human => Box::new(HumanPlayer::stdio(side)),
        PlayerKind::Random => Box::new(RandomPlayer::from_position(board.clone(), info.clone(), seed)),
        PlayerKind::Greedy => Box::new(GreedyPlayer::from_position(side, board.clone(), info.clone())),
        PlayerKind::Engine => {
            let config = EngineConfig {
                search: SearchConfig {
                    depth: cli.depth,
                    tt_size_mb: cli.tt_mb,
                },
                book_path: cli.book.clone(),
                book_keys_path: cli.book_keys.clone(),
                use_book: true,
                seed,
            };
            Box::new(EnginePlayer::from_position(config, board.clone(), info.clone())?)
        }
    };
    Ok(player)
}

fn build_game(cli: &Cli) -> ChessResult<GameController> {
    let config = GameConfig {
        illegal_move_budget: cli.illegal_moves,
    };

    if let Some(path) = &cli.replay {
        let saved = SavedGame::read_from(path)?;
        info!(path = %path.display(), moves = saved.moves.len(), "replaying saved game");
        return Ok(GameController::new(
            Box::new(ReplayPlayer::new(&saved, Color::White)),
            Box::new(ReplayPlayer::new(&saved, Color::Black)),
            config,
        ));
    }

    let (board, info) = match &cli.fen {
        Some(fen) => parse_fen(fen)?,
        None => (Board::new(), GameInformation::new()),
    };
    let white = build_player(cli.white, Color::White, cli, &board, &info)?;
    let black = build_player(cli.black, Color::Black, cli, &board, &info)?;
    Ok(GameController::from_position(white, black, board, info, config))
}

/// Runs the side to move on a worker thread, showing search progress.
fn play_in_background(game: &mut GameController) -> ChessResult<()> {
    let mut pending = game.start_turn_in_background()?;
    let mut shown = None;
    while !pending.is_finished() {
        let progress = pending.try_progress();
        if let Some(current) = progress.filter(|current| shown != Some(*current)) {
            eprint!("\r{} is thinking: {}/{} moves", pending.side(), current.evaluated, current.total);
            shown = Some(current);
        }
        thread::sleep(PROGRESS_POLL);
    }
    if shown.is_some() {
        eprintln!();
    }
    game.finish_turn(pending)
}

fn run(cli: Cli) -> ChessResult<()> {
    let mut game = build_game(&cli)?;
    println!(
        "{} (White) vs {} (Black)",
        game.player_description(Color::White),
        game.player_description(Color::Black)
    );

    let mut plies = 0;
    while !game.is_over() {
        if cli.max_plies.is_some_and(|max| plies >= max) {
            info!(plies, "ply limit reached");
            break;
        }

        let turn = if game.side_to_move_is_interactive() {
            println!("{}", render_board(game.board()));
            game.play_turn()
        } else {
            play_in_background(&mut game)
        };

        match turn {
            Ok(()) => {
                plies += 1;
                if let Some(record) = game.records().last() {
                    println!("{}. {record}", plies);
                }
            }
            Err(ChessError::IllegalMove { side, reason }) => {
                println!(
                    "Illegal move: {reason} ({} attempts left for {side})",
                    game.remaining_illegal_moves(side)
                );
            }
            Err(ChessError::ReplayExhausted) => {
                info!("saved game has no more moves");
                break;
            }
            Err(err) => return Err(err),
        }
    }

    println!("{}", render_board(game.board()));
    match game.outcome() {
        Some(outcome) => println!("{} ({})", outcome.result, outcome.reason),
        None => println!("Game stopped before it ended"),
    }

    if let Some(path) = cli.save {
        if cli.fen.is_some() {
            warn!("games started from a FEN are not saved");
        } else {
            let path = path.unwrap_or_else(|| PathBuf::from(default_save_file_name(chrono::Local::now())));
            game.to_saved_game().write_to(&path)?;
            println!("Game saved to {}", path.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "tchess stopped");
            ExitCode::FAILURE
        }
    }
}
