//! Tchess: a mailbox chess engine with a negamax searcher.
//!
//! The core is the board and its move generation, the legality checks, the
//! static evaluator and the search with its transposition table and opening
//! book. Around it sit the player agents, the worker thread that runs them, the
//! game controller and the save-file format used by the `tchess` binary.

pub mod errors;

pub mod game_state {
    pub mod board;
    pub mod chess_types;
    pub mod game_information;
}

pub mod moves {
    pub mod chess_move;
    pub mod notation;
}

pub mod move_generation {
    pub mod legal_move_checks;
    pub mod move_generator;
    pub mod perft;
}

pub mod search {
    pub mod board_scoring;
    pub mod negamax;
    pub mod transposition_table;
    pub mod zobrist;
}

pub mod tables {
    pub mod opening_book;
}

pub mod engines {
    pub mod engine_greedy;
    pub mod engine_human;
    pub mod engine_random;
    pub mod engine_replay;
    pub mod engine_search;
    pub mod player_trait;
    pub mod worker;
}

pub mod game {
    pub mod game_controller;
    pub mod saved_game;
}

pub mod utils {
    pub mod fen_parser;
    pub mod render_board;
}
