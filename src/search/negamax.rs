//! Fixed-depth negamax with alpha-beta pruning and transposition-table memoization.
//!
//! The root enumerates legal moves and returns the best one; every other node
//! returns a score for its side to move. Moves are made in place on a single
//! board through [`Board::make_scoped`], so an early `?` return still restores
//! the position.

use std::sync::mpsc::Sender;

use tracing::{debug, debug_span};

use crate::errors::{ChessError, ChessResult};
use crate::game_state::board::Board;
use crate::game_state::game_information::GameInformation;
use crate::move_generation::legal_move_checks::is_legal_move;
use crate::move_generation::move_generator::generate_pseudo_legal_moves;
use crate::moves::chess_move::{sort_by_score, Move, NULL_MOVE};
use crate::search::board_scoring::{
    is_special_board, BoardScorer, PositionalScorer, BEST_VALUE, WORST_VALUE,
};
use crate::search::transposition_table::{Bound, TTEntry, TranspositionTable};
use crate::search::zobrist::compute_hash;

pub const DEFAULT_SEARCH_DEPTH: u32 = 4;
pub const DEFAULT_TT_SIZE_MB: usize = 64;

/// Per-engine search settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Plies searched from the root. Values below 1 are treated as 1.
    pub depth: u32,
    pub tt_size_mb: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_SEARCH_DEPTH,
            tt_size_mb: DEFAULT_TT_SIZE_MB,
        }
    }
}

/// Root moves searched so far out of the root's legal move count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchProgress {
    pub evaluated: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Calls to the recursive search, root children included.
    pub nodes: u64,
    pub tt_hits: u64,
    pub beta_cutoffs: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct SearchResult {
    pub best_move: Move,
    pub score: i32,
    pub stats: SearchStats,
}

pub struct NegamaxSearch {
    config: SearchConfig,
    tt: TranspositionTable,
    scorer: Box<dyn BoardScorer>,
    progress: Option<Sender<SearchProgress>>,
    root_depth: u32,
    stats: SearchStats,
}

impl NegamaxSearch {
    pub fn new(config: SearchConfig) -> Self {
        Self::with_scorer(config, Box::new(PositionalScorer))
    }

    pub fn with_scorer(config: SearchConfig, scorer: Box<dyn BoardScorer>) -> Self {
        Self {
            config,
            tt: TranspositionTable::new_with_mb(config.tt_size_mb),
            scorer,
            progress: None,
            root_depth: config.depth.max(1),
            stats: SearchStats::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> SearchConfig {
        self.config
    }

    #[inline]
    pub fn transposition_table(&mut self) -> &mut TranspositionTable {
        &mut self.tt
    }

    #[inline]
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Receives a [`SearchProgress`] after each root move. Sends never block.
    pub fn set_progress_sender(&mut self, sender: Sender<SearchProgress>) {
        self.progress = Some(sender);
    }

    fn report(&self, evaluated: usize, total: usize) {
        if let Some(sender) = &self.progress {
            // A dropped receiver only means nobody is watching.
            let _ = sender.send(SearchProgress { evaluated, total });
        }
    }

    /// Best move for the side to move in `info`. `board` is left as it was.
    ///
    /// Every root move is searched with the full window and ties go to the
    /// later move. Fails with [`ChessError::NoLegalMoves`] in a finished position.
    pub fn best_move(&mut self, board: &mut Board, info: &GameInformation) -> ChessResult<SearchResult> {
        self.root_depth = self.config.depth.max(1);
        self.stats = SearchStats::default();
        let span = debug_span!("search", depth = self.root_depth);
        let _guard = span.enter();

        let side = info.side_to_move;
        let mut moves = Vec::with_capacity(48);
        generate_pseudo_legal_moves(board, info, side, &mut moves)?;
        moves.retain(|mv| is_legal_move(mv, board, info));
        if moves.is_empty() {
            debug!("no legal moves at the root");
            return Err(ChessError::NoLegalMoves);
        }
        sort_by_score(&mut moves);

        let total = moves.len();
        self.report(0, total);

        let mut best_move = NULL_MOVE;
        let mut best_score = WORST_VALUE;
        for (index, mv) in moves.iter().enumerate() {
            let score = {
                let mut child = board.make_scoped(mv, side);
                let child_info = info.after(&child, mv);
                -self.negamax(&mut child, WORST_VALUE, BEST_VALUE, self.root_depth - 1, &child_info)?
            };
            if score >= best_score {
                best_score = score;
                best_move = *mv;
            }
            self.report(index + 1, total);
        }

        self.tt.invalidate_all();
        debug!(
            best = %best_move,
            score = best_score,
            nodes = self.stats.nodes,
            tt_hits = self.stats.tt_hits,
            cutoffs = self.stats.beta_cutoffs,
            "search finished"
        );

        Ok(SearchResult {
            best_move,
            score: best_score,
            stats: self.stats,
        })
    }

    /// Score of the position for its side to move, searched `depth_left` plies deep.
    pub fn negamax(
        &mut self,
        board: &mut Board,
        mut alpha: i32,
        mut beta: i32,
        depth_left: u32,
        info: &GameInformation,
    ) -> ChessResult<i32> {
        self.stats.nodes += 1;
        let side = info.side_to_move;
        let original_alpha = alpha;
        let hash = compute_hash(board, info);

        let slot = self.tt.find(hash);
        if slot.matches(hash) && slot.depth >= depth_left {
            slot.useful = true;
            self.stats.tt_hits += 1;
            match slot.bound {
                Bound::Exact => return Ok(slot.score),
                Bound::Lower => alpha = alpha.max(slot.score),
                Bound::Upper => beta = beta.min(slot.score),
                Bound::Uninitialized => {}
            }
            if alpha >= beta {
                return Ok(slot.score);
            }
        }

        let mut moves = Vec::with_capacity(48);
        generate_pseudo_legal_moves(board, info, side, &mut moves)?;
        sort_by_score(&mut moves);
        let first_legal = moves.iter().position(|mv| is_legal_move(mv, board, info));

        let ply = self.root_depth.saturating_sub(depth_left);
        if depth_left == 0 {
            if let Some(score) = is_special_board(side, board, first_legal.is_some(), ply) {
                return Ok(score);
            }
            return Ok(self.scorer.score(side, board, info, moves.len()));
        }

        let Some(first_legal) = first_legal else {
            return Ok(is_special_board(side, board, false, ply).unwrap_or(0));
        };

        let mut best_score = WORST_VALUE;
        let mut best_move = NULL_MOVE;
        for (index, mv) in moves.iter().enumerate().skip(first_legal) {
            if index != first_legal && !is_legal_move(mv, board, info) {
                continue;
            }
            let score = {
                let mut child = board.make_scoped(mv, side);
                let child_info = info.after(&child, mv);
                -self.negamax(&mut child, -beta, -alpha, depth_left - 1, &child_info)?
            };
            if score > best_score {
                best_score = score;
                best_move = *mv;
            }
            alpha = alpha.max(best_score);
            if best_score >= beta {
                self.stats.beta_cutoffs += 1;
                break;
            }
        }

        // Classified against the window actually searched: a table bound may
        // have narrowed `beta`, and a fail-high there is only a lower bound.
        let bound = if best_score <= original_alpha {
            Bound::Upper
        } else if best_score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.tt.put(TTEntry {
            hash,
            bound,
            depth: depth_left,
            score: best_score,
            useful: false,
            best_move,
        });

        Ok(alpha)
    }
}
