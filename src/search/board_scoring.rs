//! Static position evaluation and terminal-position detection.
//!
//! Scores are signed from the point of view of the side passed in. The
//! evaluator sums material, piece-square tables (a separate king table in the
//! endgame), pawn structure, bishop and rook terms, a castling incentive, king
//! safety and a pseudo-legal mobility bonus.

use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::game_information::GameInformation;
use crate::move_generation::legal_move_checks::is_attacked;

/// Lowest score in use; mates are offset from here by ply.
pub const WORST_VALUE: i32 = i32::MIN + 100;
pub const BEST_VALUE: i32 = i32::MAX - 100;

/// Material value by piece code.
pub const PIECE_VALUES: [i32; 7] = [0, 100, 320, 330, 500, 20000, 900];

/// Coarse material used to detect the endgame.
const PHASE_MATERIAL: [u32; 7] = [0, 1, 3, 3, 5, 0, 9];
const ENDGAME_MATERIAL_LIMIT: u32 = 13;

const DOUBLED_PAWN_PENALTY: i32 = 8;
const ISOLATED_PAWN_PENALTY: i32 = 2;
const LOCKED_BISHOP_PENALTY: i32 = 10;
const BISHOP_PAIR_BONUS: i32 = 15;
const OPEN_FILE_BONUS: i32 = 10;
const HALF_OPEN_FILE_BONUS: i32 = 3;
const IN_CHECK_PENALTY: i32 = 20;
const MOBILITY_WEIGHT: i32 = 2;

// Piece-square tables from White's point of view, a8 first. Black reads them
// vertically mirrored.
#[rustfmt::skip]
const PAWN_TABLE: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
    50, 50, 50, 50, 50, 50, 50, 50,
    10, 10, 20, 30, 30, 20, 10, 10,
     5,  5, 10, 25, 25, 10,  5,  5,
     0,  0,  0, 20, 20,  0,  0,  0,
     5, -5,-10,  0,  0,-10, -5,  5,
     5, 10, 10,-20,-20, 10, 10,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT_TABLE: [i32; 64] = [
    -50,-40,-30,-30,-30,-30,-40,-50,
    -40,-20,  0,  0,  0,  0,-20,-40,
    -30,  0, 10, 15, 15, 10,  0,-30,
    -30,  5, 15, 20, 20, 15,  5,-30,
    -30,  0, 15, 20, 20, 15,  0,-30,
    -30,  5, 10, 15, 15, 10,  5,-30,
    -40,-20,  0,  5,  5,  0,-20,-40,
    -50,-25,-30,-30,-30,-30,-25,-50,
];

#[rustfmt::skip]
const BISHOP_TABLE: [i32; 64] = [
    -20,-10,-10,-10,-10,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5, 10, 10,  5,  0,-10,
    -10,  5,  5, 10, 10,  5,  5,-10,
    -10,  0, 10, 10, 10, 10,  0,-10,
    -10, 10, 10, 10, 10, 10, 10,-10,
    -10,  5,  0,  0,  0,  0,  5,-10,
    -20,-10,-10,-10,-10,-10,-10,-20,
];

#[rustfmt::skip]
const ROOK_TABLE: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10, 10, 10, 10, 10,  5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     0,  0,  0,  5,  5,  0,  0,  0,
];

#[rustfmt::skip]
const KING_TABLE: [i32; 64] = [
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -20,-30,-30,-40,-40,-30,-30,-20,
    -10,-20,-20,-20,-20,-20,-20,-10,
     20, 20,  0,  0,  0,  0, 20, 20,
     20, 30, 10,  0,  0, 10, 30, 20,
];

#[rustfmt::skip]
const KING_ENDGAME_TABLE: [i32; 64] = [
    -50,-40,-30,-20,-20,-30,-40,-50,
    -30,-20,-10,  0,  0,-10,-20,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-30,  0,  0,  0,  0,-30,-30,
    -50,-30,-30,-30,-30,-30,-30,-50,
];

#[rustfmt::skip]
const QUEEN_TABLE: [i32; 64] = [
    -20,-10,-10, -5, -5,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5,  5,  5,  5,  0,-10,
     -5,  0,  5,  5,  5,  5,  0, -5,
      0,  0,  5,  5,  5,  5,  0, -5,
    -10,  5,  5,  5,  5,  5,  0,-10,
    -10,  0,  5,  0,  0,  0,  0,-10,
    -20,-10,-10, -5, -5,-10,-10,-20,
];

/// Pluggable static evaluation used by search and the greedy player.
pub trait BoardScorer: Send + Sync {
    /// Score of the position for `side`. `move_count` is the number of
    /// pseudo-legal moves `side` has in it.
    fn score(&self, side: Color, board: &Board, info: &GameInformation, move_count: usize) -> i32;
}

/// The full positional evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalScorer;

impl BoardScorer for PositionalScorer {
    fn score(&self, side: Color, board: &Board, info: &GameInformation, move_count: usize) -> i32 {
        evaluate_board(side, board, info, move_count)
    }
}

/// Terminal score if the position needs no evaluation: a draw by insufficient
/// material or stalemate, or a mate against `side` found `ply` plies from the root.
pub fn is_special_board(side: Color, board: &Board, has_legal_move: bool, ply: u32) -> Option<i32> {
    if board.is_insufficient_material() {
        return Some(0);
    }
    if has_legal_move {
        return None;
    }
    if is_attacked(board, side.opposite(), board.king_square(side)) {
        Some(WORST_VALUE.saturating_add(ply as i32))
    } else {
        Some(0)
    }
}

/// Each side's non-king material is at most 13 (pawn 1, minor 3, rook 5, queen 9).
pub fn is_endgame(board: &Board) -> bool {
    let mut material = [0u32; 2];
    for &code in board.squares() {
        if let (Some(kind), Some(color)) = (PieceKind::from_code(code), color_of(code)) {
            material[color.index()] += PHASE_MATERIAL[kind.index()];
        }
    }
    material.iter().all(|&m| m <= ENDGAME_MATERIAL_LIMIT)
}

#[inline]
fn table_index(square: Square, owner: Color) -> usize {
    match owner {
        Color::White => square,
        Color::Black => square ^ 56,
    }
}

fn piece_square_value(kind: PieceKind, owner: Color, square: Square, endgame: bool) -> i32 {
    let index = table_index(square, owner);
    match kind {
        PieceKind::Pawn => PAWN_TABLE[index],
        PieceKind::Knight => KNIGHT_TABLE[index],
        PieceKind::Bishop => BISHOP_TABLE[index],
        PieceKind::Rook => ROOK_TABLE[index],
        PieceKind::Queen => QUEEN_TABLE[index],
        PieceKind::King if endgame => KING_ENDGAME_TABLE[index],
        PieceKind::King => KING_TABLE[index],
    }
}

/// No enemy pawn ahead of the pawn on its own or an adjacent file.
pub fn is_passed_pawn(owner: Color, square: Square, board: &Board) -> bool {
    let enemy_pawn = PieceKind::Pawn.on(owner.opposite());
    let file = file_of(square) as isize;
    let row = row_of(square);
    let rows_ahead = match owner {
        Color::White => 0..row,
        Color::Black => row + 1..8,
    };
    for ahead in rows_ahead {
        for f in (file - 1).max(0)..=(file + 1).min(7) {
            if board.piece_at(ahead * 8 + f as usize) == enemy_pawn {
                return false;
            }
        }
    }
    true
}

/// Pawns of `owner` on `file` when there are two or more, else zero.
pub fn doubled_pawn_count(owner: Color, file: usize, board: &Board) -> i32 {
    let own_pawn = PieceKind::Pawn.on(owner);
    let count = (0..8)
        .filter(|row| board.piece_at(row * 8 + file) == own_pawn)
        .count() as i32;
    if count < 2 {
        0
    } else {
        count
    }
}

/// No friendly pawn one step away on an adjacent file.
pub fn is_isolated_pawn(owner: Color, square: Square, board: &Board) -> bool {
    let own_pawn = PieceKind::Pawn.on(owner);
    [-11, -9, -1, 1, 9, 11]
        .iter()
        .filter_map(|&direction| mailbox_step(square, direction))
        .all(|neighbour| board.piece_at(neighbour) != own_pawn)
}

/// Friendly pawns diagonally adjacent to a bishop.
pub fn locked_bishop_pawns(owner: Color, square: Square, board: &Board) -> i32 {
    let own_pawn = PieceKind::Pawn.on(owner);
    directions(PieceKind::Bishop)
        .iter()
        .filter_map(|&direction| mailbox_step(square, direction))
        .filter(|&neighbour| board.piece_at(neighbour) == own_pawn)
        .count() as i32
}

/// Bonus for a rook on an open or half-open file.
pub fn rook_file_bonus(owner: Color, square: Square, board: &Board) -> i32 {
    let own_pawn = PieceKind::Pawn.on(owner);
    let enemy_pawn = PieceKind::Pawn.on(owner.opposite());
    let file = file_of(square);
    let mut own = false;
    let mut enemy = false;
    for row in 0..8 {
        let code = board.piece_at(row * 8 + file);
        own |= code == own_pawn;
        enemy |= code == enemy_pawn;
    }
    match (own, enemy) {
        (false, false) => OPEN_FILE_BONUS,
        (false, true) => HALF_OPEN_FILE_BONUS,
        _ => 0,
    }
}

/// Friendly minus enemy pieces in the king's quarter of the board, times five.
/// A queen counts as three.
pub fn king_safety(owner: Color, square: Square, board: &Board) -> i32 {
    let files = if file_of(square) < 4 { 0..4 } else { 4..8 };
    let rows = if row_of(square) < 4 { 0..4 } else { 4..8 };
    let mut balance = 0i32;
    for row in rows {
        for file in files.clone() {
            let checked = row * 8 + file;
            if checked == square {
                continue;
            }
            let code = board.piece_at(checked);
            let (Some(kind), Some(color)) = (PieceKind::from_code(code), color_of(code)) else {
                continue;
            };
            let weight = if kind == PieceKind::Queen { 3 } else { 1 };
            balance += if color == owner { weight } else { -weight };
        }
    }
    5 * balance
}

/// Static score of the position for `side`.
pub fn evaluate_board(side: Color, board: &Board, info: &GameInformation, move_count: usize) -> i32 {
    let enemy = side.opposite();
    let endgame = is_endgame(board);
    let in_check = [
        is_attacked(board, Color::Black, board.king_square(Color::White)),
        is_attacked(board, Color::White, board.king_square(Color::Black)),
    ];

    let mut bishops = [0u32; 2];
    let mut doubled_checked = [[false; 8]; 2];
    let mut evaluation = 0i32;

    for square in 0..64 {
        let code = board.piece_at(square);
        let (Some(kind), Some(owner)) = (PieceKind::from_code(code), color_of(code)) else {
            continue;
        };

        // Every term below is from the owner's point of view.
        let mut term = PIECE_VALUES[kind.index()] + piece_square_value(kind, owner, square, endgame);
        match kind {
            PieceKind::Pawn => {
                if is_passed_pawn(owner, square, board) {
                    term += if endgame { 20 } else { 10 };
                }
                let file = file_of(square);
                if !doubled_checked[owner.index()][file] {
                    term -= DOUBLED_PAWN_PENALTY * doubled_pawn_count(owner, file, board);
                    doubled_checked[owner.index()][file] = true;
                }
                if is_isolated_pawn(owner, square, board) {
                    term -= ISOLATED_PAWN_PENALTY;
                }
            }
            PieceKind::Bishop => {
                bishops[owner.index()] += 1;
                term -= LOCKED_BISHOP_PENALTY * locked_bishop_pawns(owner, square, board);
            }
            PieceKind::Rook => term += rook_file_bonus(owner, square, board),
            PieceKind::King => {
                term += king_safety(owner, square, board);
                if in_check[owner.index()] {
                    term -= IN_CHECK_PENALTY;
                }
            }
            PieceKind::Knight | PieceKind::Queen => {}
        }

        evaluation += if owner == side { term } else { -term };
    }

    for (color, sign) in [(side, 1), (enemy, -1)] {
        if bishops[color.index()] >= 2 {
            evaluation += sign * BISHOP_PAIR_BONUS;
        }
        if !endgame && !info.has_castled(color) {
            let rights = info.kingside_castle_right(color) || info.queenside_castle_right(color);
            evaluation -= sign * if rights { 15 } else { 25 };
        }
    }

    // Pseudo-legal moves approximate mobility only when not in check.
    if !in_check[side.index()] {
        evaluation += MOBILITY_WEIGHT * move_count as i32;
    }
    evaluation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_generation::legal_move_checks::legal_moves;
    use crate::move_generation::move_generator::pseudo_legal_moves;
    use crate::utils::fen_parser::parse_fen;

    #[test]
    fn start_position_is_balanced_apart_from_mobility() {
        let board = Board::new();
        let info = GameInformation::new();
        assert_eq!(evaluate_board(Color::White, &board, &info, 0), 0);
        assert_eq!(evaluate_board(Color::Black, &board, &info, 0), 0);
        assert_eq!(evaluate_board(Color::White, &board, &info, 20), 40);
    }

    #[test]
    fn material_advantage_shows_for_both_sides() {
        let (board, info) =
            parse_fen("r1bqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").expect("fixture");
        let white = evaluate_board(Color::White, &board, &info, 0);
        let black = evaluate_board(Color::Black, &board, &info, 0);
        assert!(white > 250);
        assert_eq!(white, -black);
    }

    #[test]
    fn pawn_structure_helpers() {
        let (board, _) = parse_fen("4k3/8/8/3p4/8/P7/P3P3/4K3 w - - 0 1").expect("fixture");
        assert!(is_passed_pawn(Color::White, 48, &board));
        assert!(!is_passed_pawn(Color::White, 52, &board));
        assert!(!is_passed_pawn(Color::Black, 27, &board));
        assert_eq!(doubled_pawn_count(Color::White, 0, &board), 2);
        assert_eq!(doubled_pawn_count(Color::White, 4, &board), 0);
        assert!(is_isolated_pawn(Color::White, 52, &board));
        assert!(is_isolated_pawn(Color::White, 40, &board));
        assert!(is_isolated_pawn(Color::Black, 27, &board));
    }

    #[test]
    fn rook_file_and_bishop_helpers() {
        let (board, _) = parse_fen("4k3/p7/8/8/8/8/1P6/R1B1K2R w - - 0 1").expect("fixture");
        assert_eq!(rook_file_bonus(Color::White, 56, &board), HALF_OPEN_FILE_BONUS);
        assert_eq!(rook_file_bonus(Color::White, 63, &board), OPEN_FILE_BONUS);
        assert_eq!(locked_bishop_pawns(Color::White, 58, &board), 1);
        assert_eq!(locked_bishop_pawns(Color::Black, 58, &board), 0);
    }

    #[test]
    fn king_safety_counts_its_quarter() {
        let board = Board::new();
        assert_eq!(king_safety(Color::White, 60, &board), 35);
        assert_eq!(king_safety(Color::Black, 4, &board), 35);
    }

    #[test]
    fn endgame_detection() {
        assert!(!is_endgame(&Board::new()));
        let (board, _) = parse_fen("4k3/pppp4/8/8/8/8/PPPP4/R2QK3 w - - 0 1").expect("fixture");
        assert!(!is_endgame(&board));
        let (board, _) = parse_fen("4k3/pppp4/8/8/8/8/PPPP4/3QK3 w - - 0 1").expect("fixture");
        assert!(is_endgame(&board));
    }

    #[test]
    fn special_board_detects_mate_stalemate_and_draws() {
        // Scholar's mate: Black to move, checkmated
        let (mut board, info) =
            parse_fen("r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4")
                .expect("fixture");
        let legal = legal_moves(&mut board, &info).expect("generation");
        assert!(legal.is_empty());
        assert_eq!(is_special_board(Color::Black, &board, false, 0), Some(WORST_VALUE));
        assert_eq!(is_special_board(Color::Black, &board, false, 3), Some(WORST_VALUE + 3));

        let (mut board, info) = parse_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").expect("fixture");
        let pseudo = pseudo_legal_moves(&board, &info, Color::Black).expect("generation");
        assert!(!pseudo.is_empty());
        assert!(legal_moves(&mut board, &info).expect("generation").is_empty());
        assert_eq!(is_special_board(Color::Black, &board, false, 2), Some(0));

        let (board, _) = parse_fen("4k3/8/8/8/8/8/8/3NK3 w - - 0 1").expect("fixture");
        assert_eq!(is_special_board(Color::White, &board, true, 0), Some(0));
        assert_eq!(is_special_board(Color::White, &Board::new(), true, 0), None);
    }
}
