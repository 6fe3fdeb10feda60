//! Tactical short-circuit: immediate wins and forced blocks
//!
//! Checked before any full search. The side to move's own win always takes
//! precedence over blocking the opponent.

use crate::board::{Board, Pos, Stone};
use crate::config::RuleConfig;
use crate::rules::has_won;

use super::movegen::generate_candidates;

/// Why a move was chosen without searching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tactic {
    /// Playing the move wins on the spot
    ImmediateWin,
    /// The opponent would win on this cell next turn
    Block,
}

/// Every cell in `candidates` where `color` would complete a win.
///
/// The board is not modified: `has_won` treats the probed cell as `color`.
pub fn find_winning_moves(board: &Board, candidates: &[Pos], color: Stone, rules: &RuleConfig) -> Vec<Pos> {
    candidates
        .iter()
        .copied()
        .filter(|&p| board.is_empty(p) && has_won(board, p, color, rules))
        .collect()
}

/// First candidate (in the given order) that wins for `color`.
pub fn find_immediate_win(board: &Board, candidates: &[Pos], color: Stone, rules: &RuleConfig) -> Option<Pos> {
    candidates
        .iter()
        .copied()
        .find(|&p| board.is_empty(p) && has_won(board, p, color, rules))
}

/// First candidate where the opponent of `color` would win.
#[inline]
pub fn find_forced_block(board: &Board, candidates: &[Pos], color: Stone, rules: &RuleConfig) -> Option<Pos> {
    find_immediate_win(board, candidates, color.opponent(), rules)
}

/// Own win first, then a forced block, over `candidates`.
pub fn tactical_move_among(
    board: &Board,
    candidates: &[Pos],
    color: Stone,
    rules: &RuleConfig,
) -> Option<(Pos, Tactic)> {
    if let Some(win) = find_immediate_win(board, candidates, color, rules) {
        return Some((win, Tactic::ImmediateWin));
    }
    find_forced_block(board, candidates, color, rules).map(|block| (block, Tactic::Block))
}

/// Own win first, then a forced block, over the radius-`radius` candidates.
///
/// Any winning cell is adjacent to a stone, so every radius of at least 1
/// finds all of them.
pub fn tactical_move(board: &Board, color: Stone, rules: &RuleConfig, radius: u8) -> Option<(Pos, Tactic)> {
    if board.is_board_empty() {
        return None;
    }
    let candidates = generate_candidates(board, radius.max(1));
    tactical_move_among(board, &candidates, color, rules)
}

/// First empty cell in row-major order
pub fn first_empty(board: &Board) -> Option<Pos> {
    board.iter_empty().next()
}

/// Baseline strategy: win, else block, else the first empty cell.
///
/// Scans every empty cell, so it needs no candidate radius.
pub fn baseline_move(board: &Board, color: Stone, rules: &RuleConfig) -> Option<(Pos, Option<Tactic>)> {
    let empties: Vec<Pos> = board.iter_empty().collect();
    if let Some((pos, tactic)) = tactical_move_among(board, &empties, color, rules) {
        return Some((pos, Some(tactic)));
    }
    empties.first().map(|&p| (p, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k5() -> RuleConfig {
        RuleConfig::new(5, false)
    }

    #[test]
    fn test_immediate_win_found() {
        let mut board = Board::new(15, 15).unwrap();
        for c in 0..4 {
            board.place_stone(Pos::new(0, c), Stone::Black);
        }
        board.place_stone(Pos::new(5, 5), Stone::White);

        let result = tactical_move(&board, Stone::Black, &k5(), 2);
        assert_eq!(result, Some((Pos::new(0, 4), Tactic::ImmediateWin)));
    }

    #[test]
    fn test_block_found() {
        let mut board = Board::new(15, 15).unwrap();
        for r in 3..7 {
            board.place_stone(Pos::new(r, 10), Stone::White);
        }
        board.place_stone(Pos::new(2, 10), Stone::Black);
        board.place_stone(Pos::new(9, 2), Stone::Black);

        let result = tactical_move(&board, Stone::Black, &k5(), 2);
        assert_eq!(result, Some((Pos::new(7, 10), Tactic::Block)));
    }

    #[test]
    fn test_win_beats_block() {
        let mut board = Board::new(15, 15).unwrap();
        for c in 0..4 {
            board.place_stone(Pos::new(0, c), Stone::White);
            board.place_stone(Pos::new(10, c + 5), Stone::Black);
        }
        let result = tactical_move(&board, Stone::Black, &k5(), 1);
        assert_eq!(result.map(|(_, t)| t), Some(Tactic::ImmediateWin));
        let (pos, _) = result.unwrap();
        assert!(has_won(&board, pos, Stone::Black, &k5()));
    }

    #[test]
    fn test_find_winning_moves_both_ends() {
        let mut board = Board::new(15, 15).unwrap();
        for c in 5..9 {
            board.place_stone(Pos::new(7, c), Stone::Black);
        }
        let candidates = generate_candidates(&board, 1);
        let wins = find_winning_moves(&board, &candidates, Stone::Black, &k5());
        assert_eq!(wins, vec![Pos::new(7, 4), Pos::new(7, 9)]);
        assert!(find_winning_moves(&board, &candidates, Stone::White, &k5()).is_empty());
    }

    #[test]
    fn test_gap_fill_wins() {
        // XX.XX: the gap completes five
        let board: Board = "XX.XX..\n.......\n.......\n.......\n.......".parse().unwrap();
        let candidates = generate_candidates(&board, 1);
        assert_eq!(
            find_immediate_win(&board, &candidates, Stone::Black, &k5()),
            Some(Pos::new(0, 2))
        );
    }

    #[test]
    fn test_no_tactics_on_quiet_board() {
        let mut board = Board::new(15, 15).unwrap();
        board.place_stone(Pos::new(7, 7), Stone::Black);
        board.place_stone(Pos::new(7, 8), Stone::White);
        assert_eq!(tactical_move(&board, Stone::Black, &k5(), 2), None);
        assert_eq!(tactical_move(&Board::new(9, 9).unwrap(), Stone::Black, &k5(), 2), None);
    }

    #[test]
    fn test_baseline_move() {
        let k3 = RuleConfig::new(3, false);

        // Win available
        let board: Board = "XX.\nOO.\n...".parse().unwrap();
        assert_eq!(
            baseline_move(&board, Stone::Black, &k3),
            Some((Pos::new(0, 2), Some(Tactic::ImmediateWin)))
        );

        // Block needed
        let board: Board = "X..\nOO.\nX..".parse().unwrap();
        assert_eq!(
            baseline_move(&board, Stone::Black, &k3),
            Some((Pos::new(1, 2), Some(Tactic::Block)))
        );

        // Nothing tactical: first empty cell
        let board: Board = "X..\n.O.\n...".parse().unwrap();
        assert_eq!(baseline_move(&board, Stone::Black, &k3), Some((Pos::new(0, 1), None)));

        // Full board
        let board: Board = "XOX\nXOO\nOXX".parse().unwrap();
        assert_eq!(baseline_move(&board, Stone::Black, &k3), None);
        assert_eq!(first_empty(&board), None);
    }

    #[test]
    fn test_capped_five_is_no_threat_under_variant() {
        // O X X X X . O: filling (0, 5) makes an exact five capped on both sides
        let board: Board = "OXXXX.O\n.......\n.......".parse().unwrap();
        let candidates = generate_candidates(&board, 1);
        assert_eq!(
            find_immediate_win(&board, &candidates, Stone::Black, &k5()),
            Some(Pos::new(0, 5))
        );
        assert_eq!(
            find_immediate_win(&board, &candidates, Stone::Black, &RuleConfig::new(5, true)),
            None
        );
    }
}
