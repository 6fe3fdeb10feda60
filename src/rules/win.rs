//! Win condition checking for M×N,K games
//!
//! A player wins with K or more of their stones in a contiguous line.
//! With `block_double_open_ends` set, a run of exactly K whose two
//! end-neighbours are both unavailable (opponent stone or off the board)
//! does not count. Runs longer than K always win.

use crate::board::{Board, Pos, Stone, DIRECTIONS};
use crate::config::RuleConfig;

/// Contiguous run of one colour through a cell along one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRun {
    /// Stones in the run, the origin cell included
    pub count: usize,
    /// First cell of the run (smallest step along the direction)
    pub start: Pos,
    /// Last cell of the run
    pub end: Pos,
    /// Cell before `start` is on the board and empty
    pub open_start: bool,
    /// Cell after `end` is on the board and empty
    pub open_end: bool,
}

impl LineRun {
    #[inline]
    pub fn open_ends(&self) -> u8 {
        self.open_start as u8 + self.open_end as u8
    }
}

/// Measure the run of `color` through `pos` along `(dr, dc)`.
///
/// `pos` is counted as `color` whatever the board holds there, so callers can
/// measure a move before placing it.
pub fn line_run(board: &Board, pos: Pos, color: Stone, (dr, dc): (i32, i32)) -> LineRun {
    let (r0, c0) = (i32::from(pos.row), i32::from(pos.col));

    let mut back = 0;
    while board.get_at(r0 - dr * (back + 1), c0 - dc * (back + 1)) == Some(color) {
        back += 1;
    }
    let mut fwd = 0;
    while board.get_at(r0 + dr * (fwd + 1), c0 + dc * (fwd + 1)) == Some(color) {
        fwd += 1;
    }

    let (sr, sc) = (r0 - dr * back, c0 - dc * back);
    let (er, ec) = (r0 + dr * fwd, c0 + dc * fwd);
    LineRun {
        count: (back + fwd + 1) as usize,
        start: Pos::new(sr as u8, sc as u8),
        end: Pos::new(er as u8, ec as u8),
        open_start: board.get_at(sr - dr, sc - dc) == Some(Stone::Empty),
        open_end: board.get_at(er + dr, ec + dc) == Some(Stone::Empty),
    }
}

/// Whether a run satisfies the win condition under `rules`.
#[inline]
pub fn is_winning_run(run: &LineRun, rules: &RuleConfig) -> bool {
    if run.count > rules.win_length {
        return true;
    }
    if run.count < rules.win_length {
        return false;
    }
    !rules.block_double_open_ends || run.open_ends() > 0
}

/// Check whether `color` has won through the stone at `pos`.
///
/// Only the four lines through `pos` are scanned, so this is the check to run
/// right after a move. The cell at `pos` is treated as `color`.
#[inline]
pub fn has_won(board: &Board, pos: Pos, color: Stone, rules: &RuleConfig) -> bool {
    if !color.is_player() {
        return false;
    }
    DIRECTIONS
        .iter()
        .any(|&dir| is_winning_run(&line_run(board, pos, color, dir), rules))
}

/// Find a winning line anywhere on the board for `color`.
///
/// Returns the cells of the first winning run in row-major scan order.
pub fn find_winning_line(board: &Board, color: Stone, rules: &RuleConfig) -> Option<Vec<Pos>> {
    for pos in board.iter_stones(color) {
        for &(dr, dc) in &DIRECTIONS {
            let run = line_run(board, pos, color, (dr, dc));
            // Each run is reported from its first cell only
            if run.start != pos || !is_winning_run(&run, rules) {
                continue;
            }
            let cells = (0..run.count as i32)
                .filter_map(|i| board.pos_at(i32::from(pos.row) + dr * i, i32::from(pos.col) + dc * i))
                .collect();
            return Some(cells);
        }
    }
    None
}

/// Check for a winner. Black is checked first.
pub fn check_winner(board: &Board, rules: &RuleConfig) -> Option<Stone> {
    [Stone::Black, Stone::White]
        .into_iter()
        .find(|&stone| find_winning_line(board, stone, rules).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k5() -> RuleConfig {
        RuleConfig::new(5, false)
    }

    fn k5_blocked() -> RuleConfig {
        RuleConfig::new(5, true)
    }

    #[test]
    fn test_five_in_row_horizontal() {
        let mut board = Board::new(15, 15).unwrap();
        for i in 0..5 {
            board.place_stone(Pos::new(9, i), Stone::Black);
        }
        assert!(has_won(&board, Pos::new(9, 2), Stone::Black, &k5()));
        assert!(!has_won(&board, Pos::new(9, 2), Stone::White, &k5()));
        assert_eq!(check_winner(&board, &k5()), Some(Stone::Black));
    }

    #[test]
    fn test_five_in_row_vertical() {
        let mut board = Board::new(15, 15).unwrap();
        for i in 0..5 {
            board.place_stone(Pos::new(i, 9), Stone::Black);
        }
        assert!(has_won(&board, Pos::new(4, 9), Stone::Black, &k5()));
    }

    #[test]
    fn test_diagonals() {
        let mut board = Board::new(15, 15).unwrap();
        for i in 0..5 {
            board.place_stone(Pos::new(i, i), Stone::White);
        }
        assert!(has_won(&board, Pos::new(0, 0), Stone::White, &k5()));

        let mut board = Board::new(15, 15).unwrap();
        // Anti-diagonal from (4, 8) to (8, 4)
        for i in 0..5 {
            board.place_stone(Pos::new(4 + i, 8 - i), Stone::White);
        }
        assert!(has_won(&board, Pos::new(6, 6), Stone::White, &k5()));
        assert_eq!(check_winner(&board, &k5()), Some(Stone::White));
    }

    #[test]
    fn test_four_in_row_not_win() {
        let mut board = Board::new(15, 15).unwrap();
        for i in 0..4 {
            board.place_stone(Pos::new(9, i), Stone::Black);
        }
        assert!(!has_won(&board, Pos::new(9, 3), Stone::Black, &k5()));
        assert_eq!(check_winner(&board, &k5()), None);
    }

    #[test]
    fn test_has_won_before_placing() {
        let mut board = Board::new(15, 15).unwrap();
        for i in 0..4 {
            board.place_stone(Pos::new(3, i), Stone::Black);
        }
        // (3, 4) still empty: treated as Black for the check
        assert!(has_won(&board, Pos::new(3, 4), Stone::Black, &k5()));
    }

    #[test]
    fn test_win_symmetric_over_run() {
        let mut board = Board::new(10, 12).unwrap();
        let cells: Vec<Pos> = (0..5).map(|i| Pos::new(2 + i, 9 - i)).collect();
        for &p in &cells {
            board.place_stone(p, Stone::Black);
        }
        for &p in &cells {
            assert!(has_won(&board, p, Stone::Black, &k5()), "from {p}");
        }
    }

    #[test]
    fn test_line_run_ends() {
        let board: Board = "\
            .XXXO\n\
            .....\n\
            ....."
            .parse()
            .unwrap();
        let run = line_run(&board, Pos::new(0, 2), Stone::Black, (0, 1));
        assert_eq!(run.count, 3);
        assert_eq!(run.start, Pos::new(0, 1));
        assert_eq!(run.end, Pos::new(0, 3));
        assert!(run.open_start);
        assert!(!run.open_end);
        assert_eq!(run.open_ends(), 1);
    }

    #[test]
    fn test_tictactoe_edge_runs() {
        let board: Board = "XXX\n.O.\nO..".parse().unwrap();
        let k3 = RuleConfig::new(3, false);
        assert!(has_won(&board, Pos::new(0, 1), Stone::Black, &k3));
        // The same run touches both edges: capped under the variant
        assert!(!has_won(&board, Pos::new(0, 1), Stone::Black, &RuleConfig::new(3, true)));
    }

    #[test]
    fn test_block_double_open_ends() {
        // O X X X X X O: exactly five, capped by opponent on both sides
        let mut board = Board::new(15, 15).unwrap();
        board.place_stone(Pos::new(7, 2), Stone::White);
        for c in 3..8 {
            board.place_stone(Pos::new(7, c), Stone::Black);
        }
        board.place_stone(Pos::new(7, 8), Stone::White);
        assert!(has_won(&board, Pos::new(7, 5), Stone::Black, &k5()));
        assert!(!has_won(&board, Pos::new(7, 5), Stone::Black, &k5_blocked()));
        assert_eq!(check_winner(&board, &k5_blocked()), None);

        // One end open is enough
        board.remove_stone(Pos::new(7, 8));
        assert!(has_won(&board, Pos::new(7, 5), Stone::Black, &k5_blocked()));
    }

    #[test]
    fn test_block_double_open_ends_board_edge() {
        // Five against the left edge with an opponent stone on the right
        let mut board = Board::new(15, 15).unwrap();
        for c in 0..5 {
            board.place_stone(Pos::new(0, c), Stone::Black);
        }
        board.place_stone(Pos::new(0, 5), Stone::White);
        assert!(!has_won(&board, Pos::new(0, 0), Stone::Black, &k5_blocked()));
    }

    #[test]
    fn test_overline_always_wins() {
        let mut board = Board::new(15, 15).unwrap();
        board.place_stone(Pos::new(7, 1), Stone::White);
        for c in 2..8 {
            board.place_stone(Pos::new(7, c), Stone::Black);
        }
        board.place_stone(Pos::new(7, 8), Stone::White);
        assert!(has_won(&board, Pos::new(7, 4), Stone::Black, &k5_blocked()));
    }

    #[test]
    fn test_find_winning_line_cells() {
        let mut board = Board::new(8, 8).unwrap();
        for r in 2..7 {
            board.place_stone(Pos::new(r, 5), Stone::White);
        }
        let line = find_winning_line(&board, Stone::White, &k5()).unwrap();
        assert_eq!(line.len(), 5);
        assert_eq!(line[0], Pos::new(2, 5));
        assert_eq!(line[4], Pos::new(6, 5));
        assert!(find_winning_line(&board, Stone::Empty, &k5()).is_none());
    }

    #[test]
    fn test_empty_board_no_winner() {
        let board = Board::new(15, 15).unwrap();
        assert_eq!(check_winner(&board, &k5()), None);
        assert!(!has_won(&board, Pos::new(7, 7), Stone::Empty, &k5()));
    }
}
