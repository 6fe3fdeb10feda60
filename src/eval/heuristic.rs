//! Heuristic evaluation function for M×N,K board positions
//!
//! This module provides the static evaluation used at search leaves.
//! It evaluates board positions based on:
//! - Pattern scoring (runs measured against K and their open ends)
//! - Double-threat combinations
//! - Positional bonuses (center control)

use crate::board::{Board, Pos, Stone, DIRECTIONS};
use crate::config::RuleConfig;
use crate::rules::win::{is_winning_run, line_run, LineRun};

use super::patterns::EvalWeights;

/// Evaluations are clamped to this magnitude so that no static score can
/// reach the search's win scores.
pub const EVAL_LIMIT: i32 = 50_000_000;

/// Evaluate the board from the perspective of the given color.
///
/// Returns a score where:
/// - Positive values indicate advantage for `color`
/// - Negative values indicate disadvantage for `color`
///
/// The evaluation is symmetric: `evaluate(b, Black) == -evaluate(b, White)`.
#[must_use]
pub fn evaluate(board: &Board, color: Stone, rules: &RuleConfig, weights: &EvalWeights) -> i32 {
    if !color.is_player() {
        return 0;
    }
    let opponent = color.opponent();

    let pattern_score =
        evaluate_patterns(board, color, rules, weights) - evaluate_patterns(board, opponent, rules, weights);
    let position_score =
        evaluate_positions(board, color, weights) - evaluate_positions(board, opponent, weights);

    pattern_score.saturating_add(position_score).clamp(-EVAL_LIMIT, EVAL_LIMIT)
}

/// Score of one run, honouring the double-block rule for exact-K runs.
#[inline]
fn run_score(run: &LineRun, rules: &RuleConfig, weights: &EvalWeights) -> i32 {
    if run.count >= rules.win_length {
        return if is_winning_run(run, rules) { weights.win } else { 0 };
    }
    weights.line_score(run.count, run.open_ends(), rules.win_length)
}

/// Evaluate pattern-based score for a color.
///
/// Each run is scored once, from its first cell (no same-color stone in the
/// negative direction).
///
/// Also detects threat combinations the opponent cannot answer with one move:
/// - two or more open threes
/// - a four (open or closed) together with an open three
/// - two closed fours
pub fn evaluate_patterns(board: &Board, color: Stone, rules: &RuleConfig, weights: &EvalWeights) -> i32 {
    let mut score: i32 = 0;
    let mut open_fours = 0i32;
    let mut closed_fours = 0i32;
    let mut open_threes = 0i32;

    for pos in board.iter_stones(color) {
        for &(dr, dc) in &DIRECTIONS {
            // Skip cells that are not the start of their run
            if board.get_at(i32::from(pos.row) - dr, i32::from(pos.col) - dc) == Some(color) {
                continue;
            }
            let run = line_run(board, pos, color, (dr, dc));
            let pattern_score = run_score(&run, rules, weights);
            score = score.saturating_add(pattern_score);

            if run.count + 1 == rules.win_length {
                match run.open_ends() {
                    2 => open_fours += 1,
                    1 => closed_fours += 1,
                    _ => {}
                }
            } else if run.count + 2 == rules.win_length && run.open_ends() == 2 {
                open_threes += 1;
            }
        }
    }

    let fours = open_fours + closed_fours;
    if open_threes >= 2 || (fours >= 1 && open_threes >= 1) || closed_fours >= 2 {
        score = score.saturating_add(weights.open_four);
    }

    score
}

/// Evaluate positional bonuses for a color.
///
/// Stones closer to the center are worth more as they have more
/// potential for creating patterns in multiple directions.
fn evaluate_positions(board: &Board, color: Stone, weights: &EvalWeights) -> i32 {
    let center = board.center();
    let (cr, cc) = (i32::from(center.row), i32::from(center.col));
    // Manhattan distance from the center to the farthest corner
    let max_dist = cr.max(board.rows() as i32 - 1 - cr) + cc.max(board.cols() as i32 - 1 - cc);

    board
        .iter_stones(color)
        .map(|pos| {
            let dist = (i32::from(pos.row) - cr).abs() + (i32::from(pos.col) - cc).abs();
            (max_dist - dist) * weights.center
        })
        .sum()
}

/// Strongest single run `color` would own through `pos`.
///
/// `pos` is treated as `color`, so this works before or after placing.
/// Used to decide threat extensions.
pub fn threat_at(board: &Board, pos: Pos, color: Stone, rules: &RuleConfig, weights: &EvalWeights) -> i32 {
    DIRECTIONS
        .iter()
        .map(|&dir| run_score(&line_run(board, pos, color, dir), rules, weights))
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::PatternScore;

    fn k5() -> RuleConfig {
        RuleConfig::new(5, false)
    }

    fn eval(board: &Board, color: Stone) -> i32 {
        evaluate(board, color, &k5(), &EvalWeights::default())
    }

    #[test]
    fn test_evaluate_empty_board() {
        let board = Board::new(15, 15).unwrap();
        assert_eq!(eval(&board, Stone::Black), 0, "Empty board should have score 0");
    }

    #[test]
    fn test_evaluate_center_bonus() {
        let mut board = Board::new(15, 15).unwrap();
        board.place_stone(Pos::new(7, 7), Stone::Black);
        assert!(eval(&board, Stone::Black) > 0);
    }

    #[test]
    fn test_evaluate_corner_less_valuable() {
        let mut board_center = Board::new(15, 15).unwrap();
        board_center.place_stone(Pos::new(7, 7), Stone::Black);

        let mut board_corner = Board::new(15, 15).unwrap();
        board_corner.place_stone(Pos::new(0, 0), Stone::Black);

        let center_score = eval(&board_center, Stone::Black);
        let corner_score = eval(&board_corner, Stone::Black);
        assert!(
            center_score > corner_score,
            "Center ({center_score}) should be more valuable than corner ({corner_score})"
        );
    }

    #[test]
    fn test_evaluate_winning_and_losing() {
        let mut board = Board::new(15, 15).unwrap();
        for i in 0..5 {
            board.place_stone(Pos::new(9, i), Stone::Black);
        }
        assert!(eval(&board, Stone::Black) >= PatternScore::FIVE);
        assert!(eval(&board, Stone::White) <= -PatternScore::FIVE);
    }

    #[test]
    fn test_evaluate_symmetric() {
        let board: Board = "\
            .......\n\
            ..XX...\n\
            ..OX...\n\
            ...O...\n\
            ....O..\n\
            .......\n\
            ......."
            .parse()
            .unwrap();
        assert_eq!(eval(&board, Stone::Black), -eval(&board, Stone::White));
    }

    #[test]
    fn test_open_beats_closed() {
        let mut open = Board::new(15, 15).unwrap();
        let mut closed = Board::new(15, 15).unwrap();
        for c in 5..8 {
            open.place_stone(Pos::new(7, c), Stone::Black);
            closed.place_stone(Pos::new(7, c), Stone::Black);
        }
        open.place_stone(Pos::new(0, 0), Stone::White);
        closed.place_stone(Pos::new(7, 4), Stone::White);

        let weights = EvalWeights::default();
        let open_score = evaluate_patterns(&open, Stone::Black, &k5(), &weights);
        let closed_score = evaluate_patterns(&closed, Stone::Black, &k5(), &weights);
        assert!(open_score > closed_score);
    }

    #[test]
    fn test_run_counted_once() {
        let mut board = Board::new(15, 15).unwrap();
        for c in 5..8 {
            board.place_stone(Pos::new(7, c), Stone::Black);
        }
        let weights = EvalWeights::default();
        let score = evaluate_patterns(&board, Stone::Black, &k5(), &weights);
        // One open three horizontally, plus the three stones as open singles
        // along the other three directions
        assert_eq!(score, weights.open_three + 9 * weights.single);
    }

    #[test]
    fn test_double_open_three_bonus() {
        let mut board = Board::new(15, 15).unwrap();
        // Horizontal and vertical open threes sharing (7, 7)
        for c in 5..8 {
            board.place_stone(Pos::new(7, c), Stone::Black);
        }
        for r in 5..7 {
            board.place_stone(Pos::new(r, 7), Stone::Black);
        }
        let weights = EvalWeights::default();
        let score = evaluate_patterns(&board, Stone::Black, &k5(), &weights);
        assert!(score >= 2 * weights.open_three + weights.open_four);
    }

    #[test]
    fn test_capped_exact_k_is_dead_under_variant() {
        let board: Board = "OXXXXXO\n.......\n.......".parse().unwrap();
        let weights = EvalWeights::default();
        let plain = evaluate_patterns(&board, Stone::Black, &k5(), &weights);
        let blocked = evaluate_patterns(&board, Stone::Black, &RuleConfig::new(5, true), &weights);
        assert!(plain >= weights.win);
        assert!(blocked < weights.open_four);
    }

    #[test]
    fn test_threat_at() {
        let mut board = Board::new(15, 15).unwrap();
        for c in 3..6 {
            board.place_stone(Pos::new(7, c), Stone::White);
        }
        board.place_stone(Pos::new(7, 2), Stone::Black);
        let weights = EvalWeights::default();
        // (7, 6) would make a four closed on the left
        assert_eq!(threat_at(&board, Pos::new(7, 6), Stone::White, &k5(), &weights), weights.closed_four);
        assert!(threat_at(&board, Pos::new(0, 0), Stone::White, &k5(), &weights) < weights.closed_four);
    }

    #[test]
    fn test_evaluate_clamped() {
        let weights = EvalWeights {
            win: EVAL_LIMIT,
            ..EvalWeights::default()
        };
        let mut board = Board::new(15, 15).unwrap();
        for r in [1, 3, 5] {
            for c in 0..5 {
                board.place_stone(Pos::new(r, c), Stone::Black);
            }
        }
        assert_eq!(evaluate(&board, Stone::Black, &k5(), &weights), EVAL_LIMIT);
    }
}
