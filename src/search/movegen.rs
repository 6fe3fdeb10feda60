//! Candidate move generation and cheap move ordering
//!
//! Candidates are the empty cells within a Chebyshev radius of any stone,
//! emitted in row-major order. Ordering uses a neighbour-count heuristic that
//! is only ever used to sort, never to score positions.

use std::cmp::Reverse;

use crate::board::{Bitboard, Board, Pos, Stone, DIRECTIONS};

/// Per friendly neighbour at distance 1
const PROXIMITY_WEIGHT: i32 = 200;
/// Centrality numerator: a move at the center gets the full bonus
const CENTER_BONUS: i32 = 100;

/// Empty cells within `radius` of any stone, row-major, deduplicated.
///
/// On an empty board the only candidate is the center; on a full board
/// there are none.
pub fn generate_candidates(board: &Board, radius: u8) -> Vec<Pos> {
    if board.is_board_empty() {
        let center = board.center();
        return vec![center];
    }

    let radius = i32::from(radius);
    let mut seen = Bitboard::new(board.cell_count());

    for pos in board.iter_occupied() {
        for dr in -radius..=radius {
            for dc in -radius..=radius {
                let Some(p) = board.pos_at(i32::from(pos.row) + dr, i32::from(pos.col) + dc) else {
                    continue;
                };
                if board.is_empty(p) {
                    seen.set(board.index(p));
                }
            }
        }
    }

    seen.iter_ones().map(|idx| board.pos_from_index(idx)).collect()
}

/// Cheap ordering score for `color` playing at `pos`.
///
/// Counts `color` stones adjacent along the four axes (both ways), plus a
/// bonus that shrinks with Manhattan distance from the center.
pub fn move_heuristic(board: &Board, pos: Pos, color: Stone) -> i32 {
    let (r, c) = (i32::from(pos.row), i32::from(pos.col));

    let mut proximity = 0;
    for (dr, dc) in DIRECTIONS {
        for sign in [-1, 1] {
            if board.get_at(r + dr * sign, c + dc * sign) == Some(color) {
                proximity += PROXIMITY_WEIGHT;
            }
        }
    }

    let center = board.center();
    let dist = (r - i32::from(center.row)).abs() + (c - i32::from(center.col)).abs();
    proximity + CENTER_BONUS / (dist + 1)
}

/// Order `moves` for the side to move.
///
/// Scores are taken from the root side's perspective: the mover's own
/// heuristic when it is the root side (sorted descending), its negation
/// otherwise (sorted ascending). Either way the mover's strongest move comes
/// first. The sort is stable, so ties keep row-major order. A transposition
/// table move, if present among `moves`, is tried first.
pub fn order_moves(board: &Board, moves: &mut [Pos], mover: Stone, root: Stone, tt_move: Option<Pos>) {
    let maximizing = mover == root;
    let mut keyed: Vec<(i32, Pos)> = moves
        .iter()
        .map(|&p| {
            let h = move_heuristic(board, p, mover);
            (if maximizing { h } else { -h }, p)
        })
        .collect();

    if maximizing {
        keyed.sort_by_key(|&(score, _)| Reverse(score));
    } else {
        keyed.sort_by_key(|&(score, _)| score);
    }

    for (slot, (_, p)) in moves.iter_mut().zip(keyed) {
        *slot = p;
    }

    if let Some(tt) = tt_move {
        if let Some(idx) = moves.iter().position(|&p| p == tt) {
            moves[..=idx].rotate_right(1);
        }
    }
}
