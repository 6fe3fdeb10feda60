//! Search module for the move engine
//!
//! Contains:
//! - Zobrist hashing for position identification
//! - Transposition table for caching search results
//! - Candidate generation and move ordering
//! - Tactical short-circuit (immediate wins and forced blocks)
//! - Alpha-Beta search with iterative deepening

pub mod alphabeta;
pub mod movegen;
pub mod tactics;
pub mod tt;
pub mod zobrist;

pub use alphabeta::{is_win_score, SearchLimits, SearchResult, SearchStats, Searcher, WIN_SCORE, WIN_THRESHOLD};
pub use movegen::{generate_candidates, move_heuristic, order_moves};
pub use tactics::{
    baseline_move, find_forced_block, find_immediate_win, find_winning_moves, first_empty, tactical_move,
    tactical_move_among, Tactic,
};
pub use tt::{EntryType, TTEntry, TTStats, TranspositionTable};
pub use zobrist::ZobristTable;
