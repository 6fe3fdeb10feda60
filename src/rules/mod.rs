//! Game rules for M×N,K connection games
//!
//! The only rule that matters to the engine is the win condition:
//! K in a row, optionally ignoring exact-K runs capped at both ends.

pub mod win;

// Re-exports for convenient access
pub use win::{check_winner, find_winning_line, has_won, is_winning_run, line_run, LineRun};
