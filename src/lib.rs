//! Move engine for M×N,K connection games
//!
//! An engine that picks moves for generalized K-in-a-row games on
//! rectangular boards, from tic-tac-toe (3×3, K=3) up to Gomoku-sized
//! boards:
//! - Any board from 3×3 to 32×32
//! - K in a row to win (longer runs also win)
//! - Optional variant: an exact-K run capped at both ends does not win
//!
//! # Architecture
//!
//! The engine is organized into several modules:
//! - [`board`]: Board representation with bitboards
//! - [`rules`]: Win detection
//! - [`eval`]: Position evaluation and pattern weights
//! - [`search`]: Hashing, transposition table, move generation, tactics and
//!   alpha-beta search
//! - [`engine`]: Stateless and session entry points
//! - [`config`]: Search and rule configuration (TOML)
//!
//! # Quick Start
//!
//! ```
//! use mnk::{Board, MoveEngine, Pos, RuleConfig, Stone};
//!
//! let engine = MoveEngine::new();
//! let mut board = Board::new(15, 15).unwrap();
//! board.place_stone(Pos::new(7, 7), Stone::Black);
//!
//! // Engine replies as White
//! let rules = RuleConfig::for_board(15, 15);
//! if let Some(pos) = engine.get_best_move(&board, Stone::White, &rules).unwrap() {
//!     board.place_stone(pos, Stone::White);
//!     println!("engine plays at ({}, {})", pos.row, pos.col);
//! }
//! ```
//!
//! # Move Priority
//!
//! 1. Center of an empty board
//! 2. Immediate winning move
//! 3. Block the opponent's win-in-one
//! 4. Alpha-Beta search with transposition table

pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod eval;
pub mod rules;
pub mod search;

pub use board::{Board, Pos, Stone};
pub use config::{EngineConfig, RuleConfig, SearchConfig, Strategy};
pub use engine::{MoveEngine, MoveResult, SearchType};
pub use error::{EngineError, Result};
pub use search::SearchLimits;
