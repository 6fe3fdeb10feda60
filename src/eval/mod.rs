//! Evaluation module for M×N,K positions
//!
//! This module provides pattern recognition and scoring for board positions.
//! The evaluation considers:
//! - Line patterns measured against the win length K
//! - Double-threat combinations
//! - Positional bonuses (center control)

pub mod heuristic;
pub mod patterns;

pub use heuristic::{evaluate, evaluate_patterns, threat_at, EVAL_LIMIT};
pub use patterns::{EvalWeights, PatternScore};
