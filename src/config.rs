//! Engine configuration
//!
//! Everything here deserializes from TOML with `#[serde(default)]`, so a
//! config file only needs the keys it changes:
//!
//! ```toml
//! [search]
//! max_depth = 4
//! parallel = false
//!
//! [search.weights]
//! open_three = 12000
//!
//! [rules]
//! win_length = 5
//! block_double_open_ends = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::{EngineError, Result};
use crate::eval::{EvalWeights, PatternScore};

/// Deepest search the engine will run
pub const MAX_SEARCH_DEPTH: u8 = 16;

/// Win condition for one game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Marks in a row needed to win (K)
    pub win_length: usize,
    /// A run of exactly K capped at both ends does not win
    pub block_double_open_ends: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            win_length: 5,
            block_double_open_ends: false,
        }
    }
}

impl RuleConfig {
    pub fn new(win_length: usize, block_double_open_ends: bool) -> Self {
        Self {
            win_length,
            block_double_open_ends,
        }
    }

    /// Five in a row on boards at least 5 wide, otherwise the shorter side.
    pub fn for_board(rows: usize, cols: usize) -> Self {
        let shorter = rows.min(cols);
        Self::new(if shorter >= 5 { 5 } else { shorter }, false)
    }

    /// K must be at least 2 and fit along the longer side of the board.
    pub fn validate(&self, board: &Board) -> Result<()> {
        let longest = board.rows().max(board.cols());
        if self.win_length < 2 || self.win_length > longest {
            return Err(EngineError::InvalidConfig(format!(
                "win length {} does not fit a {}x{} board",
                self.win_length,
                board.rows(),
                board.cols()
            )));
        }
        Ok(())
    }
}

/// Move selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Tactical short-circuit, then alpha-beta search
    #[default]
    Minimax,
    /// Win, else block, else the first empty cell
    Baseline,
}

/// Search tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub strategy: Strategy,

    // Depth schedule
    pub max_depth: u8,       // Default: 5
    pub opening_depth: u8,   // Default: 2
    /// Use `opening_depth` while fewer stones than this are on the board
    pub opening_stones: u32, // Default: 4
    /// Use `wide_depth` when the root has at least this many candidates
    pub wide_candidates: usize, // Default: 40
    pub wide_depth: u8,      // Default: 3

    // Candidate neighbourhoods (Chebyshev radius)
    pub root_radius: u8,  // Default: 2
    pub inner_radius: u8, // Default: 1

    // Threat extension
    /// Extend when the move just played makes a run scoring at least this
    pub extension_threshold: i32, // Default: closed four
    pub max_extensions: u8,       // Default: 2

    // Parallel root
    pub parallel: bool,     // Default: true
    /// Worker cap; 0 means one per core
    pub max_threads: usize, // Default: 0

    pub tt_size_mb: usize, // Default: 16
    pub hash_seed: u64,
    /// Per-move budget when the caller gives no deadline; 0 disables
    pub time_limit_ms: u64, // Default: 0

    pub weights: EvalWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Minimax,
            max_depth: 5,
            opening_depth: 2,
            opening_stones: 4,
            wide_candidates: 40,
            wide_depth: 3,
            root_radius: 2,
            inner_radius: 1,
            extension_threshold: PatternScore::CLOSED_FOUR,
            max_extensions: 2,
            parallel: true,
            max_threads: 0,
            tt_size_mb: 16,
            hash_seed: 0x1234_5678_9ABC_DEF0,
            time_limit_ms: 0,
            weights: EvalWeights::default(),
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        let depth_range = 1..=MAX_SEARCH_DEPTH;
        for (name, depth) in [
            ("max_depth", self.max_depth),
            ("opening_depth", self.opening_depth),
            ("wide_depth", self.wide_depth),
        ] {
            if !depth_range.contains(&depth) {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} must be between 1 and {MAX_SEARCH_DEPTH}, got {depth}"
                )));
            }
        }
        // Ply counters are u8 and extensions add to the nominal depth
        if self.max_extensions > MAX_SEARCH_DEPTH {
            return Err(EngineError::InvalidConfig(format!(
                "max_extensions must be at most {MAX_SEARCH_DEPTH}, got {}",
                self.max_extensions
            )));
        }
        if self.root_radius == 0 || self.inner_radius == 0 {
            return Err(EngineError::InvalidConfig(
                "candidate radius must be at least 1".to_string(),
            ));
        }
        if self.tt_size_mb == 0 {
            return Err(EngineError::InvalidConfig(
                "tt_size_mb must be at least 1".to_string(),
            ));
        }
        self.weights.validate()
    }

    /// Depth for this root: shallow in the opening and on wide positions,
    /// never above `max_depth`.
    pub fn effective_depth(&self, stone_count: u32, root_candidates: usize) -> u8 {
        let depth = if stone_count < self.opening_stones {
            self.opening_depth
        } else if root_candidates >= self.wide_candidates {
            self.wide_depth
        } else {
            self.max_depth
        };
        depth.min(self.max_depth)
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub search: SearchConfig,
    /// Rules used when the caller does not pass its own
    pub rules: RuleConfig,
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.search.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
