//! Move engine integrating all search components
//!
//! This module provides the facade that callers use to get moves. Move
//! selection follows a priority system:
//!
//! 1. **Center**: an empty board is answered with the center cell
//! 2. **Immediate win**: any move that wins on the spot
//! 3. **Block**: the cell where the opponent would win next turn
//! 4. **Alpha-Beta**: full search with transposition table
//!
//! With [`Strategy::Baseline`] steps 2 and 3 are kept and the search is
//! replaced by the first empty cell.
//!
//! Two calling modes are offered. Stateless calls take a whole board and
//! hash it per call. Sessions keep the board, its hash and the Zobrist keys
//! between moves, so each turn only applies two cell changes. Either way the
//! transposition table lives for one search only.
//!
//! # Example
//!
//! ```
//! use mnk::{Board, MoveEngine, Pos, RuleConfig, Stone};
//!
//! let engine = MoveEngine::new();
//! let board = Board::new(9, 9).unwrap();
//! let rules = RuleConfig::for_board(9, 9);
//!
//! engine.initialize_session("match-1", board, Stone::White, rules).unwrap();
//! let reply = engine
//!     .get_move("match-1", Some(Pos::new(4, 4)), Stone::White)
//!     .unwrap();
//! assert!(reply.is_some());
//! engine.end_session("match-1").unwrap();
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, info};
use parking_lot::Mutex;

use crate::board::{Board, Pos, Stone};
use crate::config::{EngineConfig, RuleConfig, SearchConfig, Strategy};
use crate::error::{EngineError, Result};
use crate::search::{
    baseline_move, tactical_move, SearchLimits, SearchResult, Searcher, Tactic, ZobristTable, WIN_SCORE,
};

/// Type of search that produced the result.
///
/// This indicates which phase of the selection order found the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    /// Empty board: the center cell
    Center,
    /// Found a move that wins on the spot
    ImmediateWin,
    /// Blocked the opponent's win-in-one
    Block,
    /// Regular alpha-beta search result
    AlphaBeta,
    /// Baseline strategy fell through to the first empty cell
    Baseline,
    /// The board is full
    NoMove,
}

/// Result of a move selection with detailed statistics.
#[derive(Debug, Clone)]
pub struct MoveResult {
    /// Best move found; `None` only when the board is full
    pub best_move: Option<Pos>,
    /// Score from the mover's perspective (0 for non-search results)
    pub score: i32,
    /// Phase that produced the move
    pub search_type: SearchType,
    /// Deepest completed search iteration (0 outside alpha-beta)
    pub depth: u8,
    /// Number of nodes searched
    pub nodes: u64,
    /// Time taken in milliseconds
    pub time_ms: u64,
}

impl MoveResult {
    #[inline]
    fn quick(pos: Option<Pos>, score: i32, search_type: SearchType, start: Instant) -> Self {
        Self {
            best_move: pos,
            score,
            search_type,
            depth: 0,
            nodes: 0,
            time_ms: elapsed_ms(start),
        }
    }

    #[inline]
    fn tactic(pos: Pos, tactic: Tactic, start: Instant) -> Self {
        match tactic {
            Tactic::ImmediateWin => Self::quick(Some(pos), WIN_SCORE, SearchType::ImmediateWin, start),
            Tactic::Block => Self::quick(Some(pos), 0, SearchType::Block, start),
        }
    }

    #[inline]
    fn from_alphabeta(result: SearchResult, start: Instant) -> Self {
        Self {
            best_move: result.best_move,
            score: result.score,
            search_type: SearchType::AlphaBeta,
            depth: result.depth,
            nodes: result.nodes,
            time_ms: elapsed_ms(start),
        }
    }
}

#[inline]
fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Per-match state kept between `get_move` calls.
struct Session {
    board: Board,
    hash: u64,
    /// Side this session was opened for
    side: Stone,
    rules: RuleConfig,
    /// Keys for the running hash; the search table is built per call
    zobrist: Arc<ZobristTable>,
    /// Stones placed through this session
    ply: u32,
}

impl Session {
    /// Place a stone and keep the hash in step.
    fn apply(&mut self, pos: Pos, stone: Stone) {
        self.board.place_stone(pos, stone);
        self.hash = self.zobrist.update(self.hash, pos, stone);
        self.ply += 1;
    }
}

/// Move engine facade.
///
/// Stateless calls and sessions share one [`SearchConfig`]. Sessions are
/// kept in a concurrent map: calls on different sessions never wait on each
/// other, calls on the same session run one at a time.
pub struct MoveEngine {
    config: SearchConfig,
    sessions: DashMap<String, Arc<Mutex<Session>>>,
}

impl Default for MoveEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveEngine {
    /// Create an engine with the default search configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
            sessions: DashMap::new(),
        }
    }

    /// Create an engine with a custom search configuration.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the configuration does not validate.
    pub fn with_config(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            sessions: DashMap::new(),
        })
    }

    /// Create an engine from a loaded configuration file.
    pub fn from_engine_config(config: &EngineConfig) -> Result<Self> {
        Self::with_config(config.search)
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Caller limits, with the configured time budget as a fallback deadline.
    fn effective_limits(&self, limits: &SearchLimits, start: Instant) -> SearchLimits {
        let mut limits = limits.clone();
        if limits.deadline.is_none() && self.config.time_limit_ms > 0 {
            limits.deadline = Some(start + Duration::from_millis(self.config.time_limit_ms));
        }
        limits
    }

    /// Pick a move for `side` on `board`. The board is restored on return.
    ///
    /// A transposition table is only allocated when the move goes to the
    /// full search, and is dropped before returning.
    fn select_move(
        &self,
        zobrist: &Arc<ZobristTable>,
        rules: &RuleConfig,
        board: &mut Board,
        hash: u64,
        side: Stone,
        limits: &SearchLimits,
    ) -> MoveResult {
        let start = Instant::now();

        if board.is_full() {
            return MoveResult::quick(None, 0, SearchType::NoMove, start);
        }

        let result = match self.config.strategy {
            Strategy::Baseline => match baseline_move(board, side, rules) {
                Some((pos, Some(tactic))) => MoveResult::tactic(pos, tactic, start),
                Some((pos, None)) => MoveResult::quick(Some(pos), 0, SearchType::Baseline, start),
                None => MoveResult::quick(None, 0, SearchType::NoMove, start),
            },
            Strategy::Minimax => {
                if board.is_board_empty() {
                    MoveResult::quick(Some(board.center()), 0, SearchType::Center, start)
                } else if let Some((pos, tactic)) = tactical_move(board, side, rules, self.config.root_radius) {
                    MoveResult::tactic(pos, tactic, start)
                } else {
                    let limits = self.effective_limits(limits, start);
                    let searcher = Searcher::with_zobrist(Arc::clone(zobrist), *rules, self.config);
                    let result = searcher.search(board, hash, side, &limits);
                    MoveResult::from_alphabeta(result, start)
                }
            }
        };

        debug!(
            "{} plays {:?} via {:?} (score {}, depth {}, {} nodes, {}ms)",
            side.symbol(),
            result.best_move,
            result.search_type,
            result.score,
            result.depth,
            result.nodes,
            result.time_ms
        );
        result
    }

    // =========================================================================
    // Stateless mode
    // =========================================================================

    /// Get the best move for `side` on `board`.
    ///
    /// Returns `Ok(None)` when the board is full.
    ///
    /// # Errors
    ///
    /// `InvalidSide` if `side` is `Empty`, `InvalidConfig` if `rules` does not
    /// fit the board.
    pub fn get_best_move(&self, board: &Board, side: Stone, rules: &RuleConfig) -> Result<Option<Pos>> {
        self.get_best_move_with_limits(board, side, rules, &SearchLimits::none())
            .map(|r| r.best_move)
    }

    /// Stateless move selection with a deadline or stop flag.
    pub fn get_best_move_with_limits(
        &self,
        board: &Board,
        side: Stone,
        rules: &RuleConfig,
        limits: &SearchLimits,
    ) -> Result<MoveResult> {
        if !side.is_player() {
            return Err(EngineError::InvalidSide);
        }
        rules.validate(board)?;

        let zobrist = Arc::new(ZobristTable::for_board(board, self.config.hash_seed));
        let hash = zobrist.try_hash(board)?;
        let mut scratch = board.clone();
        Ok(self.select_move(&zobrist, rules, &mut scratch, hash, side, limits))
    }

    // =========================================================================
    // Session mode
    // =========================================================================

    /// Register a session starting from `board`, played by `side`.
    ///
    /// # Errors
    ///
    /// `DuplicateSession` if `id` is live, `InvalidSide`, or `InvalidConfig`
    /// if `rules` does not fit the board.
    pub fn initialize_session(&self, id: &str, board: Board, side: Stone, rules: RuleConfig) -> Result<()> {
        if !side.is_player() {
            return Err(EngineError::InvalidSide);
        }
        rules.validate(&board)?;

        // Nothing is allocated while the shard lock is held
        let zobrist = Arc::new(ZobristTable::for_board(&board, self.config.hash_seed));
        let hash = zobrist.try_hash(&board)?;
        let summary = format!(
            "{}x{} board, K={}, playing {}",
            board.rows(),
            board.cols(),
            rules.win_length,
            side.symbol()
        );
        let session = Arc::new(Mutex::new(Session {
            board,
            hash,
            side,
            rules,
            zobrist,
            ply: 0,
        }));

        match self.sessions.entry(id.to_string()) {
            Entry::Occupied(_) => Err(EngineError::DuplicateSession(id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(session);
                info!("session {id}: {summary}");
                Ok(())
            }
        }
    }

    fn session(&self, id: &str) -> Result<Arc<Mutex<Session>>> {
        self.sessions
            .get(id)
            .map(|s| Arc::clone(s.value()))
            .ok_or_else(|| EngineError::InvalidSession(id.to_string()))
    }

    /// Apply the opponent's move (if any), then choose, apply and return
    /// the move for `side`.
    ///
    /// Returns `Ok(None)` when the board is full.
    ///
    /// # Errors
    ///
    /// `InvalidSession` for an unknown id, `InvalidSide`, or `InvalidMove`
    /// if the opponent move is off the board or on an occupied cell. A
    /// rejected move leaves the session unchanged.
    pub fn get_move(&self, id: &str, opponent_move: Option<Pos>, side: Stone) -> Result<Option<Pos>> {
        self.get_move_with_limits(id, opponent_move, side, &SearchLimits::none())
            .map(|r| r.best_move)
    }

    /// Session move selection with a deadline or stop flag.
    pub fn get_move_with_limits(
        &self,
        id: &str,
        opponent_move: Option<Pos>,
        side: Stone,
        limits: &SearchLimits,
    ) -> Result<MoveResult> {
        if !side.is_player() {
            return Err(EngineError::InvalidSide);
        }
        let session = self.session(id)?;
        let mut session = session.lock();

        if let Some(mv) = opponent_move {
            let pos = session.board.check_move(i32::from(mv.row), i32::from(mv.col))?;
            session.apply(pos, side.opponent());
        }

        let Session {
            board,
            hash,
            rules,
            zobrist,
            ..
        } = &mut *session;
        let result = self.select_move(zobrist, rules, board, *hash, side, limits);

        if let Some(pos) = result.best_move {
            session.apply(pos, side);
        }
        debug!("session {id}: ply {} ({} to move next)", session.ply, side.opponent().symbol());
        Ok(result)
    }

    /// Drop a session.
    ///
    /// # Errors
    ///
    /// `InvalidSession` for an unknown id.
    pub fn end_session(&self, id: &str) -> Result<()> {
        match self.sessions.remove(id) {
            Some((_, session)) => {
                let session = session.lock();
                info!(
                    "session {id} ended after {} plies (engine played {})",
                    session.ply,
                    session.side.symbol()
                );
                Ok(())
            }
            None => Err(EngineError::InvalidSession(id.to_string())),
        }
    }

    /// Copy of a session's current board.
    pub fn session_board(&self, id: &str) -> Result<Board> {
        Ok(self.session(id)?.lock().board.clone())
    }

    /// Rules a session was opened with.
    pub fn session_rules(&self, id: &str) -> Result<RuleConfig> {
        Ok(self.session(id)?.lock().rules)
    }

    /// Number of live sessions
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
