//! Alpha-Beta search with iterative deepening and transposition table
//!
//! Plain minimax with alpha-beta pruning, scored from the root side's
//! perspective: the root side maximizes, its opponent minimizes. Cutoffs are
//! fail-soft.
//!
//! # Features
//!
//! - Iterative deepening, keeping the best move of the last finished depth
//! - Transposition table shared by all root workers
//! - Win / forced-block short-circuit at every interior node
//! - Threat extensions for moves that create a four
//! - Parallel root: each root move searched on its own board clone
//!
//! # Example
//!
//! ```
//! use mnk::board::{Board, Stone};
//! use mnk::config::{RuleConfig, SearchConfig};
//! use mnk::search::{SearchLimits, Searcher};
//!
//! let mut board = Board::new(9, 9).unwrap();
//! let searcher = Searcher::for_board(&board, RuleConfig::for_board(9, 9), SearchConfig::default());
//! let hash = searcher.zobrist().hash(&board);
//!
//! let result = searcher.search(&mut board, hash, Stone::Black, &SearchLimits::none());
//! assert_eq!(result.best_move, Some(board.center()));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, warn};
use parking_lot::Mutex;
use rayon::prelude::*;

use crate::board::{Board, Pos, Stone};
use crate::config::{RuleConfig, SearchConfig};
use crate::eval::{evaluate, threat_at};
use crate::rules::has_won;

use super::movegen::{generate_candidates, order_moves};
use super::tactics::{find_immediate_win, find_winning_moves};
use super::{EntryType, TTStats, TranspositionTable, ZobristTable};

/// Score of a win on the move; wins further away score `WIN_SCORE - ply`.
pub const WIN_SCORE: i32 = 100_000_000;

/// Anything at least this large in magnitude is a forced win or loss
pub const WIN_THRESHOLD: i32 = WIN_SCORE - 1_000;

/// Infinity score for alpha-beta bounds
const INF: i32 = WIN_SCORE + 1;

/// Whether `score` is a proven win or loss
#[inline]
pub fn is_win_score(score: i32) -> bool {
    score.abs() >= WIN_THRESHOLD
}

/// Deadline and cancellation for one search.
///
/// Both are polled every 1024 nodes; on expiry the search returns the best
/// move found so far.
#[derive(Debug, Clone, Default)]
pub struct SearchLimits {
    pub deadline: Option<Instant>,
    pub stop: Option<Arc<AtomicBool>>,
}

impl SearchLimits {
    /// No deadline and no stop flag
    pub fn none() -> Self {
        Self::default()
    }

    /// Deadline `ms` milliseconds from now
    pub fn with_time_limit(ms: u64) -> Self {
        Self::default().deadline(Instant::now() + Duration::from_millis(ms))
    }

    #[must_use]
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    fn expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
            || self.stop.as_ref().is_some_and(|s| s.load(Ordering::Relaxed))
    }
}

/// Search statistics for diagnostics and tuning.
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// Total cutoffs (alpha >= beta)
    pub beta_cutoffs: u64,
    /// Cutoffs on the first move tried (measures move ordering quality)
    pub first_move_cutoffs: u64,
    /// Total TT probes
    pub tt_probes: u64,
    /// TT probes that returned a usable score (exact/bound hit)
    pub tt_score_hits: u64,
    /// TT probes that provided a best move for ordering
    pub tt_move_hits: u64,
    /// Threat extensions granted
    pub extensions: u64,
    /// Nodes whose moves were restricted to blocking cells
    pub forced_blocks: u64,
}

impl SearchStats {
    /// First-move cutoff rate in percent
    pub fn first_move_rate(&self) -> f64 {
        if self.beta_cutoffs == 0 {
            0.0
        } else {
            self.first_move_cutoffs as f64 / self.beta_cutoffs as f64 * 100.0
        }
    }

    /// TT score hit rate in percent
    pub fn tt_score_rate(&self) -> f64 {
        if self.tt_probes == 0 {
            0.0
        } else {
            self.tt_score_hits as f64 / self.tt_probes as f64 * 100.0
        }
    }

    /// Merge another worker's stats into this one
    fn merge(&mut self, other: &SearchStats) {
        self.beta_cutoffs += other.beta_cutoffs;
        self.first_move_cutoffs += other.first_move_cutoffs;
        self.tt_probes += other.tt_probes;
        self.tt_score_hits += other.tt_score_hits;
        self.tt_move_hits += other.tt_move_hits;
        self.extensions += other.extensions;
        self.forced_blocks += other.forced_blocks;
    }
}

/// Search result containing the best move found and associated statistics.
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    /// Best move found; `None` only when the board has no empty cell
    pub best_move: Option<Pos>,
    /// Score of the best move from the searching side's perspective
    pub score: i32,
    /// Last depth completed by iterative deepening (0 if none)
    pub depth: u8,
    /// Total nodes searched across all workers
    pub nodes: u64,
    /// False when the deadline or stop flag cut the search short
    pub completed: bool,
    pub stats: SearchStats,
}

// =============================================================================
// SearchContext: read-only state shared by all workers of one search
// =============================================================================

struct SearchContext<'a> {
    zobrist: &'a ZobristTable,
    tt: &'a TranspositionTable,
    config: &'a SearchConfig,
    rules: &'a RuleConfig,
    limits: &'a SearchLimits,
    /// Side the search maximizes for
    root: Stone,
    /// Set once any worker sees the limits expire
    stopped: AtomicBool,
}

impl SearchContext<'_> {
    #[inline]
    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    /// Poll the limits and latch the stop signal if they expired.
    fn check_limits(&self) -> bool {
        if self.is_stopped() {
            return true;
        }
        if self.limits.expired() {
            self.stopped.store(true, Ordering::Relaxed);
            return true;
        }
        false
    }
}

/// Best root move so far. Ties go to the earlier ordering index.
#[derive(Debug, Clone, Copy)]
struct RootBest {
    score: i32,
    index: usize,
    mov: Pos,
}

impl RootBest {
    fn beats(&self, other: Option<RootBest>) -> bool {
        match other {
            None => true,
            Some(o) => self.score > o.score || (self.score == o.score && self.index < o.index),
        }
    }
}

/// One depth iteration over the root moves.
struct RootOutcome {
    best: Option<RootBest>,
    completed: bool,
}

/// Shared reduction for the parallel root
#[derive(Default)]
struct RootReduction {
    best: Option<RootBest>,
    finished: usize,
    nodes: u64,
    stats: SearchStats,
}

// =============================================================================
// Worker: per-thread search state
// =============================================================================

struct Worker<'a> {
    ctx: &'a SearchContext<'a>,
    nodes: u64,
    stats: SearchStats,
    /// This worker returned early because of the stop signal
    aborted: bool,
}

impl<'a> Worker<'a> {
    fn new(ctx: &'a SearchContext<'a>) -> Self {
        Self {
            ctx,
            nodes: 0,
            stats: SearchStats::default(),
            aborted: false,
        }
    }

    /// Win for `winner` reached `ply` moves below the root.
    #[inline]
    fn win_for(&self, winner: Stone, ply: u8) -> i32 {
        let score = WIN_SCORE - i32::from(ply);
        if winner == self.ctx.root {
            score
        } else {
            -score
        }
    }

    /// Extra ply for a move that creates a threat at least as strong as the
    /// configured threshold, while the path has extensions left.
    fn extension(&mut self, board: &Board, mov: Pos, mover: Stone, ext: u8) -> u8 {
        let config = self.ctx.config;
        if ext >= config.max_extensions {
            return 0;
        }
        let threat = threat_at(board, mov, mover, self.ctx.rules, &config.weights);
        if threat >= config.extension_threshold {
            self.stats.extensions += 1;
            1
        } else {
            0
        }
    }

    /// Play `mov` for `mover`, search the reply position, undo.
    #[allow(clippy::too_many_arguments)]
    fn search_child(
        &mut self,
        board: &mut Board,
        hash: u64,
        mover: Stone,
        mov: Pos,
        depth: u8,
        ply: u8,
        ext: u8,
        alpha: i32,
        beta: i32,
    ) -> i32 {
        board.place_stone(mov, mover);
        let child_hash = self.ctx.zobrist.update(hash, mov, mover);
        let extension = self.extension(board, mov, mover, ext);

        let score = self.alpha_beta(
            board,
            child_hash,
            mover.opponent(),
            depth - 1 + extension,
            ply + 1,
            ext + extension,
            alpha,
            beta,
            mov,
        );

        board.remove_stone(mov);
        score
    }

    /// Minimax with alpha-beta. `to_move` is about to play; `last_move` was
    /// just played by its opponent.
    #[allow(clippy::too_many_arguments)]
    fn alpha_beta(
        &mut self,
        board: &mut Board,
        hash: u64,
        to_move: Stone,
        depth: u8,
        ply: u8,
        ext: u8,
        mut alpha: i32,
        mut beta: i32,
        last_move: Pos,
    ) -> i32 {
        self.nodes += 1;

        // Limits check every 1024 nodes
        if ((self.nodes & 1023) == 0 && self.ctx.check_limits()) || self.ctx.is_stopped() {
            self.aborted = true;
            return 0;
        }

        let ctx = self.ctx;
        let last_player = to_move.opponent();
        if has_won(board, last_move, last_player, ctx.rules) {
            return self.win_for(last_player, ply);
        }

        if depth == 0 {
            return evaluate(board, ctx.root, ctx.rules, &ctx.config.weights);
        }

        // The key carries the extension count, so it pins the remaining depth
        let key = hash ^ ctx.zobrist.extension_key(ext);
        self.stats.tt_probes += 1;
        if let Some((score, _)) = ctx.tt.probe(key, depth, alpha, beta) {
            self.stats.tt_score_hits += 1;
            return score;
        }

        let mut moves = generate_candidates(board, ctx.config.inner_radius);
        if moves.is_empty() {
            // Board full: draw
            return 0;
        }

        if find_immediate_win(board, &moves, to_move, ctx.rules).is_some() {
            return self.win_for(to_move, ply + 1);
        }
        let threats = find_winning_moves(board, &moves, last_player, ctx.rules);
        if !threats.is_empty() {
            self.stats.forced_blocks += 1;
            moves = threats;
        }

        let tt_move = ctx.tt.get_best_move(key);
        if tt_move.is_some() {
            self.stats.tt_move_hits += 1;
        }
        order_moves(board, &mut moves, to_move, ctx.root, tt_move);

        let maximizing = to_move == ctx.root;
        let (alpha0, beta0) = (alpha, beta);
        let mut best_score = if maximizing { -INF } else { INF };
        let mut best_move = None;

        for (i, &mov) in moves.iter().enumerate() {
            let score = self.search_child(board, hash, to_move, mov, depth, ply, ext, alpha, beta);

            if self.ctx.is_stopped() {
                self.aborted = true;
                return 0;
            }

            if maximizing {
                if score > best_score {
                    best_score = score;
                    best_move = Some(mov);
                }
                alpha = alpha.max(score);
            } else {
                if score < best_score {
                    best_score = score;
                    best_move = Some(mov);
                }
                beta = beta.min(score);
            }

            if alpha >= beta {
                self.stats.beta_cutoffs += 1;
                if i == 0 {
                    self.stats.first_move_cutoffs += 1;
                }
                break;
            }
        }

        let entry_type = EntryType::from_window(best_score, alpha0, beta0);
        ctx.tt.store(key, depth, best_score, entry_type, best_move);

        best_score
    }

    /// Root iteration on one thread. Alpha tightens as moves are searched;
    /// a later move has to beat the best strictly to replace it.
    fn search_root(&mut self, board: &mut Board, hash: u64, moves: &[Pos], depth: u8) -> RootOutcome {
        let root = self.ctx.root;
        let mut best: Option<RootBest> = None;
        let mut alpha = -INF;

        for (index, &mov) in moves.iter().enumerate() {
            let score = self.search_child(board, hash, root, mov, depth, 0, 0, alpha, INF);
            if self.aborted {
                return RootOutcome {
                    best,
                    completed: false,
                };
            }
            let candidate = RootBest { score, index, mov };
            if candidate.beats(best) {
                best = Some(candidate);
            }
            alpha = alpha.max(score);
        }

        RootOutcome {
            best,
            completed: true,
        }
    }
}

/// Root iteration across a thread pool. Every root move gets a full window
/// so its score is exact; the reduction is the only locked step.
fn search_root_parallel(
    ctx: &SearchContext<'_>,
    pool: &rayon::ThreadPool,
    board: &Board,
    hash: u64,
    moves: &[Pos],
    depth: u8,
) -> (RootOutcome, u64, SearchStats) {
    let reduction = Mutex::new(RootReduction::default());

    pool.install(|| {
        moves.par_iter().enumerate().for_each(|(index, &mov)| {
            // Fresh workers start at zero nodes, so poll here as well
            if ctx.check_limits() {
                return;
            }
            let mut local = board.clone();
            let mut worker = Worker::new(ctx);
            let score = worker.search_child(&mut local, hash, ctx.root, mov, depth, 0, 0, -INF, INF);

            let mut red = reduction.lock();
            red.nodes += worker.nodes;
            red.stats.merge(&worker.stats);
            if worker.aborted {
                return;
            }
            red.finished += 1;
            let candidate = RootBest { score, index, mov };
            if candidate.beats(red.best) {
                red.best = Some(candidate);
            }
        });
    });

    let red = reduction.into_inner();
    let outcome = RootOutcome {
        best: red.best,
        completed: red.finished == moves.len(),
    };
    (outcome, red.nodes, red.stats)
}

/// Alpha-Beta search engine for one board size and rule set.
///
/// Owns a transposition table and shares its Zobrist keys. The table is
/// cleared at the start of every `search`, so results never depend on
/// earlier calls.
pub struct Searcher {
    config: SearchConfig,
    rules: RuleConfig,
    zobrist: Arc<ZobristTable>,
    tt: TranspositionTable,
}

impl Searcher {
    /// Create a searcher for `rows` x `cols` boards.
    #[must_use]
    pub fn new(rows: usize, cols: usize, rules: RuleConfig, config: SearchConfig) -> Self {
        let zobrist = Arc::new(ZobristTable::new(rows, cols, config.hash_seed));
        Self::with_zobrist(zobrist, rules, config)
    }

    /// Create a searcher over existing keys, with a fresh table.
    ///
    /// Lets a caller that keeps a running hash between searches hold only
    /// the keys and build the table per search.
    #[must_use]
    pub fn with_zobrist(zobrist: Arc<ZobristTable>, rules: RuleConfig, config: SearchConfig) -> Self {
        Self {
            zobrist,
            tt: TranspositionTable::new(config.tt_size_mb),
            config,
            rules,
        }
    }

    /// Create a searcher sized for `board`.
    #[must_use]
    pub fn for_board(board: &Board, rules: RuleConfig, config: SearchConfig) -> Self {
        Self::new(board.rows(), board.cols(), rules, config)
    }

    #[inline]
    pub fn zobrist(&self) -> &ZobristTable {
        &self.zobrist
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[inline]
    pub fn rules(&self) -> &RuleConfig {
        &self.rules
    }

    /// Threads for a root with `candidates` moves: bounded by the moves,
    /// the cores and the configured cap.
    fn worker_count(&self, candidates: usize) -> usize {
        if !self.config.parallel {
            return 1;
        }
        let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
        let cap = if self.config.max_threads == 0 {
            cores
        } else {
            self.config.max_threads.min(cores)
        };
        candidates.min(cap).max(1)
    }

    /// Search for the best move for `color`.
    ///
    /// `hash` must be the Zobrist hash of `board`. The board is mutated
    /// during the search and restored before returning.
    pub fn search(&self, board: &mut Board, hash: u64, color: Stone, limits: &SearchLimits) -> SearchResult {
        self.tt.clear();

        let mut result = SearchResult::default();
        let mut root_moves = generate_candidates(board, self.config.root_radius);
        if root_moves.is_empty() || !color.is_player() {
            result.completed = true;
            return result;
        }

        let ctx = SearchContext {
            zobrist: &self.zobrist,
            tt: &self.tt,
            config: &self.config,
            rules: &self.rules,
            limits,
            root: color,
            stopped: AtomicBool::new(false),
        };

        let target = self.config.effective_depth(board.stone_count(), root_moves.len());
        let threads = self.worker_count(root_moves.len());
        let pool = if threads > 1 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| warn!("falling back to a sequential root: {e}"))
                .ok()
        } else {
            None
        };
        debug!(
            "search {}: {} root moves, target depth {}, {} thread(s)",
            color.symbol(),
            root_moves.len(),
            target,
            threads
        );

        let root_key = hash ^ self.zobrist.extension_key(0);
        order_moves(board, &mut root_moves, color, color, None);

        for depth in 1..=target {
            if ctx.check_limits() {
                break;
            }

            let tt_move = self.tt.get_best_move(root_key);
            order_moves(board, &mut root_moves, color, color, tt_move);

            let outcome = match &pool {
                Some(pool) => {
                    let (outcome, nodes, stats) =
                        search_root_parallel(&ctx, pool, board, hash, &root_moves, depth);
                    result.nodes += nodes;
                    result.stats.merge(&stats);
                    outcome
                }
                None => {
                    let mut worker = Worker::new(&ctx);
                    let outcome = worker.search_root(board, hash, &root_moves, depth);
                    result.nodes += worker.nodes;
                    result.stats.merge(&worker.stats);
                    outcome
                }
            };

            if !outcome.completed {
                // Keep the last finished depth; with none, take what this one found
                if result.best_move.is_none() {
                    if let Some(best) = outcome.best {
                        result.best_move = Some(best.mov);
                        result.score = best.score;
                    }
                }
                break;
            }

            let Some(best) = outcome.best else { break };
            result.best_move = Some(best.mov);
            result.score = best.score;
            result.depth = depth;
            self.tt.store(root_key, depth, best.score, EntryType::Exact, Some(best.mov));
            debug!(
                "depth {depth}: best {} score {} nodes {}",
                best.mov, best.score, result.nodes
            );

            if is_win_score(best.score) {
                break;
            }
        }

        result.completed = !ctx.is_stopped();
        if !result.completed {
            warn!(
                "search stopped after depth {} of {}; {} nodes",
                result.depth, target, result.nodes
            );
        }
        if result.best_move.is_none() {
            result.best_move = root_moves.first().copied();
        }
        result
    }

    /// Get statistics about the transposition table.
    #[must_use]
    pub fn tt_stats(&self) -> TTStats {
        self.tt.stats()
    }

    /// Clear the transposition table.
    pub fn clear_tt(&self) {
        self.tt.clear();
    }
}
