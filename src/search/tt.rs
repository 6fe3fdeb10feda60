//! Transposition Table for caching search results
//!
//! The transposition table stores search results indexed by board hash,
//! enabling reuse of previous search results for positions we've seen before.
//! It is lock-free: every method takes `&self`, so root workers share one
//! table behind a plain reference.
//!
//! # Example
//!
//! ```
//! use mnk::board::Pos;
//! use mnk::search::{EntryType, TranspositionTable};
//!
//! let tt = TranspositionTable::new(1); // 1 MB
//!
//! let hash = 0x123456789ABCDEF0;
//! tt.store(hash, 5, 100, EntryType::Exact, Some(Pos::new(9, 9)));
//!
//! assert_eq!(tt.probe(hash, 5, -1000, 1000), Some((100, Some(Pos::new(9, 9)))));
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use crate::board::Pos;

/// Entry type for score interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// Exact score - the search completed inside the window
    Exact,
    /// Lower bound - score >= stored value (beta cutoff)
    LowerBound,
    /// Upper bound - score <= stored value (alpha fail-low)
    UpperBound,
}

impl EntryType {
    /// Classify a fail-soft result against the window it was searched with.
    #[inline]
    pub fn from_window(score: i32, alpha: i32, beta: i32) -> Self {
        if score <= alpha {
            EntryType::UpperBound
        } else if score >= beta {
            EntryType::LowerBound
        } else {
            EntryType::Exact
        }
    }
}

/// Decoded transposition table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTEntry {
    /// Remaining depth the score was searched to
    pub depth: u8,
    pub score: i32,
    pub entry_type: EntryType,
    pub best_move: Option<Pos>,
}

/// Marks an occupied slot so that no packed entry is ever zero.
const VALID_BIT: u64 = 1 << 63;

/// Pack a TT entry into a u64 for atomic storage.
///
/// Layout:
/// ```text
/// bits [0..7]   depth                       8 bits
/// bits [8..39]  score (i32 as u32)         32 bits
/// bits [40..41] entry_type (0=Exact,1=LB,2=UB)
/// bit  [42]     has_move
/// bits [43..47] row (0-31)                  5 bits
/// bits [48..52] col (0-31)                  5 bits
/// bit  [63]     valid
/// ```
fn pack_entry(depth: u8, score: i32, entry_type: EntryType, best_move: Option<Pos>) -> u64 {
    let d = u64::from(depth);
    let s = u64::from(score as u32);
    let t = match entry_type {
        EntryType::Exact => 0u64,
        EntryType::LowerBound => 1u64,
        EntryType::UpperBound => 2u64,
    };
    let (has_move, row, col) = match best_move {
        Some(p) => (1u64, u64::from(p.row) & 0x1F, u64::from(p.col) & 0x1F),
        None => (0, 0, 0),
    };
    VALID_BIT | d | (s << 8) | (t << 40) | (has_move << 42) | (row << 43) | (col << 48)
}

/// Unpack a u64 back into TT entry fields.
fn unpack_entry(data: u64) -> TTEntry {
    let depth = (data & 0xFF) as u8;
    let score = ((data >> 8) & 0xFFFF_FFFF) as u32 as i32;
    let entry_type = match (data >> 40) & 0x3 {
        0 => EntryType::Exact,
        1 => EntryType::LowerBound,
        _ => EntryType::UpperBound,
    };
    let best_move = if (data >> 42) & 1 != 0 {
        let row = ((data >> 43) & 0x1F) as u8;
        let col = ((data >> 48) & 0x1F) as u8;
        Some(Pos::new(row, col))
    } else {
        None
    };
    TTEntry {
        depth,
        score,
        entry_type,
        best_move,
    }
}

/// Lock-free transposition table.
///
/// Uses XOR trick (Hyatt 1994): each slot stores `(key, data)` where
/// `key = hash ^ data`. On probe, validity is checked via `key ^ data == hash`.
/// Torn reads (partial writes from concurrent threads) fail the hash check
/// and are treated as cache misses.
pub struct TranspositionTable {
    keys: Vec<AtomicU64>,
    data: Vec<AtomicU64>,
    size: usize,
}

impl TranspositionTable {
    /// Create a new table with the given size in megabytes.
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        // Each slot = 2 x AtomicU64 = 16 bytes
        let slot_size = 16usize;
        let size = ((size_mb * 1024 * 1024) / slot_size).max(1024);

        let keys = (0..size).map(|_| AtomicU64::new(0)).collect();
        let data = (0..size).map(|_| AtomicU64::new(0)).collect();

        Self { keys, data, size }
    }

    /// Number of slots
    #[inline]
    pub fn capacity(&self) -> usize {
        self.size
    }

    /// Load and verify the slot for `hash`.
    #[inline]
    fn load(&self, hash: u64) -> Option<TTEntry> {
        let idx = (hash as usize) % self.size;
        let key = self.keys[idx].load(Ordering::Relaxed);
        let raw_data = self.data[idx].load(Ordering::Relaxed);

        // Empty slot, or torn read / other position
        if raw_data & VALID_BIT == 0 || key ^ raw_data != hash {
            return None;
        }
        Some(unpack_entry(raw_data))
    }

    /// Raw entry for `hash`, whatever its depth
    #[must_use]
    pub fn entry(&self, hash: u64) -> Option<TTEntry> {
        self.load(hash)
    }

    /// Probe the table for a position.
    ///
    /// Returns `Some((score, best_move))` only when the stored depth covers
    /// `depth` and the bound decides the window: Exact always, LowerBound
    /// when `score >= beta`, UpperBound when `score <= alpha`.
    #[must_use]
    pub fn probe(&self, hash: u64, depth: u8, alpha: i32, beta: i32) -> Option<(i32, Option<Pos>)> {
        let entry = self.load(hash)?;
        if entry.depth < depth {
            return None;
        }
        match entry.entry_type {
            EntryType::Exact => Some((entry.score, entry.best_move)),
            EntryType::LowerBound if entry.score >= beta => Some((entry.score, entry.best_move)),
            EntryType::UpperBound if entry.score <= alpha => Some((entry.score, entry.best_move)),
            _ => None,
        }
    }

    /// Get best move from the table for move ordering.
    #[must_use]
    pub fn get_best_move(&self, hash: u64) -> Option<Pos> {
        self.load(hash).and_then(|e| e.best_move)
    }

    /// Store a position in the table.
    ///
    /// Depth-preferred replacement: a different position is only evicted by
    /// an entry searched at least as deep. The same position always updates.
    pub fn store(
        &self,
        hash: u64,
        depth: u8,
        score: i32,
        entry_type: EntryType,
        best_move: Option<Pos>,
    ) {
        let idx = (hash as usize) % self.size;

        let existing_data = self.data[idx].load(Ordering::Relaxed);
        let existing_key = self.keys[idx].load(Ordering::Relaxed);
        if existing_data & VALID_BIT != 0 && existing_key ^ existing_data != hash {
            let existing = unpack_entry(existing_data);
            if depth < existing.depth {
                return;
            }
        }

        let packed = pack_entry(depth, score, entry_type, best_move);
        // Data first, then key: a concurrent reader sees either the old pair
        // or a hash mismatch.
        self.data[idx].store(packed, Ordering::Relaxed);
        self.keys[idx].store(hash ^ packed, Ordering::Relaxed);
    }

    /// Clear all entries.
    pub fn clear(&self) {
        for i in 0..self.size {
            self.keys[i].store(0, Ordering::Relaxed);
            self.data[i].store(0, Ordering::Relaxed);
        }
    }

    /// Get statistics about table usage.
    ///
    /// Approximate under concurrent access; large tables are sampled.
    #[must_use]
    pub fn stats(&self) -> TTStats {
        let step = if self.size > 65536 { 64 } else { 1 };
        let mut used = 0usize;
        let mut sampled = 0usize;
        for i in (0..self.size).step_by(step) {
            sampled += 1;
            if self.data[i].load(Ordering::Relaxed) & VALID_BIT != 0 {
                used += 1;
            }
        }
        let estimated_used = if step > 1 { used * self.size / sampled } else { used };
        TTStats {
            size: self.size,
            used: estimated_used,
            usage_percent: (estimated_used as f64 / self.size as f64 * 100.0) as u8,
        }
    }
}

/// Statistics about transposition table usage.
#[derive(Debug, Clone, Copy)]
pub struct TTStats {
    /// Total number of slots in the table
    pub size: usize,
    /// Number of slots currently occupied
    pub used: usize,
    /// Percentage of table in use (0-100)
    pub usage_percent: u8,
}
