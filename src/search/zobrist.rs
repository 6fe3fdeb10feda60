//! Zobrist hashing for position identification
//!
//! Zobrist hashing allows O(1) incremental hash updates when placing/removing stones.
//! The hash covers occupancy only; there is no side-to-move term, so the same
//! stones always hash the same regardless of who moves next.
//!
//! # Example
//!
//! ```
//! use mnk::board::{Board, Pos, Stone};
//! use mnk::search::ZobristTable;
//!
//! let zt = ZobristTable::new(15, 15, 42);
//! let mut board = Board::new(15, 15).unwrap();
//!
//! let hash1 = zt.hash(&board);
//!
//! let pos = Pos::new(7, 7);
//! board.place_stone(pos, Stone::Black);
//! let hash2 = zt.hash(&board);
//!
//! // Incremental update is equivalent to full recomputation
//! assert_eq!(zt.update(hash1, pos, Stone::Black), hash2);
//! ```

use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::board::{Board, Pos, Stone};
use crate::config::MAX_SEARCH_DEPTH;
use crate::error::{EngineError, Result};

/// Zobrist hash table for one board size.
///
/// Keys are drawn from a seeded xoshiro256++ stream, so the same
/// `(rows, cols, seed)` always yields the same table.
#[derive(Debug, Clone)]
pub struct ZobristTable {
    rows: usize,
    cols: usize,
    /// Random values for black stones at each cell index
    black: Vec<u64>,
    /// Random values for white stones at each cell index
    white: Vec<u64>,
    /// Keys mixed into TT lookups per path extension count; index 0 is zero
    extensions: Vec<u64>,
}

impl ZobristTable {
    /// Build keys for a `rows` x `cols` board from `seed`.
    #[must_use]
    pub fn new(rows: usize, cols: usize, seed: u64) -> Self {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let cells = rows * cols;

        let mut black = Vec::with_capacity(cells);
        let mut white = Vec::with_capacity(cells);
        for _ in 0..cells {
            black.push(rng.next_u64());
            white.push(rng.next_u64());
        }

        let extensions = std::iter::once(0)
            .chain((0..MAX_SEARCH_DEPTH).map(|_| rng.next_u64()))
            .collect();

        Self {
            rows,
            cols,
            black,
            white,
            extensions,
        }
    }

    /// Table sized for `board`.
    #[must_use]
    pub fn for_board(board: &Board, seed: u64) -> Self {
        Self::new(board.rows(), board.cols(), seed)
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Whether this table was built for the board's dimensions
    #[inline]
    pub fn matches(&self, board: &Board) -> bool {
        self.rows == board.rows() && self.cols == board.cols()
    }

    /// Key for one cell state. Empty cells contribute nothing.
    #[inline]
    fn key(&self, pos: Pos, stone: Stone) -> u64 {
        let idx = pos.row as usize * self.cols + pos.col as usize;
        match stone {
            Stone::Black => self.black[idx],
            Stone::White => self.white[idx],
            Stone::Empty => 0,
        }
    }

    /// Compute the full hash for a board position.
    ///
    /// This iterates over all stones on the board. For incremental updates
    /// during search, use `update` instead. Panics in debug builds if the
    /// board has other dimensions; see `try_hash`.
    #[must_use]
    pub fn hash(&self, board: &Board) -> u64 {
        debug_assert!(self.matches(board));
        let mut h = 0u64;
        for idx in board.black.iter_ones() {
            h ^= self.black[idx];
        }
        for idx in board.white.iter_ones() {
            h ^= self.white[idx];
        }
        h
    }

    /// Full hash, rejecting boards this table was not built for.
    pub fn try_hash(&self, board: &Board) -> Result<u64> {
        if !self.matches(board) {
            return Err(EngineError::NotInitialized {
                rows: board.rows(),
                cols: board.cols(),
            });
        }
        Ok(self.hash(board))
    }

    /// Incrementally update hash after placing or removing `stone` at `pos`.
    ///
    /// XOR is its own inverse, so the same call undoes itself.
    #[inline]
    #[must_use]
    pub fn update(&self, hash: u64, pos: Pos, stone: Stone) -> u64 {
        hash ^ self.key(pos, stone)
    }

    /// Update hash for a cell changing from `old` to `new`.
    #[inline]
    #[must_use]
    pub fn toggle(&self, hash: u64, pos: Pos, old: Stone, new: Stone) -> u64 {
        hash ^ self.key(pos, old) ^ self.key(pos, new)
    }

    /// Key to XOR into a TT lookup for a path with `count` extensions.
    #[inline]
    pub fn extension_key(&self, count: u8) -> u64 {
        self.extensions
            .get(count as usize)
            .copied()
            .unwrap_or_else(|| self.extensions[self.extensions.len() - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: u64 = 0x1234_5678_9ABC_DEF0;

    #[test]
    fn test_zobrist_empty_board() {
        let zt = ZobristTable::new(15, 15, SEED);
        let board = Board::new(15, 15).unwrap();
        assert_eq!(zt.hash(&board), 0);
    }

    #[test]
    fn test_zobrist_deterministic() {
        let zt1 = ZobristTable::new(9, 11, SEED);
        let zt2 = ZobristTable::new(9, 11, SEED);
        assert_eq!(zt1.black, zt2.black);
        assert_eq!(zt1.white, zt2.white);

        let other = ZobristTable::new(9, 11, SEED + 1);
        assert_ne!(zt1.black, other.black);
    }

    #[test]
    fn test_zobrist_incremental() {
        let zt = ZobristTable::new(15, 15, SEED);
        let mut board = Board::new(15, 15).unwrap();
        let pos = Pos::new(9, 9);

        let hash1 = zt.hash(&board);
        board.place_stone(pos, Stone::Black);
        let hash2 = zt.hash(&board);

        assert_eq!(zt.update(hash1, pos, Stone::Black), hash2);
        assert_eq!(zt.toggle(hash1, pos, Stone::Empty, Stone::Black), hash2);
    }

    #[test]
    fn test_zobrist_colour_matters() {
        let zt = ZobristTable::new(15, 15, SEED);
        let pos = Pos::new(3, 4);
        assert_ne!(zt.update(0, pos, Stone::Black), zt.update(0, pos, Stone::White));
        assert_eq!(
            zt.toggle(zt.update(0, pos, Stone::Black), pos, Stone::Black, Stone::White),
            zt.update(0, pos, Stone::White)
        );
    }

    #[test]
    fn test_zobrist_same_position_different_path() {
        let zt = ZobristTable::new(15, 15, SEED);
        let mut board1 = Board::new(15, 15).unwrap();
        let mut board2 = Board::new(15, 15).unwrap();

        // Path 1: Black at (9,9), then White at (10,10)
        board1.place_stone(Pos::new(9, 9), Stone::Black);
        board1.place_stone(Pos::new(10, 10), Stone::White);

        // Path 2: White at (10,10), then Black at (9,9)
        board2.place_stone(Pos::new(10, 10), Stone::White);
        board2.place_stone(Pos::new(9, 9), Stone::Black);

        assert_eq!(zt.hash(&board1), zt.hash(&board2));
    }

    #[test]
    fn test_zobrist_undo() {
        let zt = ZobristTable::new(15, 15, SEED);
        let mut board = Board::new(15, 15).unwrap();
        board.place_stone(Pos::new(1, 1), Stone::White);
        let before = zt.hash(&board);

        let pos = Pos::new(9, 9);
        let placed = zt.update(before, pos, Stone::Black);
        assert_ne!(placed, before);
        assert_eq!(zt.update(placed, pos, Stone::Black), before);
    }

    #[test]
    fn test_zobrist_all_corners_rectangular() {
        let zt = ZobristTable::new(6, 20, SEED);
        let mut board = Board::new(6, 20).unwrap();
        let corners = [Pos::new(0, 0), Pos::new(0, 19), Pos::new(5, 0), Pos::new(5, 19)];

        let mut expected = 0;
        for &pos in &corners {
            board.place_stone(pos, Stone::Black);
            expected ^= zt.black[board.index(pos)];
        }
        assert_eq!(zt.hash(&board), expected);
    }

    #[test]
    fn test_try_hash_rejects_other_dimensions() {
        let zt = ZobristTable::new(15, 15, SEED);
        let board = Board::new(9, 9).unwrap();
        assert!(matches!(
            zt.try_hash(&board),
            Err(EngineError::NotInitialized { rows: 9, cols: 9 })
        ));
        assert!(ZobristTable::for_board(&board, SEED).try_hash(&board).is_ok());
    }

    #[test]
    fn test_extension_keys() {
        let zt = ZobristTable::new(15, 15, SEED);
        assert_eq!(zt.extension_key(0), 0);
        assert_ne!(zt.extension_key(1), 0);
        assert_ne!(zt.extension_key(1), zt.extension_key(2));
        // Counts beyond the table reuse the last key
        assert_eq!(zt.extension_key(200), zt.extension_key(MAX_SEARCH_DEPTH));
    }
}
