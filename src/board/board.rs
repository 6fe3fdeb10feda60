//! Board structure: R×C grid backed by one bitboard per colour

use std::fmt;
use std::str::FromStr;

use super::bitboard::Bitboard;
use super::{Pos, Stone, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::error::{EngineError, Result};

/// Game board with fixed dimensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    /// Black stones bitboard
    pub black: Bitboard,
    /// White stones bitboard
    pub white: Bitboard,
}

impl Board {
    /// Create an empty `rows` x `cols` board.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        let range = MIN_BOARD_SIZE..=MAX_BOARD_SIZE;
        if !range.contains(&rows) || !range.contains(&cols) {
            return Err(EngineError::InvalidDimensions { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            black: Bitboard::new(rows * cols),
            white: Bitboard::new(rows * cols),
        })
    }

    /// Build a board from rows of small integers (0 empty, 1 black, 2 white).
    pub fn from_cells<R: AsRef<[u8]>>(cells: &[R]) -> Result<Self> {
        let rows = cells.len();
        let cols = cells.first().map_or(0, |r| r.as_ref().len());
        let mut board = Self::new(rows, cols)?;
        for (r, row) in cells.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(EngineError::RaggedBoard {
                    row: r,
                    len: row.len(),
                    expected: cols,
                });
            }
            for (c, &value) in row.iter().enumerate() {
                let stone = Stone::from_u8(value)?;
                board.place_stone(Pos::new(r as u8, c as u8), stone);
            }
        }
        Ok(board)
    }

    /// Rows of small integers, the inverse of `from_cells`.
    pub fn to_cells(&self) -> Vec<Vec<u8>> {
        (0..self.rows)
            .map(|r| {
                (0..self.cols)
                    .map(|c| self.get(Pos::new(r as u8, c as u8)) as u8)
                    .collect()
            })
            .collect()
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Check signed coordinates against the board bounds
    #[inline]
    pub fn contains(&self, row: i32, col: i32) -> bool {
        row >= 0 && (row as usize) < self.rows && col >= 0 && (col as usize) < self.cols
    }

    /// Signed coordinates to a position, if on the board
    #[inline]
    pub fn pos_at(&self, row: i32, col: i32) -> Option<Pos> {
        if self.contains(row, col) {
            Some(Pos::new(row as u8, col as u8))
        } else {
            None
        }
    }

    #[inline]
    pub fn index(&self, pos: Pos) -> usize {
        debug_assert!((pos.row as usize) < self.rows && (pos.col as usize) < self.cols);
        pos.row as usize * self.cols + pos.col as usize
    }

    #[inline]
    pub fn pos_from_index(&self, idx: usize) -> Pos {
        Pos::new((idx / self.cols) as u8, (idx % self.cols) as u8)
    }

    /// Center cell `(rows / 2, cols / 2)`
    #[inline]
    pub fn center(&self) -> Pos {
        Pos::new((self.rows / 2) as u8, (self.cols / 2) as u8)
    }

    /// Get stone at position
    #[inline]
    pub fn get(&self, pos: Pos) -> Stone {
        let idx = self.index(pos);
        if self.black.get(idx) {
            Stone::Black
        } else if self.white.get(idx) {
            Stone::White
        } else {
            Stone::Empty
        }
    }

    /// Stone at signed coordinates; `None` when off the board.
    #[inline]
    pub fn get_at(&self, row: i32, col: i32) -> Option<Stone> {
        self.pos_at(row, col).map(|p| self.get(p))
    }

    /// Check if position is empty
    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        let idx = self.index(pos);
        !self.black.get(idx) && !self.white.get(idx)
    }

    /// Validate a move supplied from outside the engine.
    ///
    /// The coordinate must be on the board and the cell must be empty.
    pub fn check_move(&self, row: i32, col: i32) -> Result<Pos> {
        let pos = self.pos_at(row, col).ok_or(EngineError::InvalidMove {
            row,
            col,
            reason: "out of bounds",
        })?;
        if !self.is_empty(pos) {
            return Err(EngineError::InvalidMove {
                row,
                col,
                reason: "cell is occupied",
            });
        }
        Ok(pos)
    }

    /// Place a stone. Placing `Empty` clears the cell.
    #[inline]
    pub fn place_stone(&mut self, pos: Pos, stone: Stone) {
        let idx = self.index(pos);
        match stone {
            Stone::Black => self.black.set(idx),
            Stone::White => self.white.set(idx),
            Stone::Empty => {
                self.black.clear(idx);
                self.white.clear(idx);
            }
        }
    }

    /// Remove a stone
    #[inline]
    pub fn remove_stone(&mut self, pos: Pos) {
        let idx = self.index(pos);
        self.black.clear(idx);
        self.white.clear(idx);
    }

    /// Get bitboard for a color (returns None for Empty)
    #[inline]
    pub fn stones(&self, stone: Stone) -> Option<&Bitboard> {
        match stone {
            Stone::Black => Some(&self.black),
            Stone::White => Some(&self.white),
            Stone::Empty => None,
        }
    }

    /// Positions holding `stone`, row-major
    pub fn iter_stones(&self, stone: Stone) -> impl Iterator<Item = Pos> + '_ {
        self.stones(stone)
            .into_iter()
            .flat_map(|bb| bb.iter_ones())
            .map(|idx| self.pos_from_index(idx))
    }

    /// All occupied positions, black first then white
    pub fn iter_occupied(&self) -> impl Iterator<Item = Pos> + '_ {
        self.iter_stones(Stone::Black)
            .chain(self.iter_stones(Stone::White))
    }

    /// Empty positions, row-major
    pub fn iter_empty(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.cell_count())
            .map(|idx| self.pos_from_index(idx))
            .filter(|&p| self.is_empty(p))
    }

    /// Total stones on board
    #[inline]
    pub fn stone_count(&self) -> u32 {
        self.black.count() + self.white.count()
    }

    /// Check if board is empty
    #[inline]
    pub fn is_board_empty(&self) -> bool {
        self.black.is_empty() && self.white.is_empty()
    }

    /// No empty cell left
    #[inline]
    pub fn is_full(&self) -> bool {
        self.stone_count() as usize == self.cell_count()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            for c in 0..self.cols {
                let stone = self.get(Pos::new(r as u8, c as u8));
                write!(f, "{}", stone.symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Parses rows of `.`/`X`/`O` (also `0`/`1`/`2`); blank lines and spaces are skipped.
impl FromStr for Board {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let mut cells: Vec<Vec<u8>> = Vec::new();
        for line in s.lines() {
            let row: Vec<u8> = line
                .chars()
                .filter(|ch| !ch.is_whitespace())
                .map(|ch| match ch {
                    '.' | '-' | '_' | '0' => Ok(0),
                    'X' | 'x' | 'B' | 'b' | '1' => Ok(1),
                    'O' | 'o' | 'W' | 'w' | '2' => Ok(2),
                    other => Err(EngineError::InvalidCell(u8::try_from(other).unwrap_or(u8::MAX))),
                })
                .collect::<Result<_>>()?;
            if !row.is_empty() {
                cells.push(row);
            }
        }
        Self::from_cells(&cells)
    }
}
