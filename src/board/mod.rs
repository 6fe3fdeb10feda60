//! Board representation for M×N,K games

pub mod bitboard;
pub mod board;


// Re-exports
pub use bitboard::Bitboard;
pub use board::Board;

use crate::error::{EngineError, Result};

/// Smallest supported side length
pub const MIN_BOARD_SIZE: usize = 3;
/// Largest supported side length (coordinates pack into 5 bits in the TT)
pub const MAX_BOARD_SIZE: usize = 32;

/// Cell ownership. Black is the first player (A), White the second (B).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Stone {
    Empty = 0,
    Black = 1,
    White = 2,
}

impl Stone {
    /// Get opponent color
    #[inline]
    pub fn opponent(self) -> Stone {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
            Stone::Empty => Stone::Empty,
        }
    }

    /// Decode the small-integer cell encoding {0, 1, 2}.
    pub fn from_u8(value: u8) -> Result<Stone> {
        match value {
            0 => Ok(Stone::Empty),
            1 => Ok(Stone::Black),
            2 => Ok(Stone::White),
            other => Err(EngineError::InvalidCell(other)),
        }
    }

    #[inline]
    pub fn is_player(self) -> bool {
        self != Stone::Empty
    }

    /// Character used by `Display for Board` and the CLI
    pub fn symbol(self) -> char {
        match self {
            Stone::Empty => '.',
            Stone::Black => 'X',
            Stone::White => 'O',
        }
    }
}

/// Position on the board. Row-major ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub row: u8,
    pub col: u8,
}

impl Pos {
    /// Signed rendering of "no move" used at the process boundary
    pub const NO_MOVE_COORDS: (i32, i32) = (-1, -1);

    #[inline]
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// `(row, col)` as signed coordinates, or `(-1, -1)` for no move.
    pub fn coords(mov: Option<Pos>) -> (i32, i32) {
        match mov {
            Some(p) => (i32::from(p.row), i32::from(p.col)),
            None => Self::NO_MOVE_COORDS,
        }
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Line directions: horizontal, vertical, diagonal ↘, diagonal ↙
pub const DIRECTIONS: [(i32, i32); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];
