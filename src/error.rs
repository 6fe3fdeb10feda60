//! Error types for the move engine

/// Errors reported by board construction, configuration and the facade.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// `get_move` or `end_session` named an id that was never registered
    #[error("unknown session: {0}")]
    InvalidSession(String),

    /// `initialize_session` reused an id that is still live
    #[error("session already registered: {0}")]
    DuplicateSession(String),

    /// Supplied move is off the board or targets an occupied cell
    #[error("invalid move ({row}, {col}): {reason}")]
    InvalidMove { row: i32, col: i32, reason: &'static str },

    /// Board dimensions outside the supported range
    #[error("invalid board dimensions {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    /// Cell value is not one of 0 (empty), 1 or 2
    #[error("invalid cell value {0}")]
    InvalidCell(u8),

    /// Rows supplied to `Board::from_cells` have differing lengths
    #[error("ragged board: row {row} has {len} cells, expected {expected}")]
    RaggedBoard { row: usize, len: usize, expected: usize },

    /// Side to move must be a player, not `Stone::Empty`
    #[error("side to move must be Black or White")]
    InvalidSide,

    /// Rejected configuration value
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Hashing tables were not built for this board
    #[error("position hasher not initialized for a {rows}x{cols} board")]
    NotInitialized { rows: usize, cols: usize },

    /// TOML configuration failed to parse
    #[error(transparent)]
    ConfigParse(#[from] toml::de::Error),

    /// File I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
