use thiserror::Error;

/// Errors raised while building a game.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("board size {size} is too small, need at least 3")]
    BoardTooSmall { size: usize },
    #[error("board size {size} is too large, at most 64 is supported")]
    BoardTooLarge { size: usize },
    #[error("invalid snake layout: {0}")]
    InvalidSnake(String),
}

/// Errors raised by a best-score store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("best score store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("best score file is corrupt: {0:?}")]
    Corrupt(String),
}
