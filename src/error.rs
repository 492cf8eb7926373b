//! Error types shared by the game logic and the record store.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PuzzleError {
    #[error("invalid board size {0:?}: expected a number from 4 to 12")]
    InvalidBoardSize(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("record file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
