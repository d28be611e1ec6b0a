use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Too many mines")]
    TooManyMines,
}

pub type Result<T> = core::result::Result<T, GameError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Could not access score file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed score data: {0}")]
    Json(#[from] serde_json::Error),
}
