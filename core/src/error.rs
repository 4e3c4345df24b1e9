use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board dimensions must be at least 1x1")]
    InvalidDimensions,
    #[error("Too many mines for the available cells")]
    TooManyMines,
    #[error("Coordinates are outside the board")]
    OutOfBounds,
}

pub type Result<T> = core::result::Result<T, GameError>;
