use thiserror::Error;

use crate::Coord2;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("Coordinates {0:?} are outside the board")]
    OutOfBounds(Coord2),
    #[error("Cannot {0}")]
    InvalidStateTransition(&'static str),
    #[error("No empty cell available to move the mine to")]
    NoAvailableTarget,
    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: &'static str },
    #[error("No difficulty matches the loaded board")]
    NoMatchingDifficulty,
    #[error("Cell at {0:?} is in a state that cannot be saved")]
    UnrepresentableState(Coord2),
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Failures of reading or writing a board file.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Game(#[from] GameError),
}
