use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board width and height must be between 1 and 100")]
    InvalidDimensions,
    #[error("Mine count must be at least 1 and at most the number of cells")]
    InvalidBombCount,
    #[error("Coordinate out of bounds")]
    OutOfBounds,
    #[error("Coordinate already revealed")]
    AlreadyRevealed,
    #[error("Game already ended, no new moves are accepted")]
    GameAlreadyEnded,
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Mine layout values are inconsistent")]
    InvalidLayout,
    #[error("End time and outcome must be set together")]
    InconsistentOutcome,
    #[error("Board does not match the mine layout")]
    InconsistentBoard,
}

pub type Result<T> = core::result::Result<T, GameError>;
