use sweeper_core::{GameError, GameId};
use sweeper_protocol::ErrorResponse;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("Game {0} not found")]
    NotFound(GameId),
    #[error("Randomness source unavailable")]
    Entropy,
    #[error("Storage failure: {0}")]
    Storage(String),
}

impl ServiceError {
    /// HTTP-style status for the boundary: caller mistakes are 4xx, our own are 500.
    pub fn status(&self) -> u16 {
        use GameError::*;
        match self {
            Self::Game(
                InvalidDimensions | InvalidBombCount | OutOfBounds | AlreadyRevealed
                | GameAlreadyEnded,
            ) => 400,
            Self::Game(
                InvalidBoardShape | InvalidLayout | InconsistentOutcome | InconsistentBoard,
            ) => 500,
            Self::NotFound(_) => 404,
            Self::Entropy | Self::Storage(_) => 500,
        }
    }

    /// Message safe to show to the requester.
    pub fn public_message(&self) -> String {
        match self.status() {
            404 => "Game not found".to_string(),
            500 => "Could not process request".to_string(),
            _ => self.to_string(),
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            status: self.status(),
            error: self.public_message(),
        }
    }
}

pub type Result<T> = core::result::Result<T, ServiceError>;
