use thiserror::Error;

use crate::game::GameId;
use crate::tile::Tile;

/// Errors from placing, adding or removing tiles on a single board
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("board must have at least {min} rows and {min} columns, got {num_rows}x{num_cols}")]
    TooSmall {
        num_rows: usize,
        num_cols: usize,
        min: usize,
    },

    #[error("player already has tile {tile}")]
    DuplicateTile { tile: Tile },

    #[error("player does not have tile {tile}")]
    MissingTile { tile: Tile },

    #[error("invalid tile positions")]
    InvalidMove,
}

/// Validation failures for a session config
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max players must be positive")]
    NoMaxPlayers,

    #[error("number of starting tiles must be positive")]
    NoStartingTiles,

    #[error("idle period must be positive")]
    NoIdlePeriod,

    #[error("idle period of {minutes} minutes is too long")]
    IdlePeriodTooLong { minutes: u64 },

    #[error("tile letters must not be empty")]
    NoTileLetters,

    #[error("invalid tile letter {letter:?}, only A-Z allowed")]
    InvalidTileLetter { letter: char },

    #[error("need at least {needed} tile letters, got {available}")]
    NotEnoughTileLetters { available: usize, needed: usize },

    #[error("missing unused tile shuffle function")]
    MissingTileShuffle,

    #[error("missing player shuffle function")]
    MissingPlayerShuffle,
}

/// Failure reported by the user points collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("could not update user points: {details}")]
pub struct PointsError {
    pub details: String,
}

impl PointsError {
    pub fn new(details: impl Into<String>) -> Self {
        Self {
            details: details.into(),
        }
    }
}

/// Errors raised while a session handles a message.
///
/// Warnings are expected player mistakes and go back to that player only.
/// Faults are unexpected; the session logs them before replying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("{0}")]
    Warning(String),

    #[error("{0}")]
    Fault(String),
}

impl GameError {
    pub fn warning(text: impl Into<String>) -> Self {
        Self::Warning(text.into())
    }

    pub fn fault(text: impl Into<String>) -> Self {
        Self::Fault(text.into())
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warning(_))
    }
}

impl From<BoardError> for GameError {
    fn from(err: BoardError) -> Self {
        GameError::Warning(err.to_string())
    }
}

impl From<ConfigError> for GameError {
    fn from(err: ConfigError) -> Self {
        GameError::Fault(err.to_string())
    }
}

impl From<PointsError> for GameError {
    fn from(err: PointsError) -> Self {
        GameError::Fault(err.to_string())
    }
}

/// Errors from the registry of running games
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManagerError {
    #[error("Game not found: {game_id}")]
    GameNotFound { game_id: GameId },

    #[error("Game is no longer accepting messages: {game_id}")]
    GameClosed { game_id: GameId },

    #[error("Invalid game config: {0}")]
    Config(#[from] ConfigError),
}

/// Errors on a player's socket
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Failed to read message: {details}")]
    DeserializationFailed { details: String },

    #[error("Failed to write message: {details}")]
    SerializationFailed { details: String },

    #[error(transparent)]
    Manager(#[from] ManagerError),
}

pub type BoardResult<T> = Result<T, BoardError>;
pub type GameResult<T> = Result<T, GameError>;
pub type ManagerResult<T> = Result<T, ManagerError>;
pub type NetworkResult<T> = Result<T, NetworkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_errors_become_warnings() {
        let err: GameError = BoardError::InvalidMove.into();
        assert_eq!(err, GameError::warning("invalid tile positions"));
        assert!(err.is_warning());
    }

    #[test]
    fn test_points_errors_become_faults() {
        let err: GameError = PointsError::new("db down").into();
        assert!(!err.is_warning());
        assert_eq!(err.to_string(), "could not update user points: db down");
    }

    #[test]
    fn test_too_small_message() {
        let err = BoardError::TooSmall {
            num_rows: 5,
            num_cols: 12,
            min: 10,
        };
        assert_eq!(
            err.to_string(),
            "board must have at least 10 rows and 10 columns, got 5x12"
        );
    }
}
