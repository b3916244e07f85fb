// src/game/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for games
pub type GameId = String;

/// Players are identified by their user name
pub type PlayerName = String;

/// Lifecycle of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    NotStarted,
    InProgress,
    Finished,
    Deleted,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::NotStarted => write!(f, "not started"),
            GameStatus::InProgress => write!(f, "in progress"),
            GameStatus::Finished => write!(f, "finished"),
            GameStatus::Deleted => write!(f, "deleted"),
        }
    }
}

/// Lobby view of a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    pub id: GameId,
    pub status: GameStatus,
    pub players: Vec<PlayerName>,
    pub can_join: bool,
    /// Seconds since the unix epoch
    pub created_at: u64,
}

/// The parts of a session a player needs to rebuild their view of the game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub id: GameId,
    pub status: GameStatus,
    pub players: Vec<PlayerName>,
    pub tiles_left: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&GameStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        let status: GameStatus = serde_json::from_str("\"not_started\"").unwrap();
        assert_eq!(status, GameStatus::NotStarted);
    }

    #[test]
    fn test_info_wire_names() {
        let info = GameInfo {
            id: "g1".to_string(),
            status: GameStatus::Finished,
            players: vec!["alice".to_string()],
            can_join: false,
            created_at: 42,
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["canJoin"], false);
        assert_eq!(json["createdAt"], 42);
        assert_eq!(json["status"], "finished");
    }
}
