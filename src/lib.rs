// Bananas Server Library - Core Module Organization
//
// Tiles and boards at the bottom, one task per game session above them,
// and the registry plus WebSocket transport the server binary wires up.

// Core game data structures
pub mod board;
pub mod errors;
pub mod message;
pub mod ordered_tiles;
pub mod player;
pub mod tile;

// Game sessions and their collaborators
pub mod game;
pub mod points;
pub mod words;

// Server implementation
pub mod config;
pub mod manager;
pub mod websocket;

// Re-export common types for convenient access
pub use crate::board::{Board, BoardConfig};
pub use crate::config::ServerArgs;
pub use crate::errors::{BoardError, ConfigError, GameError, ManagerError, NetworkError};
pub use crate::game::{Config, GameId, GameInfo, GameSession, GameStatus, PlayerName};
pub use crate::manager::GameManager;
pub use crate::message::{Message, MessageType};
pub use crate::player::Player;
pub use crate::points::{InMemoryPointsStore, UserPointsStore};
pub use crate::tile::{Position, Tile};
pub use crate::websocket::WebSocketService;
pub use crate::words::{WordChecker, WordList};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
