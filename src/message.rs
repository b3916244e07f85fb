use serde::{Deserialize, Serialize};
use std::fmt;

use crate::board::BoardConfig;
use crate::game::{GameId, GameInfo, GameStatus, PlayerName};
use crate::tile::{Position, Tile};

/// Every kind of message that travels between players and a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Join,
    Delete,
    StatusChange,
    Snag,
    Swap,
    TilesMoved,
    Chat,
    BoardSize,

    // Only ever sent by the server
    Leave,
    Infos,
    SocketWarning,
    SocketError,
    TilesChange,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageType::Join => "join",
            MessageType::Delete => "delete",
            MessageType::StatusChange => "status_change",
            MessageType::Snag => "snag",
            MessageType::Swap => "swap",
            MessageType::TilesMoved => "tiles_moved",
            MessageType::Chat => "chat",
            MessageType::BoardSize => "board_size",
            MessageType::Leave => "leave",
            MessageType::Infos => "infos",
            MessageType::SocketWarning => "socket_warning",
            MessageType::SocketError => "socket_error",
            MessageType::TilesChange => "tiles_change",
        };
        f.write_str(name)
    }
}

/// The unit of communication with a game, in both directions.
///
/// Only `type` is required on the wire; empty fields are left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: MessageType,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub player_name: PlayerName,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub info: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tiles: Vec<Tile>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tile_positions: Vec<Position>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_status: Option<GameStatus>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub game_players: Vec<PlayerName>,

    #[serde(rename = "gameID", default, skip_serializing_if = "String::is_empty")]
    pub game_id: GameId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiles_left: Option<usize>,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub num_rows: usize,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub num_cols: usize,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub game_infos: Vec<GameInfo>,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl Message {
    pub fn new(kind: MessageType) -> Self {
        Self {
            kind,
            player_name: PlayerName::new(),
            info: String::new(),
            tiles: Vec::new(),
            tile_positions: Vec::new(),
            game_status: None,
            game_players: Vec::new(),
            game_id: GameId::new(),
            tiles_left: None,
            num_rows: 0,
            num_cols: 0,
            game_infos: Vec::new(),
        }
    }

    pub fn with_player(mut self, player_name: impl Into<PlayerName>) -> Self {
        self.player_name = player_name.into();
        self
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }

    pub fn with_tiles(mut self, tiles: Vec<Tile>) -> Self {
        self.tiles = tiles;
        self
    }

    pub fn with_tile_positions(mut self, tile_positions: Vec<Position>) -> Self {
        self.tile_positions = tile_positions;
        self
    }

    pub fn with_status(mut self, status: GameStatus) -> Self {
        self.game_status = Some(status);
        self
    }

    pub fn with_players(mut self, players: Vec<PlayerName>) -> Self {
        self.game_players = players;
        self
    }

    pub fn with_game_id(mut self, game_id: impl Into<GameId>) -> Self {
        self.game_id = game_id.into();
        self
    }

    pub fn with_tiles_left(mut self, tiles_left: usize) -> Self {
        self.tiles_left = Some(tiles_left);
        self
    }

    pub fn with_board_config(mut self, config: BoardConfig) -> Self {
        self.num_rows = config.num_rows;
        self.num_cols = config.num_cols;
        self
    }

    pub fn with_game_infos(mut self, game_infos: Vec<GameInfo>) -> Self {
        self.game_infos = game_infos;
        self
    }

    /// Board dimensions carried by the message
    pub fn board_config(&self) -> BoardConfig {
        BoardConfig::new(self.num_rows, self.num_cols)
    }
}
