// Player module - a board plus the points the player would win by finishing

use crate::board::{Board, BoardConfig};
use crate::errors::BoardResult;
use crate::game::GameSummary;
use crate::message::{Message, MessageType};

/// Points a player earns for finishing before any failed attempt
pub const STARTING_WIN_POINTS: i64 = 10;

/// Failed attempts never take a player below this
pub const MIN_WIN_POINTS: i64 = 2;

#[derive(Debug, Clone)]
pub struct Player {
    pub board: Board,
    win_points: i64,
}

impl Player {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            win_points: STARTING_WIN_POINTS,
        }
    }

    pub fn win_points(&self) -> i64 {
        self.win_points
    }

    pub fn decrement_win_points(&mut self) {
        if self.win_points > MIN_WIN_POINTS {
            self.win_points -= 1;
        }
    }

    /// Resizes the board and builds the message that resynchronizes a client
    /// with the whole game.
    pub fn refresh_board(
        &mut self,
        config: BoardConfig,
        summary: &GameSummary,
        name: &str,
    ) -> BoardResult<Message> {
        let resized = self.board.resize(config)?;
        let message = self
            .state_message(summary, name)
            .with_info(resized.info.unwrap_or_default());
        Ok(message)
    }

    /// Full state of this player's board and the game around it.
    pub fn state_message(&self, summary: &GameSummary, name: &str) -> Message {
        Message::new(MessageType::Join)
            .with_player(name)
            .with_game_id(summary.id.clone())
            .with_tiles(self.board.unused_tiles())
            .with_tile_positions(self.board.used_tile_positions())
            .with_tiles_left(summary.tiles_left)
            .with_status(summary.status)
            .with_players(summary.players.clone())
            .with_board_config(self.board.config())
    }
}
