// src/game/handlers.rs
use std::collections::BTreeMap;

use super::config::TILES_PER_SWAP;
use super::session::GameSession;
use super::types::*;
use crate::board::{Board, BoardConfig, MIN_BOARD_SIZE};
use crate::errors::{GameError, GameResult};
use crate::message::{Message, MessageType};
use crate::player::Player;
use crate::tile::Tile;

fn find_player<'a>(
    players: &'a mut BTreeMap<PlayerName, Player>,
    name: &str,
) -> GameResult<&'a mut Player> {
    players
        .get_mut(name)
        .ok_or_else(|| GameError::warning(format!("player {name} is not in the game")))
}

impl GameSession {
    /// Lobby event describing this game
    pub fn infos_message(&self) -> Message {
        Message::new(MessageType::Infos)
            .with_game_id(self.id.clone())
            .with_game_infos(vec![self.info()])
    }

    pub(super) fn join(&mut self, message: &Message, out: &mut Vec<Message>) -> GameResult<()> {
        if message.player_name.is_empty() {
            return Err(GameError::warning("missing player name"));
        }
        if self.players.contains_key(&message.player_name) {
            return self.refresh_board(message, out);
        }
        self.add_player(message, out)
    }

    fn add_player(&mut self, message: &Message, out: &mut Vec<Message>) -> GameResult<()> {
        if self.status != GameStatus::NotStarted {
            return Err(GameError::warning("cannot join game that has been started"));
        }
        if self.players.len() >= self.max_players {
            return Err(GameError::warning("no room for another player in game"));
        }
        if self.unused_tiles.len() < self.num_new_tiles {
            return Err(GameError::warning("not enough tiles to join game"));
        }

        let mut config = message.board_config();
        if config.is_zero() {
            config = BoardConfig::new(MIN_BOARD_SIZE, MIN_BOARD_SIZE);
        }
        // The pool is only drained once the board holds the dealt tiles.
        let mut board = Board::new(config)?;
        for tile in &self.unused_tiles[..self.num_new_tiles] {
            board.add_tile(*tile)?;
        }
        self.unused_tiles.drain(..self.num_new_tiles);

        let name = message.player_name.clone();
        self.players.insert(name.clone(), Player::new(board));
        let summary = self.summary();
        if let Some(player) = self.players.get(&name) {
            out.push(player.state_message(&summary, &name));
        }
        log::info!("Player {} joined game {}", name, self.id);

        for other in self.players.keys().filter(|n| **n != name) {
            out.push(
                self.message(MessageType::TilesChange, other)
                    .with_info(format!("{name} joined the game"))
                    .with_players(summary.players.clone())
                    .with_tiles_left(summary.tiles_left),
            );
        }
        out.push(self.infos_message());
        Ok(())
    }

    pub(super) fn delete(&mut self, out: &mut Vec<Message>) {
        for name in self.players.keys() {
            out.push(self.message(MessageType::Leave, name).with_info("game deleted"));
        }
        self.status = GameStatus::Deleted;
        log::info!("Game {} deleted", self.id);
    }

    pub(super) async fn status_change(
        &mut self,
        message: &Message,
        out: &mut Vec<Message>,
    ) -> GameResult<()> {
        match self.status {
            GameStatus::NotStarted => self.start(message, out)?,
            GameStatus::InProgress => self.finish(message, out).await?,
            status => {
                return Err(GameError::fault(format!(
                    "cannot change game status when the game is {status}"
                )))
            }
        }
        out.push(self.infos_message());
        Ok(())
    }

    fn start(&mut self, message: &Message, out: &mut Vec<Message>) -> GameResult<()> {
        if message.game_status != Some(GameStatus::InProgress) {
            return Err(GameError::warning(format!(
                "invalid game status change from {}",
                self.status
            )));
        }
        self.status = GameStatus::InProgress;
        log::info!("Game {} started by {}", self.id, message.player_name);
        self.broadcast_status(format!("{} started the game", message.player_name), out);
        Ok(())
    }

    async fn finish(&mut self, message: &Message, out: &mut Vec<Message>) -> GameResult<()> {
        if message.game_status != Some(GameStatus::Finished) {
            return Err(GameError::warning(format!(
                "invalid game status change from {}",
                self.status
            )));
        }
        if !self.unused_tiles.is_empty() {
            return Err(GameError::warning("snag first"));
        }

        let name = &message.player_name;
        let player = find_player(&mut self.players, name)?;
        if player.board.unused_count() > 0 {
            player.decrement_win_points();
            return Err(GameError::warning(
                "not all tiles used, possible win points decremented",
            ));
        }
        if !player.board.has_single_used_group() {
            player.decrement_win_points();
            return Err(GameError::warning(
                "not all used tiles form a single group, possible win points decremented",
            ));
        }
        let invalid: Vec<String> = player
            .board
            .used_tile_words()
            .into_iter()
            .filter(|word| !self.word_checker.check(word))
            .collect();
        if !invalid.is_empty() {
            player.decrement_win_points();
            return Err(GameError::warning(format!(
                "invalid words: {}, possible win points decremented",
                invalid.join(", ")
            )));
        }

        let win_points = player.win_points();
        self.status = GameStatus::Finished;
        log::info!("Game {} won by {} for {} points", self.id, name, win_points);

        let names = self.player_names();
        let increment = |user: &str| if user == name.as_str() { win_points } else { 1 };
        let info = match self
            .points_store
            .update_points_increment(&names, &increment)
            .await
        {
            Ok(()) => format!("{name} won"),
            Err(err) => {
                log::error!("Game {}: saving points failed: {}", self.id, err);
                format!("{name} won, but points could not be saved: {err}")
            }
        };
        self.broadcast_status(info, out);
        Ok(())
    }

    fn broadcast_status(&self, info: String, out: &mut Vec<Message>) {
        for name in self.players.keys() {
            out.push(
                self.message(MessageType::StatusChange, name)
                    .with_info(info.clone())
                    .with_status(self.status)
                    .with_tiles_left(self.tiles_left()),
            );
        }
    }

    pub(super) fn snag(&mut self, message: &Message, out: &mut Vec<Message>) -> GameResult<()> {
        match self.status {
            GameStatus::InProgress => {}
            GameStatus::NotStarted => return Err(GameError::warning("game has not started")),
            _ => return Err(GameError::warning("game is not in progress")),
        }
        if self.unused_tiles.is_empty() {
            return Err(GameError::warning("no tiles left to snag"));
        }
        let name = &message.player_name;
        let player = find_player(&mut self.players, name)?;
        let snagged = self.unused_tiles.remove(0);
        player.board.add_tile(snagged)?;

        let mut others: Vec<PlayerName> = self
            .players
            .keys()
            .filter(|other| *other != name)
            .cloned()
            .collect();
        (self.shuffle_players)(&mut others[..]);

        let mut dealt: Vec<(PlayerName, Vec<Tile>)> = Vec::with_capacity(others.len());
        for other in others {
            let mut tiles = Vec::new();
            if !self.unused_tiles.is_empty() {
                let tile = self.unused_tiles.remove(0);
                find_player(&mut self.players, &other)?.board.add_tile(tile)?;
                tiles.push(tile);
            }
            dealt.push((other, tiles));
        }

        let tiles_left = self.tiles_left();
        out.push(
            self.message(MessageType::TilesChange, name)
                .with_info(format!("snagged a tile: {}", snagged.letter))
                .with_tiles(vec![snagged])
                .with_tiles_left(tiles_left),
        );
        for (other, tiles) in dealt {
            let info = match tiles.first() {
                Some(tile) => format!("{name} snagged a tile, you got: {}", tile.letter),
                None => format!("{name} snagged a tile"),
            };
            out.push(
                self.message(MessageType::TilesChange, &other)
                    .with_info(info)
                    .with_tiles(tiles)
                    .with_tiles_left(tiles_left),
            );
        }
        Ok(())
    }

    pub(super) fn swap(&mut self, message: &Message, out: &mut Vec<Message>) -> GameResult<()> {
        if self.status != GameStatus::InProgress {
            return Err(GameError::warning("game is not in progress"));
        }
        let Some(&requested) = message.tiles.first() else {
            return Err(GameError::warning("no tile specified for swap"));
        };
        if self.unused_tiles.is_empty() {
            return Err(GameError::warning(
                "no tiles left to swap, user must use all tiles",
            ));
        }

        let name = &message.player_name;
        let player = find_player(&mut self.players, name)?;
        let returned = player.board.remove_tile(requested)?;
        self.unused_tiles.push(returned);
        (self.shuffle_unused_tiles)(&mut self.unused_tiles[..]);

        let count = TILES_PER_SWAP.min(self.unused_tiles.len());
        let new_tiles: Vec<Tile> = self.unused_tiles.drain(..count).collect();
        for tile in &new_tiles {
            player.board.add_tile(*tile)?;
        }

        let tiles_left = self.tiles_left();
        let letters: String = new_tiles.iter().map(|t| t.letter).collect();
        out.push(
            self.message(MessageType::TilesChange, name)
                .with_info(format!("swapped a {} tile for {}", returned.letter, letters))
                .with_tiles(new_tiles)
                .with_tiles_left(tiles_left),
        );
        for other in self.players.keys().filter(|other| *other != name) {
            out.push(
                self.message(MessageType::TilesChange, other)
                    .with_info(format!("{name} swapped a tile"))
                    .with_tiles_left(tiles_left),
            );
        }
        Ok(())
    }

    pub(super) fn tiles_moved(&mut self, message: &Message) -> GameResult<()> {
        if self.status != GameStatus::InProgress {
            return Err(GameError::warning("game is not in progress"));
        }
        let player = find_player(&mut self.players, &message.player_name)?;
        player.board.move_tiles(&message.tile_positions)?;
        Ok(())
    }

    pub(super) fn refresh_board(
        &mut self,
        message: &Message,
        out: &mut Vec<Message>,
    ) -> GameResult<()> {
        let summary = self.summary();
        let name = &message.player_name;
        let player = find_player(&mut self.players, name)?;
        let mut config = message.board_config();
        if config.is_zero() {
            config = player.board.config();
        }
        out.push(player.refresh_board(config, &summary, name)?);
        Ok(())
    }

    pub(super) fn chat(&mut self, message: &Message, out: &mut Vec<Message>) -> GameResult<()> {
        let sender = &message.player_name;
        if !self.players.contains_key(sender) {
            return Err(GameError::warning(format!("player {sender} is not in the game")));
        }
        let info = format!("{sender} : {}", message.info);
        for name in self.players.keys() {
            out.push(self.message(MessageType::Chat, name).with_info(info.clone()));
        }
        Ok(())
    }
}
