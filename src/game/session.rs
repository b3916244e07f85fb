// src/game/session.rs
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::config::{Config, ShufflePlayersFn, ShuffleTilesFn};
use super::types::*;
use crate::errors::{ConfigError, GameError, GameResult};
use crate::message::{Message, MessageType};
use crate::player::Player;
use crate::points::UserPointsStore;
use crate::tile::{tiles_from_letters, Tile};
use crate::words::WordChecker;

/// Called exactly once when a session stops so its owner can forget it
pub type Teardown = Box<dyn FnOnce() + Send>;

/// All authoritative state of one game.
///
/// A session is driven by a single task (see [`GameSession::run`]) and is
/// the only writer of its players and pool, so it needs no locks.
pub struct GameSession {
    pub(super) id: GameId,
    pub(super) status: GameStatus,
    pub(super) players: BTreeMap<PlayerName, Player>,
    /// The shared pool, dealt from the front
    pub(super) unused_tiles: Vec<Tile>,
    pub(super) max_players: usize,
    pub(super) num_new_tiles: usize,
    pub(super) shuffle_unused_tiles: ShuffleTilesFn,
    pub(super) shuffle_players: ShufflePlayersFn,
    pub(super) word_checker: Arc<dyn WordChecker>,
    pub(super) points_store: Arc<dyn UserPointsStore>,
    idle_period: time::Duration,
    created_at: u64,
}

impl GameSession {
    pub fn new(
        id: GameId,
        config: Config,
        word_checker: Arc<dyn WordChecker>,
        points_store: Arc<dyn UserPointsStore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let shuffle_unused_tiles = config
            .shuffle_unused_tiles
            .ok_or(ConfigError::MissingTileShuffle)?;
        let shuffle_players = config
            .shuffle_players
            .ok_or(ConfigError::MissingPlayerShuffle)?;

        let mut unused_tiles = tiles_from_letters(&config.tile_letters);
        shuffle_unused_tiles(&mut unused_tiles[..]);

        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        Ok(Self {
            id,
            status: GameStatus::NotStarted,
            players: BTreeMap::new(),
            unused_tiles,
            max_players: config.max_players,
            num_new_tiles: config.num_new_tiles,
            shuffle_unused_tiles,
            shuffle_players,
            word_checker,
            points_store,
            idle_period: config.idle_period,
            created_at,
        })
    }

    pub fn id(&self) -> &GameId {
        &self.id
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn tiles_left(&self) -> usize {
        self.unused_tiles.len()
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.get(name)
    }

    /// Names of everyone in the game, sorted
    pub fn player_names(&self) -> Vec<PlayerName> {
        self.players.keys().cloned().collect()
    }

    pub fn info(&self) -> GameInfo {
        GameInfo {
            id: self.id.clone(),
            status: self.status,
            players: self.player_names(),
            can_join: self.status == GameStatus::NotStarted
                && self.players.len() < self.max_players,
            created_at: self.created_at,
        }
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            id: self.id.clone(),
            status: self.status,
            players: self.player_names(),
            tiles_left: self.tiles_left(),
        }
    }

    /// Processes inbound messages until the game is deleted, sits idle for a
    /// whole idle period, loses all its senders, or is cancelled.
    pub async fn run(
        mut self,
        cancel: CancellationToken,
        mut inbound: mpsc::Receiver<Message>,
        outbound: mpsc::UnboundedSender<Message>,
        teardown: Teardown,
    ) {
        log::info!("Game {} started", self.id);
        let mut idle = time::interval_at(Instant::now() + self.idle_period, self.idle_period);
        // A long handler must not leave overdue ticks to fire back to back
        idle.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut active = false;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    log::info!("Game {} cancelled", self.id);
                    break;
                }
                _ = idle.tick() => {
                    if !active {
                        log::info!("Deleting game {} after {:?} of inactivity", self.id, self.idle_period);
                        let mut out = Vec::new();
                        self.delete(&mut out);
                        self.send_all(&outbound, out);
                        break;
                    }
                    active = false;
                }
                received = inbound.recv() => {
                    let Some(message) = received else {
                        log::info!("Game {} has no more senders", self.id);
                        break;
                    };
                    let kind = message.kind;
                    if kind != MessageType::BoardSize {
                        active = true;
                    }
                    let mut out = Vec::new();
                    self.handle_message(message, &mut out).await;
                    self.send_all(&outbound, out);
                    if kind == MessageType::Delete {
                        break;
                    }
                }
            }
        }

        teardown();
        log::info!("Game {} stopped", self.id);
    }

    /// Handles one message, turning any error into a reply to its sender.
    pub async fn handle_message(&mut self, message: Message, out: &mut Vec<Message>) {
        log::debug!(
            "Game {} handling {} from {:?}",
            self.id,
            message.kind,
            message.player_name
        );
        if let Err(err) = self.dispatch(&message, out).await {
            let kind = match &err {
                GameError::Warning(_) => MessageType::SocketWarning,
                GameError::Fault(_) => {
                    log::error!(
                        "Game {}: {} from {:?} failed: {}",
                        self.id,
                        message.kind,
                        message.player_name,
                        err
                    );
                    MessageType::SocketError
                }
            };
            out.push(self.message(kind, &message.player_name).with_info(err.to_string()));
            if message.kind == MessageType::Join && !self.players.contains_key(&message.player_name) {
                out.push(self.message(MessageType::Leave, &message.player_name));
            }
        }
    }

    async fn dispatch(&mut self, message: &Message, out: &mut Vec<Message>) -> GameResult<()> {
        match message.kind {
            MessageType::Join => self.join(message, out),
            MessageType::Delete => {
                self.delete(out);
                Ok(())
            }
            MessageType::StatusChange => self.status_change(message, out).await,
            MessageType::Snag => self.snag(message, out),
            MessageType::Swap => self.swap(message, out),
            MessageType::TilesMoved => self.tiles_moved(message),
            MessageType::Chat => self.chat(message, out),
            MessageType::BoardSize => self.refresh_board(message, out),
            other => Err(GameError::fault(format!(
                "no handler for message type {other}"
            ))),
        }
    }

    /// A message from this game addressed to one player
    pub(super) fn message(&self, kind: MessageType, player_name: &str) -> Message {
        Message::new(kind)
            .with_game_id(self.id.clone())
            .with_player(player_name)
    }

    fn send_all(&self, outbound: &mpsc::UnboundedSender<Message>, out: Vec<Message>) {
        for message in out {
            if outbound.send(message).is_err() {
                log::warn!("Game {} output dropped, nobody is listening", self.id);
                return;
            }
        }
    }
}
