use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::errors::{ManagerError, ManagerResult};
use crate::game::{Config, GameId, GameInfo, GameSession, GameStatus, Teardown};
use crate::message::{Message, MessageType};
use crate::points::UserPointsStore;
use crate::words::WordChecker;

/// Messages a game may have queued before senders wait
const INBOUND_CAPACITY: usize = 64;

/// Messages kept for slow subscribers before they start lagging
const BROADCAST_CAPACITY: usize = 1024;

/// What the manager keeps about a running game
struct GameHandle {
    sender: mpsc::Sender<Message>,
    cancel: CancellationToken,
    info: GameInfo,
}

type Games = Arc<RwLock<HashMap<GameId, GameHandle>>>;

/// Registry of running games.
///
/// Each game runs as its own task. Everything the games emit is forwarded
/// onto one broadcast channel that player connections subscribe to.
#[derive(Clone)]
pub struct GameManager {
    games: Games,
    config: Config,
    word_checker: Arc<dyn WordChecker>,
    points_store: Arc<dyn UserPointsStore>,
    output: mpsc::UnboundedSender<Message>,
    broadcaster: broadcast::Sender<Message>,
    cancel: CancellationToken,
}

impl GameManager {
    /// Must be called from within a tokio runtime.
    pub fn new(
        config: Config,
        word_checker: Arc<dyn WordChecker>,
        points_store: Arc<dyn UserPointsStore>,
    ) -> Self {
        let games: Games = Arc::new(RwLock::new(HashMap::new()));
        let (output, output_rx) = mpsc::unbounded_channel();
        let (broadcaster, _) = broadcast::channel(BROADCAST_CAPACITY);
        let cancel = CancellationToken::new();

        tokio::spawn(run_hub(
            games.clone(),
            output_rx,
            broadcaster.clone(),
            cancel.clone(),
        ));

        Self {
            games,
            config,
            word_checker,
            points_store,
            output,
            broadcaster,
            cancel,
        }
    }

    /// Create a new game, start its task, and return its lobby info
    pub async fn create_game(&self) -> ManagerResult<GameInfo> {
        let id = Uuid::new_v4().to_string();
        let session = GameSession::new(
            id.clone(),
            self.config.clone(),
            self.word_checker.clone(),
            self.points_store.clone(),
        )?;
        let info = session.info();
        let announcement = session.infos_message();

        let (sender, inbound) = mpsc::channel(INBOUND_CAPACITY);
        let cancel = self.cancel.child_token();
        {
            let mut games = self.games.write().await;
            games.insert(
                id.clone(),
                GameHandle {
                    sender,
                    cancel: cancel.clone(),
                    info: info.clone(),
                },
            );
        }

        let teardown = self.teardown(id.clone());
        tokio::spawn(session.run(cancel, inbound, self.output.clone(), teardown));
        let _ = self.broadcaster.send(announcement);

        log::info!("Created game {}", id);
        Ok(info)
    }

    /// Forgets the game once its task stops and tells the lobby it is gone.
    fn teardown(&self, game_id: GameId) -> Teardown {
        let games = self.games.clone();
        let broadcaster = self.broadcaster.clone();
        Box::new(move || {
            tokio::spawn(async move {
                let removed = games.write().await.remove(&game_id);
                if let Some(handle) = removed {
                    let info = GameInfo {
                        status: GameStatus::Deleted,
                        can_join: false,
                        ..handle.info
                    };
                    let message = Message::new(MessageType::Infos)
                        .with_game_id(game_id.clone())
                        .with_game_infos(vec![info]);
                    let _ = broadcaster.send(message);
                }
                log::debug!("Removed game {}", game_id);
            });
        })
    }

    /// Queue a message for a game, stamping it with the game's id
    pub async fn send(&self, game_id: &str, message: Message) -> ManagerResult<()> {
        let sender = {
            let games = self.games.read().await;
            games
                .get(game_id)
                .map(|handle| handle.sender.clone())
                .ok_or_else(|| ManagerError::GameNotFound {
                    game_id: game_id.to_string(),
                })?
        };
        sender
            .send(message.with_game_id(game_id))
            .await
            .map_err(|_| ManagerError::GameClosed {
                game_id: game_id.to_string(),
            })
    }

    pub async fn game_exists(&self, game_id: &str) -> bool {
        self.games.read().await.contains_key(game_id)
    }

    /// Latest lobby info of every game, oldest first
    pub async fn list_games(&self) -> Vec<GameInfo> {
        let games = self.games.read().await;
        let mut infos: Vec<GameInfo> = games.values().map(|handle| handle.info.clone()).collect();
        infos.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        infos
    }

    /// Lobby event listing every game
    pub async fn infos_message(&self) -> Message {
        Message::new(MessageType::Infos).with_game_infos(self.list_games().await)
    }

    /// Stop a game without notifying its players
    pub async fn cancel_game(&self, game_id: &str) -> ManagerResult<()> {
        let games = self.games.read().await;
        let handle = games.get(game_id).ok_or_else(|| ManagerError::GameNotFound {
            game_id: game_id.to_string(),
        })?;
        handle.cancel.cancel();
        Ok(())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.broadcaster.subscribe()
    }

    /// Stop every game and the hub
    pub fn shutdown(&self) {
        log::info!("Shutting down all games");
        self.cancel.cancel();
    }
}

/// Forwards game output to subscribers, keeping lobby infos current.
async fn run_hub(
    games: Games,
    mut output: mpsc::UnboundedReceiver<Message>,
    broadcaster: broadcast::Sender<Message>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            received = output.recv() => {
                let Some(message) = received else { break };
                if message.kind == MessageType::Infos {
                    let mut games = games.write().await;
                    for info in &message.game_infos {
                        // Games already torn down stay forgotten
                        if let Some(handle) = games.get_mut(&info.id) {
                            handle.info = info.clone();
                        }
                    }
                }
                // No subscribers is fine
                let _ = broadcaster.send(message);
            }
        }
    }
    log::debug!("Game output hub stopped");
}
