use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::broadcast;

use crate::errors::{NetworkError, NetworkResult};
use crate::game::GameId;
use crate::manager::GameManager;
use crate::message::{Message, MessageType};

/// WebSocket transport between one player and one game.
/// Game rules live in the session; this only moves JSON frames.
#[derive(Clone)]
pub struct WebSocketService {
    manager: GameManager,
}

impl WebSocketService {
    pub fn new(manager: GameManager) -> Self {
        Self { manager }
    }

    /// Handle a new WebSocket connection
    pub async fn handle_connection(&self, socket: WebSocket, game_id: GameId, player_name: String) {
        log::info!("New WebSocket connection for {} in game {}", player_name, game_id);

        // Split socket for concurrent read/write
        let (mut sender, mut receiver) = socket.split();

        if !self.manager.game_exists(&game_id).await {
            let error = Message::new(MessageType::SocketError)
                .with_player(player_name.clone())
                .with_game_id(game_id.clone())
                .with_info(format!("game {game_id} not found"));
            let _ = send_message(&mut sender, &error).await;
            let _ = sender.send(WsMessage::Close(None)).await;
            return;
        }

        // Subscribe before anything is sent so no reply is missed
        let mut updates = self.manager.subscribe();
        let lobby = self.manager.infos_message().await;
        if let Err(e) = send_message(&mut sender, &lobby).await {
            log::error!("Failed to send lobby to {}: {}", player_name, e);
            return;
        }

        // Task to forward game output to this player
        let update_game_id = game_id.clone();
        let update_player = player_name.clone();
        let mut update_task = tokio::spawn(async move {
            loop {
                let message = match updates.recv().await {
                    Ok(message) => message,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        log::warn!("{} missed {} game messages", update_player, skipped);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                if !is_addressed_to(&message, &update_game_id, &update_player) {
                    continue;
                }
                if send_message(&mut sender, &message).await.is_err() {
                    break; // Client disconnected
                }
                if message.kind == MessageType::Leave {
                    let _ = sender.send(WsMessage::Close(None)).await;
                    break;
                }
            }
        });

        // Task to pass this player's messages to the game
        let manager = self.manager.clone();
        let message_game_id = game_id.clone();
        let message_player = player_name.clone();
        let mut message_task = tokio::spawn(async move {
            while let Some(Ok(frame)) = receiver.next().await {
                match frame {
                    WsMessage::Text(text) => {
                        let result = match parse_message(text.as_str(), &message_game_id, &message_player) {
                            Ok(message) => manager
                                .send(&message_game_id, message)
                                .await
                                .map_err(NetworkError::from),
                            Err(e) => Err(e),
                        };
                        match result {
                            Ok(()) => {}
                            Err(NetworkError::Manager(e)) => {
                                log::info!("Closing connection of {}: {}", message_player, e);
                                break;
                            }
                            Err(e) => log::warn!("Ignoring frame from {}: {}", message_player, e),
                        }
                    }
                    WsMessage::Close(_) => {
                        log::info!("WebSocket connection closed by {}", message_player);
                        break;
                    }
                    _ => {}
                }
            }
        });

        // Wait for either task to complete (client disconnect or Leave)
        tokio::select! {
            _ = &mut update_task => {
                message_task.abort();
            }
            _ = &mut message_task => {
                update_task.abort();
            }
        }

        log::info!("WebSocket connection terminated for {} in game {}", player_name, game_id);
    }
}

/// Reads a player's frame, trusting the connection for who sent it and where.
fn parse_message(text: &str, game_id: &str, player_name: &str) -> NetworkResult<Message> {
    let mut message: Message =
        serde_json::from_str(text).map_err(|e| NetworkError::DeserializationFailed {
            details: e.to_string(),
        })?;
    message.player_name = player_name.to_string();
    message.game_id = game_id.to_string();
    Ok(message)
}

/// Lobby events go to everyone; everything else only to its player.
fn is_addressed_to(message: &Message, game_id: &str, player_name: &str) -> bool {
    if message.kind == MessageType::Infos {
        return true;
    }
    message.game_id == game_id && message.player_name == player_name
}

async fn send_message(
    sender: &mut futures::stream::SplitSink<WebSocket, WsMessage>,
    message: &Message,
) -> NetworkResult<()> {
    let json = serde_json::to_string(message).map_err(|e| NetworkError::SerializationFailed {
        details: e.to_string(),
    })?;
    sender
        .send(WsMessage::Text(json.into()))
        .await
        .map_err(|e| NetworkError::SerializationFailed {
            details: e.to_string(),
        })
}
