use axum::http::{Method, StatusCode};
use axum::{
    extract::{Path, Query, State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use clap::Parser;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use bananas::{GameInfo, GameManager, InMemoryPointsStore, ServerArgs, WebSocketService};

// Application state
struct AppState {
    manager: GameManager,
    websocket: WebSocketService,
}

type SharedState = Arc<AppState>;

#[derive(Debug, Deserialize)]
struct ConnectParams {
    player: String,
}

async fn hello_world() -> &'static str {
    "Hello from the bananas server!"
}

async fn list_games(State(state): State<SharedState>) -> Json<Vec<GameInfo>> {
    Json(state.manager.list_games().await)
}

async fn create_game(State(state): State<SharedState>) -> Result<Json<GameInfo>, StatusCode> {
    match state.manager.create_game().await {
        Ok(info) => Ok(Json(info)),
        Err(e) => {
            log::error!("Failed to create game: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

// WebSocket handler for one player in one game
async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(game_id): Path<String>,
    Query(params): Query<ConnectParams>,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    if params.player.trim().is_empty() {
        return StatusCode::BAD_REQUEST.into_response();
    }
    let websocket = state.websocket.clone();
    ws.on_upgrade(move |socket| async move {
        websocket
            .handle_connection(socket, game_id, params.player)
            .await
    })
}

async fn shutdown_signal(manager: GameManager) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
    manager.shutdown();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger, defaulting to info
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = ServerArgs::parse();
    let config = args.session_config()?;
    let words = args.load_words()?;
    log::info!("Loaded {} words", words.len());

    let manager = GameManager::new(config, Arc::new(words), Arc::new(InMemoryPointsStore::new()));
    let state = Arc::new(AppState {
        manager: manager.clone(),
        websocket: WebSocketService::new(manager.clone()),
    });

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(Any);

    let app = Router::new()
        .route("/", get(hello_world))
        .route("/games", get(list_games).post(create_game))
        .route("/games/{game_id}/ws", get(ws_handler))
        .with_state(state)
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Starting bananas server on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(manager))
        .await?;
    Ok(())
}
