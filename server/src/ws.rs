use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tower_http::cors::CorsLayer;

use arena_shared::protocol::{ClientMsg, PongMsg, ServerMsg};

use crate::broadcast::client_channel;
use crate::game_loop::GameCommand;
use crate::page::index_handler;

/// Shared app state passed to each handler
#[derive(Clone)]
pub struct AppState {
    pub game_tx: mpsc::Sender<GameCommand>,
    pub index_path: Arc<PathBuf>,
}

/// WebSocket endpoint at `/ws`, index page for everything else.
pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .fallback(index_handler)
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

/// HTTP handler for WebSocket upgrade
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, app_state))
}

fn encode(msg: &ServerMsg) -> Option<Message> {
    match serde_json::to_string(msg) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            tracing::error!("Failed to encode {:?}: {}", msg, e);
            None
        }
    }
}

async fn handle_socket(socket: WebSocket, app_state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (outbox, mut inbox) = client_channel();

    // Register with the game loop
    let (resp_tx, resp_rx) = oneshot::channel();
    if app_state
        .game_tx
        .send(GameCommand::Connect {
            outbox,
            response: resp_tx,
        })
        .await
        .is_err()
    {
        tracing::error!("Failed to send Connect command");
        return;
    }

    let welcome = match resp_rx.await {
        Ok(welcome) => welcome,
        Err(_) => {
            tracing::error!("Failed to receive welcome");
            return;
        }
    };
    let my_id = welcome.self_id;
    tracing::info!("Connection {} established", my_id);

    let welcome_sent = match encode(&ServerMsg::Welcome(welcome)) {
        Some(frame) => sink.send(frame).await.is_ok(),
        None => false,
    };

    if welcome_sent {
        loop {
            tokio::select! {
                // Client -> Server
                msg = stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            match serde_json::from_str::<ClientMsg>(&text) {
                                Ok(ClientMsg::Ping { ping }) => {
                                    let pong = ServerMsg::Pong(PongMsg { echo: ping });
                                    if let Some(frame) = encode(&pong) {
                                        if sink.send(frame).await.is_err() {
                                            break;
                                        }
                                    }
                                }
                                Ok(msg) => {
                                    if app_state
                                        .game_tx
                                        .send(GameCommand::Client { id: my_id, msg })
                                        .await
                                        .is_err()
                                    {
                                        break;
                                    }
                                }
                                Err(e) => {
                                    tracing::debug!("Connection {} sent undecodable frame: {}", my_id, e);
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Err(e)) => {
                            tracing::debug!("Connection {} read error: {}", my_id, e);
                            break;
                        }
                        _ => {} // Ignore ping/pong/binary
                    }
                }

                // Reliable events
                Some(msg) = inbox.reliable.recv() => {
                    let closing = matches!(msg, ServerMsg::IdleDisconnect);
                    if let Some(frame) = encode(&msg) {
                        if sink.send(frame).await.is_err() {
                            break;
                        }
                    }
                    if closing {
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    }
                }

                // Snapshots; anything not yet written has been replaced
                Ok(()) = inbox.snapshots.changed() => {
                    let snapshot = inbox.snapshots.borrow_and_update().clone();
                    if let Some(snapshot) = snapshot {
                        if let Some(frame) = encode(&ServerMsg::Snapshot(snapshot)) {
                            if sink.send(frame).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        }
    }

    // Cleanup on disconnect
    let _ = app_state
        .game_tx
        .send(GameCommand::Disconnect { id: my_id })
        .await;
    tracing::info!("Connection {} disconnected", my_id);
}
