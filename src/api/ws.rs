//! `/ws/changes`: pushes change signals to admin dashboards, which
//! re-query the affected collection on every message.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::AppState;
use crate::store::{ChangeOp, Entity};

/// Server-to-client message.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsEvent {
    Changed {
        entity: Entity,
        #[serde(skip_serializing_if = "Option::is_none")]
        op: Option<ChangeOp>,
    },
}

#[derive(Debug, Default, Deserialize)]
struct ChangeFilter {
    /// Only forward this entity; all entities when absent.
    entity: Option<Entity>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/ws/changes", get(ws_handler))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(filter): Query<ChangeFilter>,
) -> impl IntoResponse {
    info!(entity = ?filter.entity, "Change stream client connecting");
    let rx = state.store.changes().receiver();
    ws.on_upgrade(move |socket| handle_socket(socket, rx, filter.entity))
}

async fn send_event(socket: &mut WebSocket, event: &WsEvent) -> bool {
    match serde_json::to_string(event) {
        Ok(json) => socket.send(Message::Text(json.into())).await.is_ok(),
        Err(_) => true,
    }
}

async fn handle_socket(
    mut socket: WebSocket,
    mut rx: broadcast::Receiver<crate::store::ChangeEvent>,
    filter: Option<Entity>,
) {
    info!("Change stream client connected");

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(change) => {
                        if filter.is_some_and(|e| e != change.entity) {
                            continue;
                        }
                        let event = WsEvent::Changed { entity: change.entity, op: Some(change.op) };
                        if !send_event(&mut socket, &event).await {
                            debug!("Client disconnected during send");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(missed = n, "Change stream client lagged behind broadcast");
                        // Tell the client to refetch everything it watches.
                        let entities = match filter {
                            Some(e) => vec![e],
                            None => Entity::ALL.to_vec(),
                        };
                        let mut open = true;
                        for entity in entities {
                            if !send_event(&mut socket, &WsEvent::Changed { entity, op: None }).await {
                                open = false;
                                break;
                            }
                        }
                        if !open {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Broadcast channel closed");
                        break;
                    }
                }
            }

            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Change stream client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    info!("Change stream connection closed");
}
