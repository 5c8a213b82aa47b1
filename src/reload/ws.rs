//! WebSocket endpoint pushing reload instructions to browser sessions.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::http::server::AppState;
use crate::reload::hub::ReloadHub;

/// GET /__overrides__/reload → WebSocket upgrade.
pub async fn reload_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| handle_session(socket, hub))
}

async fn handle_session(socket: WebSocket, hub: Arc<ReloadHub>) {
    let session = Uuid::new_v4();
    let mut events = hub.subscribe();
    let (mut sink, mut stream) = socket.split();

    tracing::info!(%session, sessions = hub.session_count(), "browser session connected");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let frame = match serde_json::to_string(&serde_json::json!({
                        "event": "reload",
                        "path": event.path,
                    })) {
                        Ok(frame) => frame,
                        Err(error) => {
                            tracing::error!(%error, "failed to encode reload frame");
                            continue;
                        }
                    };
                    if sink.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                // a lagging session skips ahead; the next event still reloads it
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(%session, skipped, "session lagged behind reload events");
                }
                Err(RecvError::Closed) => break,
            },
            message = stream.next() => match message {
                // browsers send nothing we act on; pings are answered by axum
                Some(Ok(_)) => {}
                Some(Err(_)) | None => break,
            },
        }
    }

    tracing::debug!(%session, "browser session disconnected");
}
