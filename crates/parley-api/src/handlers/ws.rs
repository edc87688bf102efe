//! WebSocket upgrade handler.
//!
//! Connections start unauthenticated; the client sends an `authenticate`
//! event first. Inbound frames are handled one at a time, so an event
//! that arrives while an earlier one is still being authorized waits for
//! it to finish.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use parley_core::error::AppError;
use parley_realtime::connection::heartbeat::run_heartbeat;
use parley_realtime::message::serializer::serialize_outbound;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /ws — WebSocket upgrade.
///
/// Refused once the engine has started shutting down.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    if state.realtime.is_shutting_down() {
        return Err(AppError::service_unavailable("Server is shutting down").into());
    }

    let max_frame = state.config.realtime.max_frame_bytes;
    Ok(ws
        .max_message_size(max_frame.saturating_mul(2))
        .on_upgrade(move |socket| handle_ws_connection(state, socket)))
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(state: AppState, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let realtime = state.realtime.clone();

    let (handle, mut outbound_rx) = realtime.connections.register();
    let conn_id = handle.id;

    let outbound_task = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            let text = match serialize_outbound(&msg) {
                Ok(text) => text,
                Err(e) => {
                    warn!(conn_id = %conn_id, error = %e, "Failed to serialize outbound event");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    let heartbeat_task = tokio::spawn(run_heartbeat(handle.clone(), realtime.heartbeat_config()));
    let mut shutdown = realtime.shutdown_receiver();
    let mut liveness = tokio::time::interval(std::time::Duration::from_secs(1));

    loop {
        tokio::select! {
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    realtime.router.handle_frame(conn_id, text.as_str()).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
            },
            _ = shutdown.recv() => {
                debug!(conn_id = %conn_id, "Closing connection for shutdown");
                break;
            }
            _ = liveness.tick() => {
                if !handle.is_alive() {
                    break;
                }
            }
        }
    }

    realtime.router.disconnect(conn_id);
    heartbeat_task.abort();
    outbound_task.abort();

    info!(conn_id = %conn_id, user_id = ?handle.user_id(), "WebSocket connection closed");
}
