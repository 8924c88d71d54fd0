//! Real-time channel: one broadcaster subscription per WebSocket client.

use alloc::sync::Arc;
use core::time::Duration;

use axum::{
    body::Bytes,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use hostwatch_common::{ClientMessage, WsMessage};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::app::{AppState, Monitor, SweepRequest};

/// Gets called for every new web client and spins up an event loop.
///
/// Authorization already happened in the route layer before the upgrade.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(AppState {
        monitor,
        ws_heartbeat,
        ..
    }): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| run_subscriber(socket, monitor, ws_heartbeat))
}

async fn send_ws_message(socket: &mut WebSocket, msg: &WsMessage) -> Result<(), axum::Error> {
    match serde_json::to_string(msg) {
        Ok(json) => socket.send(Message::Text(json.into())).await,
        Err(e) => {
            warn!("Failed to serialize websocket message: {}", e);
            Err(axum::Error::new(e))
        }
    }
}

fn handle_client_message(monitor: &Monitor, text: &str) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::ManualCheck) => {
            let request = monitor.request_sweep();
            info!(?request, "Manual check requested over WebSocket");
            if request == SweepRequest::Stopped {
                debug!("Monitor stopped, manual check ignored");
            }
        }
        Err(e) => debug!("Ignoring unknown client message: {e}"),
    }
}

/// One event loop per client. Ends when the client goes away, misses a
/// heartbeat, or the broadcaster drops the subscription.
async fn run_subscriber(mut socket: WebSocket, monitor: Arc<Monitor>, heartbeat: Duration) {
    let mut subscription = monitor.subscribe().await;
    let id = subscription.id();
    info!(subscriber = id, "WebSocket subscriber connected");

    let mut ticker = interval(heartbeat);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;
    let mut awaiting_pong = false;

    loop {
        tokio::select! {
            update = subscription.recv() => {
                let Some(update) = update else {
                    debug!(subscriber = id, "Subscription dropped by broadcaster");
                    break;
                };
                if let Err(e) = send_ws_message(&mut socket, &update.to_message()).await {
                    debug!(subscriber = id, "Failed to send message, closing connection: {e}");
                    break;
                }
            }
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => handle_client_message(&monitor, text.as_str()),
                Some(Ok(Message::Pong(_))) => awaiting_pong = false,
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(Message::Binary(_) | Message::Ping(_))) => {}
                Some(Err(e)) => {
                    debug!(subscriber = id, "WebSocket receive error: {e}");
                    break;
                }
            },
            _ = ticker.tick() => {
                if awaiting_pong {
                    info!(subscriber = id, "WebSocket subscriber missed heartbeat");
                    break;
                }
                awaiting_pong = true;
                if socket.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    monitor.unsubscribe(id).await;
    info!(subscriber = id, "WebSocket subscriber disconnected");
}
