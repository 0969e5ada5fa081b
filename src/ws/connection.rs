//! WebSocket Connection Management - Gestione connessioni WebSocket

use crate::ws::{RATE_LIMITER_MILLIS, TIMEOUT_DURATION_SECONDS};
use crate::{AppState, dtos::NotificationDTO, ws::usermap::InternalSignal};
use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::time::{Duration, interval, timeout};
use tracing::{debug, error, info, instrument, warn};

/// Evento inviato al client
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Notification(NotificationDTO),
}

#[instrument(skip(ws, state), fields(user_id = %user_id))]
pub async fn handle_socket(ws: WebSocket, state: Arc<AppState>, user_id: i32) {
    info!("WebSocket connection established");

    // Dividiamo il WebSocket in due metà: sender e receiver
    let (ws_tx, ws_rx) = ws.split();

    // Canale interno: il workflow ci spinge le notifiche tramite UserMap
    let (int_tx, int_rx) = unbounded_channel::<InternalSignal>();

    state.users_online.register_online(user_id, int_tx.clone());
    info!("User registered as online");

    tokio::spawn(listen_ws(user_id, ws_rx, int_tx, state));
    tokio::spawn(write_ws(ws_tx, int_rx));
}

#[instrument(skip(websocket_tx, internal_rx))]
pub async fn write_ws(
    mut websocket_tx: SplitSink<WebSocket, Message>,
    mut internal_rx: UnboundedReceiver<InternalSignal>,
) {
    info!("Write task started");

    while let Some(signal) = internal_rx.recv().await {
        match signal {
            InternalSignal::Shutdown => {
                info!("Shutdown signal received");
                break;
            }
            InternalSignal::Notification(notification) => {
                let notification_id = notification.notification_id;
                let json = match serde_json::to_string(&ServerEvent::Notification(notification)) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to serialize notification: {:?}", e);
                        continue;
                    }
                };
                if let Err(e) = websocket_tx.send(Message::Text(Utf8Bytes::from(json))).await {
                    error!("Failed to push notification: {:?}", e);
                    break;
                }
                debug!(notification_id, "Notification pushed to client");
            }
        }
    }

    let _ = websocket_tx.close().await;
    info!("Write task terminated");
}

#[instrument(skip(websocket_rx, internal_tx, state), fields(user_id = %user_id))]
pub async fn listen_ws(
    user_id: i32,
    mut websocket_rx: SplitStream<WebSocket>,
    internal_tx: UnboundedSender<InternalSignal>,
    state: Arc<AppState>,
) {
    info!("Listen task started");

    let mut rate_limiter = interval(Duration::from_millis(RATE_LIMITER_MILLIS));
    let timeout_duration = Duration::from_secs(TIMEOUT_DURATION_SECONDS);

    loop {
        match timeout(timeout_duration, StreamExt::next(&mut websocket_rx)).await {
            Ok(Some(Ok(msg))) => {
                rate_limiter.tick().await;
                // ping/pong gestiti da axum, il testo è solo keepalive
                if let Message::Close(_) = msg {
                    info!("Close message received");
                    break;
                }
            }
            Ok(Some(Err(e))) => {
                warn!("WebSocket error: {:?}", e);
                break;
            }
            Ok(None) => {
                info!("WebSocket stream ended");
                break;
            }
            Err(_) => {
                warn!(
                    timeout_secs = TIMEOUT_DURATION_SECONDS,
                    "Connection timeout"
                );
                break;
            }
        }
    }

    // Cleanup
    info!("Cleaning up connection");
    let _ = internal_tx.send(InternalSignal::Shutdown);
    state.users_online.remove_from_online(&user_id, &internal_tx);
    info!("Listen task terminated");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::NotificationKind;
    use chrono::Utc;

    #[test]
    fn test_server_event_shape() {
        let event = ServerEvent::Notification(NotificationDTO {
            notification_id: 8,
            reservation_id: 2,
            recipient_id: 5,
            kind: NotificationKind::Reminder,
            title: "Rappel de réservation".to_string(),
            message: "bientôt".to_string(),
            is_read: false,
            sent_at: Utc::now(),
        });

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "notification");
        assert_eq!(value["data"]["kind"], "reminder");
        assert_eq!(value["data"]["notification_id"], 8);
    }
}
