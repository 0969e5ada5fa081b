//! WebSocket Module - Push in tempo reale delle notifiche
//!
//! Il client apre /ws con il proprio JWT; da quel momento ogni notifica creata
//! per lui viene anche inoltrata sul socket. Il canale è solo server -> client:
//! i messaggi in arrivo servono a tenere viva la connessione.

pub mod connection;
pub mod usermap;

// Re-exports pubblici
pub use connection::{ServerEvent, handle_socket};

use crate::{AppState, entities::User};
use axum::{
    Extension,
    extract::{State, ws::WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;

/// Secondi senza traffico dal client prima di chiudere la connessione
pub const TIMEOUT_DURATION_SECONDS: u64 = 300;
/// Intervallo minimo tra due messaggi letti dallo stesso client
pub const RATE_LIMITER_MILLIS: u64 = 50;

/// Entry point per gestire richieste di upgrade WebSocket
/// Operazioni:
/// 1. Estrarre user_id dall'autenticazione JWT
/// 2. Eseguire upgrade HTTP -> WebSocket
/// 3. Passare la connessione ad handle_socket
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>, // ottenuto dall'autenticazione JWT
) -> Response {
    let user_id = current_user.user_id;
    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}
