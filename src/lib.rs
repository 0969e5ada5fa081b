//! Server library - espone i moduli principali per i test

pub mod core;
pub mod dtos;
pub mod entities;
pub mod maintenance;
pub mod repositories;
pub mod services;
pub mod workflow;
pub mod ws;

// Re-export dei tipi principali per facilitare l'import
pub use core::{AppError, AppState, auth, config};
pub use services::root;

use axum::{
    Router, middleware,
    routing::{any, get, patch, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    use core::authentication_middleware;
    use ws::ws_handler;

    Router::new()
        .route("/", get(root))
        .nest("/reservations", configure_reservation_routes(state.clone()))
        .nest("/facilities", configure_facility_routes(state.clone()))
        .nest("/admin", configure_admin_routes(state.clone()))
        .nest("/notifications", configure_notification_routes(state.clone()))
        .route(
            "/ws",
            any(ws_handler).layer(middleware::from_fn_with_state(
                state.clone(),
                authentication_middleware,
            )),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Configura le routes per gli organizzatori
fn configure_reservation_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", post(create_reservation))
        .route("/mine", get(list_my_reservations))
        .route("/mine/stats", get(my_reservation_stats))
        .route("/{reservation_id}", get(get_reservation))
        .route("/{reservation_id}/cancel", post(cancel_reservation))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura le routes di consultazione del calendario degli impianti
fn configure_facility_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/{facility_id}/reservations", get(list_facility_reservations))
        .route("/{facility_id}/conflicts", get(check_facility_conflicts))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura le routes di validazione e manutenzione (solo admin)
fn configure_admin_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use core::{admin_middleware, authentication_middleware};
    use services::*;

    // l'ultimo layer aggiunto è il primo eseguito: prima autenticazione, poi ruolo
    Router::new()
        .route("/reservations/pending", get(list_pending_reservations))
        .route("/reservations/stats", get(all_reservation_stats))
        .route("/reservations/auto-validate", post(auto_validate_pending))
        .route(
            "/reservations/{reservation_id}/status",
            patch(update_reservation_status),
        )
        .route(
            "/reservations/{reservation_id}/auto-validate",
            post(auto_validate_reservation),
        )
        .route("/locks/cleanup", post(cleanup_expired_locks))
        .route("/reminders", post(send_reminders))
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura le routes dell'inbox notifiche
fn configure_notification_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_notifications))
        .route("/unread", get(unread_notifications_count))
        .route("/read-all", post(mark_all_notifications_read))
        .route("/{notification_id}/read", post(mark_notification_read))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}
