//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Questo modulo organizza i service handlers in sotto-moduli separati per una migliore manutenibilità.
//! Ogni modulo gestisce gli endpoint HTTP per una specifica funzionalità.

pub mod admin;
pub mod notification;
pub mod reservation;

// Re-exports per facilitare l'import
pub use admin::{
    all_reservation_stats, auto_validate_pending, auto_validate_reservation,
    cleanup_expired_locks, list_pending_reservations, send_reminders, update_reservation_status,
};
pub use notification::{
    list_notifications, mark_all_notifications_read, mark_notification_read,
    unread_notifications_count,
};
pub use reservation::{
    cancel_reservation, check_facility_conflicts, create_reservation, get_reservation,
    list_facility_reservations, list_my_reservations, my_reservation_stats,
};

use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

/// Root endpoint - health check
pub async fn root(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}
