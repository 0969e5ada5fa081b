//! ReservationNotification entity - Notifica legata al ciclo di vita di una prenotazione

use super::enums::NotificationKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ReservationNotification {
    pub notification_id: i32,
    pub reservation_id: i32,
    pub recipient_id: i32,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub sent_at: DateTime<Utc>,
}
