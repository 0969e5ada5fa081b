//! Notification DTOs - Data Transfer Objects per notifiche

use crate::entities::{NotificationKind, ReservationNotification};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Struct per gestire io col client
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NotificationDTO {
    pub notification_id: i32,
    pub reservation_id: i32,
    pub recipient_id: i32,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub sent_at: DateTime<Utc>,
}

impl From<ReservationNotification> for NotificationDTO {
    fn from(value: ReservationNotification) -> Self {
        Self {
            notification_id: value.notification_id,
            reservation_id: value.reservation_id,
            recipient_id: value.recipient_id,
            kind: value.kind,
            title: value.title,
            message: value.message,
            is_read: value.is_read,
            sent_at: value.sent_at,
        }
    }
}

/// DTO per creare una nuova notifica (senza id, read flag e sent_at)
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateNotificationDTO {
    pub reservation_id: i32,
    pub recipient_id: i32,
    pub kind: NotificationKind,
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 2000, message = "Message must be between 1 and 2000 characters"))]
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UnreadCountDTO {
    pub unread: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MarkedReadDTO {
    pub updated: u64,
}
