//! MySqlNotificationRepository - Repository per le notifiche di prenotazione

use super::traits::NotificationStore;
use crate::dtos::CreateNotificationDTO;
use crate::entities::{NotificationKind, ReservationNotification};
use crate::workflow::{ReservationError, ReservationResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

// NOTIFICATION REPO
pub struct MySqlNotificationRepository {
    connection_pool: MySqlPool,
}

impl MySqlNotificationRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }
}

#[async_trait]
impl NotificationStore for MySqlNotificationRepository {
    async fn create(
        &self,
        data: &CreateNotificationDTO,
        now: DateTime<Utc>,
    ) -> ReservationResult<ReservationNotification> {
        let result = sqlx::query(
            r#"
            INSERT INTO reservation_notifications
                (reservation_id, recipient_id, kind, title, message, is_read, sent_at)
            VALUES (?, ?, ?, ?, ?, FALSE, ?)
            "#,
        )
        .bind(data.reservation_id)
        .bind(data.recipient_id)
        .bind(data.kind)
        .bind(&data.title)
        .bind(&data.message)
        .bind(now)
        .execute(&self.connection_pool)
        .await?;

        Ok(ReservationNotification {
            notification_id: result.last_insert_id() as i32,
            reservation_id: data.reservation_id,
            recipient_id: data.recipient_id,
            kind: data.kind,
            title: data.title.clone(),
            message: data.message.clone(),
            is_read: false,
            sent_at: now,
        })
    }

    async fn find_by_recipient(
        &self,
        recipient_id: i32,
    ) -> ReservationResult<Vec<ReservationNotification>> {
        let notifications = sqlx::query_as::<_, ReservationNotification>(
            r#"
            SELECT notification_id, reservation_id, recipient_id, kind, title, message, is_read, sent_at
            FROM reservation_notifications
            WHERE recipient_id = ?
            ORDER BY sent_at DESC, notification_id DESC
            "#,
        )
        .bind(recipient_id)
        .fetch_all(&self.connection_pool)
        .await?;
        Ok(notifications)
    }

    async fn unread_count(&self, recipient_id: i32) -> ReservationResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reservation_notifications WHERE recipient_id = ? AND is_read = FALSE",
        )
        .bind(recipient_id)
        .fetch_one(&self.connection_pool)
        .await?;
        Ok(count as u64)
    }

    async fn mark_read(
        &self,
        notification_id: i32,
        recipient_id: i32,
    ) -> ReservationResult<ReservationNotification> {
        sqlx::query(
            "UPDATE reservation_notifications SET is_read = TRUE WHERE notification_id = ? AND recipient_id = ?",
        )
        .bind(notification_id)
        .bind(recipient_id)
        .execute(&self.connection_pool)
        .await?;

        // rows_affected è 0 anche se era già letta: rileggiamo per distinguere
        sqlx::query_as::<_, ReservationNotification>(
            r#"
            SELECT notification_id, reservation_id, recipient_id, kind, title, message, is_read, sent_at
            FROM reservation_notifications
            WHERE notification_id = ? AND recipient_id = ?
            "#,
        )
        .bind(notification_id)
        .bind(recipient_id)
        .fetch_optional(&self.connection_pool)
        .await?
        .ok_or(ReservationError::NotFound("notification"))
    }

    async fn mark_all_read(&self, recipient_id: i32) -> ReservationResult<u64> {
        let result = sqlx::query(
            "UPDATE reservation_notifications SET is_read = TRUE WHERE recipient_id = ? AND is_read = FALSE",
        )
        .bind(recipient_id)
        .execute(&self.connection_pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn exists_for(
        &self,
        reservation_id: i32,
        kind: NotificationKind,
    ) -> ReservationResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reservation_notifications WHERE reservation_id = ? AND kind = ?",
        )
        .bind(reservation_id)
        .bind(kind)
        .fetch_one(&self.connection_pool)
        .await?;
        Ok(count > 0)
    }
}
