//! Notification services - Inbox dell'utente corrente

use crate::core::{AppError, AppState};
use crate::dtos::{MarkedReadDTO, NotificationDTO, UnreadCountDTO};
use crate::entities::User;
use axum::{
    Extension,
    extract::{Json, Path, State},
};
use std::sync::Arc;
use tracing::{debug, instrument};

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<NotificationDTO>>, AppError> {
    let notifications = state
        .notifications
        .find_by_recipient(current_user.user_id)
        .await?;
    debug!("Found {} notifications", notifications.len());
    Ok(Json(
        notifications.into_iter().map(NotificationDTO::from).collect(),
    ))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn unread_notifications_count(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<UnreadCountDTO>, AppError> {
    let unread = state.notifications.unread_count(current_user.user_id).await?;
    Ok(Json(UnreadCountDTO { unread }))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, notification_id = %notification_id))]
pub async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    Path(notification_id): Path<i32>,
    Extension(current_user): Extension<User>,
) -> Result<Json<NotificationDTO>, AppError> {
    // notifiche di altri utenti: 404, come se non esistessero
    let notification = state
        .notifications
        .mark_read(notification_id, current_user.user_id)
        .await?;
    Ok(Json(NotificationDTO::from(notification)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn mark_all_notifications_read(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<MarkedReadDTO>, AppError> {
    let updated = state.notifications.mark_all_read(current_user.user_id).await?;
    Ok(Json(MarkedReadDTO { updated }))
}
