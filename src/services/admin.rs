//! Admin services - Validazione e manutenzione delle prenotazioni
//!
//! Tutte le rotte sono dietro `admin_middleware`; l'admin corrente è il validatore.

use crate::core::{AppError, AppState};
use crate::dtos::{
    AutoValidationDTO, BatchValidationDTO, CleanupDTO, RemindersDTO, ReservationDTO,
    StatusUpdateDTO,
};
use crate::entities::User;
use crate::workflow::{ReservationError, ReservationStats, ValidationError, Verdict};
use axum::{
    Extension,
    extract::{Json, Path, State},
};
use chrono::{TimeDelta, Utc};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

#[instrument(skip(state))]
pub async fn list_pending_reservations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ReservationDTO>>, AppError> {
    let pending = state.reservations.list_pending().await?;
    info!("{} reservations awaiting validation", pending.len());
    Ok(Json(pending.into_iter().map(ReservationDTO::from).collect()))
}

#[instrument(skip(state))]
pub async fn all_reservation_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReservationStats>, AppError> {
    Ok(Json(state.reservations.stats(None).await?))
}

#[instrument(skip(state, current_user, body), fields(admin_id = %current_user.user_id, reservation_id = %reservation_id, status = %body.status))]
pub async fn update_reservation_status(
    State(state): State<Arc<AppState>>,
    Path(reservation_id): Path<i32>,
    Extension(current_user): Extension<User>,
    Json(body): Json<StatusUpdateDTO>,
) -> Result<Json<ReservationDTO>, AppError> {
    // 1. Solo approved/rejected; un motivo vuoto diventa quello di default
    // 2. Transizione atomica (pending -> stato finale), lock rimosso
    // 3. Notifica status_change all'organizzatore
    body.validate()?;
    let verdict =
        Verdict::from_request(body.status, body.rejection_reason).map_err(ReservationError::from)?;

    let updated = state
        .reservations
        .set_status(reservation_id, verdict, current_user.user_id, Utc::now())
        .await?;
    Ok(Json(ReservationDTO::from(updated)))
}

#[instrument(skip(state, current_user), fields(admin_id = %current_user.user_id, reservation_id = %reservation_id))]
pub async fn auto_validate_reservation(
    State(state): State<Arc<AppState>>,
    Path(reservation_id): Path<i32>,
    Extension(current_user): Extension<User>,
) -> Result<Json<AutoValidationDTO>, AppError> {
    let result = state
        .reservations
        .auto_validate_reservation(reservation_id, current_user.user_id, Utc::now())
        .await?;
    Ok(Json(AutoValidationDTO::from(&result)))
}

#[instrument(skip(state, current_user), fields(admin_id = %current_user.user_id))]
pub async fn auto_validate_pending(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<BatchValidationDTO>, AppError> {
    let report = state
        .reservations
        .auto_validate_pending(current_user.user_id, Utc::now())
        .await?;
    Ok(Json(report))
}

#[instrument(skip(state))]
pub async fn cleanup_expired_locks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CleanupDTO>, AppError> {
    let reclaimed = state.reservations.cleanup_expired_locks(Utc::now()).await?;
    Ok(Json(CleanupDTO { reclaimed }))
}

#[instrument(skip(state))]
pub async fn send_reminders(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RemindersDTO>, AppError> {
    let horizon = TimeDelta::try_hours(state.reminder_horizon_hours)
        .ok_or(ReservationError::from(ValidationError::ReminderHorizonOutOfRange))?;
    let sent = state
        .reservations
        .send_reminders(Utc::now(), horizon)
        .await?;
    Ok(Json(RemindersDTO { sent }))
}
