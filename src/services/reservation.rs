//! Reservation services - Endpoint per organizzatori e consultazione calendario

use crate::core::{AppError, AppState};
use crate::dtos::{
    ConflictDTO, ConflictQuery, ReservationDTO, ReservationDetailsDTO, ReservationRequestDTO,
};
use crate::entities::User;
use crate::workflow::{ReservationRequest, ReservationStats};
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, facility_id = body.facility_id))]
pub async fn create_reservation(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>, // ottenuto dall'autenticazione tramite token jwt
    Json(body): Json<ReservationRequestDTO>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Creating reservation");
    // 1. Validare la lunghezza dei campi testuali (validator)
    // 2. L'organizzatore è sempre l'utente corrente, mai un campo del body
    // 3. Regole di dominio + creazione atomica con soft lock + notifica di conferma
    body.validate()?;

    let request = ReservationRequest::from_dto(body, current_user.user_id);
    let reservation = state
        .reservations
        .build_and_submit(request, Utc::now())
        .await?;

    info!(reservation_id = reservation.reservation_id, "Reservation submitted");
    Ok((StatusCode::CREATED, Json(ReservationDTO::from(reservation))))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_my_reservations(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<ReservationDTO>>, AppError> {
    let reservations = state
        .reservations
        .list_by_organizer(current_user.user_id)
        .await?;
    debug!("Found {} reservations", reservations.len());
    Ok(Json(
        reservations.into_iter().map(ReservationDTO::from).collect(),
    ))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn my_reservation_stats(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<ReservationStats>, AppError> {
    let stats = state.reservations.stats(Some(current_user.user_id)).await?;
    Ok(Json(stats))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, reservation_id = %reservation_id))]
pub async fn get_reservation(
    State(state): State<Arc<AppState>>,
    Path(reservation_id): Path<i32>,
    Extension(current_user): Extension<User>,
) -> Result<Json<ReservationDetailsDTO>, AppError> {
    // 1. Costruire la proiezione prenotazione + impianto + organizzatore
    // 2. Visibile solo all'organizzatore o a un admin
    let details = state.reservations.details(reservation_id).await?;

    if details.reservation.organizer_id != current_user.user_id && !current_user.is_admin() {
        warn!("User is neither organizer nor admin");
        return Err(AppError::forbidden("You cannot view this reservation"));
    }
    Ok(Json(details))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, reservation_id = %reservation_id))]
pub async fn cancel_reservation(
    State(state): State<Arc<AppState>>,
    Path(reservation_id): Path<i32>,
    Extension(current_user): Extension<User>,
) -> Result<Json<ReservationDTO>, AppError> {
    let cancelled = state
        .reservations
        .cancel(reservation_id, current_user.user_id, Utc::now())
        .await?;
    Ok(Json(ReservationDTO::from(cancelled)))
}

#[instrument(skip(state), fields(facility_id = %facility_id))]
pub async fn list_facility_reservations(
    State(state): State<Arc<AppState>>,
    Path(facility_id): Path<i32>,
) -> Result<Json<Vec<ReservationDTO>>, AppError> {
    let reservations = state.reservations.list_by_facility(facility_id).await?;
    Ok(Json(
        reservations.into_iter().map(ReservationDTO::from).collect(),
    ))
}

#[instrument(skip(state, params), fields(facility_id = %facility_id))]
pub async fn check_facility_conflicts(
    State(state): State<Arc<AppState>>,
    Path(facility_id): Path<i32>,
    Query(params): Query<ConflictQuery>, // ?start=...&end=...&exclude=...
) -> Result<Json<ConflictDTO>, AppError> {
    let conflict = state
        .reservations
        .check_conflicts(facility_id, params.start, params.end, params.exclude, Utc::now())
        .await?;
    debug!("Conflict: {}", conflict);
    Ok(Json(ConflictDTO { conflict }))
}
