//! Reservation DTOs - Data Transfer Objects per prenotazioni

use crate::dtos::{FacilityDTO, UserDTO};
use crate::entities::{Reservation, ReservationStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Corpo della richiesta di prenotazione inviata dal client.
/// L'organizzatore non è nel body: viene preso dal token JWT.
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct ReservationRequestDTO {
    pub facility_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[validate(length(max = 100, message = "Sport type must be at most 100 characters"))]
    pub sport_type: String,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    pub max_participants: Option<i64>,
}

/// DTO per creare una nuova prenotazione (già validato, senza id, stato e lock)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CreateReservationDTO {
    pub facility_id: i32,
    pub organizer_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub sport_type: String,
    pub description: Option<String>,
    pub max_participants: i32,
}

/// Struct per gestire io col client
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReservationDTO {
    pub reservation_id: i32,
    pub facility_id: i32,
    pub organizer_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub sport_type: String,
    pub max_participants: i32,
    pub description: Option<String>,
    pub status: ReservationStatus,
    pub validated_by: Option<i32>,
    pub validated_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub lock_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationDTO {
    fn from(value: Reservation) -> Self {
        Self {
            reservation_id: value.reservation_id,
            facility_id: value.facility_id,
            organizer_id: value.organizer_id,
            start_time: value.start_time,
            end_time: value.end_time,
            sport_type: value.sport_type,
            max_participants: value.max_participants,
            description: value.description,
            status: value.status,
            validated_by: value.validated_by,
            validated_at: value.validated_at,
            rejection_reason: value.rejection_reason,
            lock_expires_at: value.lock_expires_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Proiezione in lettura: prenotazione + impianto + organizzatore, assemblata
/// al momento della richiesta invece di essere salvata denormalizzata
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReservationDetailsDTO {
    #[serde(flatten)]
    pub reservation: ReservationDTO,
    pub facility: Option<FacilityDTO>,
    pub organizer: Option<UserDTO>,
}

/// Body di PATCH /admin/reservations/{id}/status
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct StatusUpdateDTO {
    pub status: ReservationStatus,
    #[validate(length(max = 500, message = "Rejection reason must be at most 500 characters"))]
    pub rejection_reason: Option<String>,
}

/// Esito della validazione automatica di una singola prenotazione
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AutoValidationDTO {
    pub reservation_id: i32,
    pub status: Option<ReservationStatus>, // None se la transizione è fallita
    pub reason: Option<String>,
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct BatchValidationDTO {
    pub processed: usize,
    pub approved: usize,
    pub rejected: usize,
    pub failed: usize,
    pub outcomes: Vec<AutoValidationDTO>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ConflictDTO {
    pub conflict: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CleanupDTO {
    pub reclaimed: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RemindersDTO {
    pub sent: usize,
}
