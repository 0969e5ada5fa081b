//! Request builder - Validazione e normalizzazione della richiesta di prenotazione
//!
//! Tutti i controlli sono locali: una richiesta che fallisce qui non raggiunge mai lo storage.

use super::error::ValidationError;
use crate::dtos::{CreateReservationDTO, ReservationRequestDTO};
use chrono::{DateTime, TimeDelta, Utc};

pub const LOCK_DURATION_MINUTES: i64 = 10;
pub const MAX_DURATION_HOURS: i64 = 4;
pub const MIN_PARTICIPANTS: i32 = 1;
pub const MAX_PARTICIPANTS: i32 = 50;
pub const DEFAULT_PARTICIPANTS: i32 = 10;

pub fn lock_duration() -> TimeDelta {
    TimeDelta::minutes(LOCK_DURATION_MINUTES)
}

pub fn max_duration() -> TimeDelta {
    TimeDelta::hours(MAX_DURATION_HOURS)
}

/// Raw user input, organizer taken from the authenticated caller
#[derive(Debug, Clone)]
pub struct ReservationRequest {
    pub facility_id: i32,
    pub organizer_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub sport_type: String,
    pub description: Option<String>,
    /// Wider than the stored column so oversized values reach the range check
    pub max_participants: Option<i64>,
}

impl ReservationRequest {
    pub fn from_dto(dto: ReservationRequestDTO, organizer_id: i32) -> Self {
        Self {
            facility_id: dto.facility_id,
            organizer_id,
            start_time: dto.start_time,
            end_time: dto.end_time,
            sport_type: dto.sport_type,
            description: dto.description,
            max_participants: dto.max_participants,
        }
    }

    /// Checks are applied in a fixed order and the first failure is returned.
    pub fn validate(self, now: DateTime<Utc>) -> Result<CreateReservationDTO, ValidationError> {
        let sport_type = self.sport_type.trim();
        if sport_type.is_empty() {
            return Err(ValidationError::MissingSportType);
        }
        if self.start_time >= self.end_time {
            return Err(ValidationError::EndBeforeStart);
        }
        if self.start_time <= now {
            return Err(ValidationError::NotInFuture);
        }
        if self.end_time - self.start_time > max_duration() {
            return Err(ValidationError::DurationExceedsMaximum);
        }

        let max_participants = match self.max_participants {
            None => DEFAULT_PARTICIPANTS,
            Some(count) => i32::try_from(count)
                .ok()
                .filter(|c| (MIN_PARTICIPANTS..=MAX_PARTICIPANTS).contains(c))
                .ok_or(ValidationError::ParticipantCountOutOfRange)?,
        };

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(CreateReservationDTO {
            facility_id: self.facility_id,
            organizer_id: self.organizer_id,
            start_time: self.start_time,
            end_time: self.end_time,
            sport_type: sport_type.to_string(),
            description,
            max_participants,
        })
    }
}
