//! Errori del workflow di prenotazione

use crate::entities::ReservationStatus;
use thiserror::Error;

/// Local input violations, detected before any storage call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing sport type")]
    MissingSportType,
    #[error("end before start")]
    EndBeforeStart,
    #[error("reservation not in future")]
    NotInFuture,
    #[error("duration exceeds maximum")]
    DurationExceedsMaximum,
    #[error("participant count out of range")]
    ParticipantCountOutOfRange,
    #[error("missing rejection reason")]
    MissingRejectionReason,
    #[error("unsupported target status")]
    UnsupportedTargetStatus,
    #[error("reminder horizon out of range")]
    ReminderHorizonOutOfRange,
}

#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("overlapping reservation exists")]
    Conflict,

    #[error("invalid transition: reservation is already {current}")]
    InvalidTransition { current: ReservationStatus },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<sqlx::Error> for ReservationError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound("resource"),
            other => Self::Transport(other.to_string()),
        }
    }
}

pub type ReservationResult<T> = Result<T, ReservationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationError::MissingSportType.to_string(), "missing sport type");
        assert_eq!(ValidationError::EndBeforeStart.to_string(), "end before start");
        assert_eq!(ValidationError::NotInFuture.to_string(), "reservation not in future");
        assert_eq!(
            ValidationError::DurationExceedsMaximum.to_string(),
            "duration exceeds maximum"
        );
        assert_eq!(
            ValidationError::ParticipantCountOutOfRange.to_string(),
            "participant count out of range"
        );
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = ReservationError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, ReservationError::NotFound(_)));

        let err = ReservationError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, ReservationError::Transport(_)));
    }
}
