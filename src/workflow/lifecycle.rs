//! Macchina a stati della prenotazione
//!
//! `pending` → `approved` | `rejected` | `cancelled`. Gli stati finali non hanno
//! transizioni in uscita.

use super::error::{ReservationError, ReservationResult, ValidationError};
use crate::entities::{Reservation, ReservationStatus};
use chrono::{DateTime, Utc};

/// Default used by the manual rejection endpoint when the admin leaves the reason empty.
pub const DEFAULT_REJECTION_REASON: &str = "Rejected by administrator";

/// Outcome chosen by a validation authority
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Approved,
    Rejected { reason: String },
}

impl Verdict {
    pub fn reject(reason: impl Into<String>) -> Result<Self, ValidationError> {
        let reason = reason.into().trim().to_string();
        if reason.is_empty() {
            return Err(ValidationError::MissingRejectionReason);
        }
        Ok(Verdict::Rejected { reason })
    }

    /// Builds a verdict from an admin request. A blank rejection reason falls
    /// back to [`DEFAULT_REJECTION_REASON`].
    pub fn from_request(
        status: ReservationStatus,
        rejection_reason: Option<String>,
    ) -> Result<Self, ValidationError> {
        match status {
            ReservationStatus::Approved => Ok(Verdict::Approved),
            ReservationStatus::Rejected => {
                let reason = rejection_reason
                    .filter(|r| !r.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string());
                Verdict::reject(reason)
            }
            ReservationStatus::Pending | ReservationStatus::Cancelled => {
                Err(ValidationError::UnsupportedTargetStatus)
            }
        }
    }

    pub fn status(&self) -> ReservationStatus {
        match self {
            Verdict::Approved => ReservationStatus::Approved,
            Verdict::Rejected { .. } => ReservationStatus::Rejected,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Verdict::Approved => None,
            Verdict::Rejected { reason } => Some(reason),
        }
    }
}

/// A requested status change, with the explicit validator identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTransition {
    pub reservation_id: i32,
    pub validator_id: i32,
    pub verdict: Verdict,
    pub at: DateTime<Utc>,
}

pub fn ensure_pending(current: ReservationStatus) -> ReservationResult<()> {
    if current.is_terminal() {
        return Err(ReservationError::InvalidTransition { current });
    }
    Ok(())
}

/// Applies `transition` to a reservation already loaded under the store's lock.
/// Leaves the reservation untouched on error.
pub fn apply_transition(
    reservation: &mut Reservation,
    transition: &StatusTransition,
) -> ReservationResult<()> {
    ensure_pending(reservation.status)?;

    reservation.status = transition.verdict.status();
    reservation.validated_by = Some(transition.validator_id);
    reservation.validated_at = Some(transition.at);
    reservation.rejection_reason = transition.verdict.reason().map(str::to_string);
    reservation.lock_expires_at = None;
    reservation.updated_at = transition.at;
    Ok(())
}

pub fn apply_cancellation(reservation: &mut Reservation, at: DateTime<Utc>) -> ReservationResult<()> {
    ensure_pending(reservation.status)?;

    reservation.status = ReservationStatus::Cancelled;
    reservation.lock_expires_at = None;
    reservation.updated_at = at;
    Ok(())
}
