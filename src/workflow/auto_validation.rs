//! Auto-validation - Valutazione automatica delle prenotazioni pending
//!
//! Regole ordinate, la prima che fallisce decide il rifiuto:
//! 1. inizio nel futuro
//! 2. durata massima
//! 3. nessun conflitto sull'impianto

use super::error::ReservationResult;
use super::lifecycle::Verdict;
use super::request::max_duration;
use crate::entities::Reservation;
use chrono::{DateTime, Utc};
use std::future::Future;

pub const REASON_NOT_IN_FUTURE: &str = "La réservation doit être dans le futur";
pub const REASON_DURATION_EXCEEDED: &str = "La durée maximale autorisée est de 4 heures";
pub const REASON_CONFLICT: &str = "Conflit avec une autre réservation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject(&'static str),
}

impl Decision {
    pub fn verdict(&self) -> Verdict {
        match self {
            Decision::Approve => Verdict::Approved,
            Decision::Reject(reason) => Verdict::Rejected {
                reason: (*reason).to_string(),
            },
        }
    }
}

/// Rules that need no storage access
pub fn check_local_rules(reservation: &Reservation, now: DateTime<Utc>) -> Option<&'static str> {
    if reservation.start_time <= now {
        return Some(REASON_NOT_IN_FUTURE);
    }
    if reservation.end_time - reservation.start_time > max_duration() {
        return Some(REASON_DURATION_EXCEEDED);
    }
    None
}

/// Evaluates `reservation`. `has_conflict` is only awaited when the local rules pass.
pub async fn evaluate<F, Fut>(
    reservation: &Reservation,
    now: DateTime<Utc>,
    has_conflict: F,
) -> ReservationResult<Decision>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ReservationResult<bool>>,
{
    if let Some(reason) = check_local_rules(reservation, now) {
        return Ok(Decision::Reject(reason));
    }
    if has_conflict().await? {
        return Ok(Decision::Reject(REASON_CONFLICT));
    }
    Ok(Decision::Approve)
}
