//! Reservation entity - Entità prenotazione di un impianto sportivo

use super::enums::ReservationStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Reservation {
    pub reservation_id: i32,
    pub facility_id: i32,  // impianto (directory esterna)
    pub organizer_id: i32, // utente che ha richiesto la prenotazione
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub sport_type: String,
    pub max_participants: i32,
    pub description: Option<String>,
    pub status: ReservationStatus,
    // metadati di validazione, tutti NULL finché non avviene una transizione
    pub validated_by: Option<i32>,
    pub validated_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    // soft lock: presente solo mentre lo stato è pending
    pub lock_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Half-open overlap test on `[start_time, end_time)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time < end && start < self.end_time
    }

    /// Whether this reservation holds its slot at `now`: approved, or pending
    /// with a soft lock that has not expired yet.
    pub fn is_blocking(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            ReservationStatus::Approved => true,
            ReservationStatus::Pending => self.lock_expires_at.is_some_and(|exp| exp > now),
            _ => false,
        }
    }

    pub fn has_expired_lock(&self, now: DateTime<Utc>) -> bool {
        self.status == ReservationStatus::Pending
            && self.lock_expires_at.is_some_and(|exp| exp <= now)
    }
}
