//! Statistiche per stato delle prenotazioni

use crate::entities::{Reservation, ReservationStatus};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReservationStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub cancelled: usize,
}

impl ReservationStats {
    pub fn from_reservations<'a, I>(reservations: I) -> Self
    where
        I: IntoIterator<Item = &'a Reservation>,
    {
        reservations
            .into_iter()
            .fold(Self::default(), |mut acc, r| {
                acc.total += 1;
                match r.status {
                    ReservationStatus::Pending => acc.pending += 1,
                    ReservationStatus::Approved => acc.approved += 1,
                    ReservationStatus::Rejected => acc.rejected += 1,
                    ReservationStatus::Cancelled => acc.cancelled += 1,
                }
                acc
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn with_status(id: i32, status: ReservationStatus) -> Reservation {
        let now = Utc::now();
        Reservation {
            reservation_id: id,
            facility_id: 1,
            organizer_id: 1,
            start_time: now + Duration::hours(id as i64),
            end_time: now + Duration::hours(id as i64 + 1),
            sport_type: "Basket".to_string(),
            max_participants: 10,
            description: None,
            status,
            validated_by: None,
            validated_at: None,
            rejection_reason: None,
            lock_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_set_is_all_zero() {
        let stats = ReservationStats::from_reservations(&Vec::<Reservation>::new());
        assert_eq!(stats, ReservationStats::default());
    }

    #[test]
    fn test_counts_sum_to_total() {
        let statuses = [
            ReservationStatus::Pending,
            ReservationStatus::Approved,
            ReservationStatus::Approved,
            ReservationStatus::Rejected,
            ReservationStatus::Cancelled,
            ReservationStatus::Pending,
            ReservationStatus::Approved,
        ];
        let reservations: Vec<_> = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| with_status(i as i32, *s))
            .collect();

        let stats = ReservationStats::from_reservations(&reservations);
        assert_eq!(stats.total, 7);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.approved, 3);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.cancelled, 1);
        assert_eq!(
            stats.pending + stats.approved + stats.rejected + stats.cancelled,
            stats.total
        );
    }
}
