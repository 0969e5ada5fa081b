//! MySqlReservationGateway - Operazioni atomiche sulle prenotazioni
//!
//! Ogni scrittura apre una transazione e blocca la riga dell'impianto con
//! `SELECT ... FOR UPDATE`: tutte le scritture sul calendario di uno stesso
//! impianto sono quindi serializzate, e il controllo dei conflitti vede solo
//! dati già committati.

use super::traits::ReservationGateway;
use crate::dtos::CreateReservationDTO;
use crate::entities::{Reservation, ReservationStatus};
use crate::workflow::lifecycle::{
    StatusTransition, Verdict, apply_cancellation, apply_transition, ensure_pending,
};
use crate::workflow::{ReservationError, ReservationResult};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use sqlx::{MySqlConnection, MySqlPool};
use tracing::{debug, instrument, warn};

macro_rules! select_reservations {
    ($tail:literal) => {
        concat!(
            r#"
            SELECT
                reservation_id,
                facility_id,
                organizer_id,
                start_time,
                end_time,
                sport_type,
                max_participants,
                description,
                status,
                validated_by,
                validated_at,
                rejection_reason,
                lock_expires_at,
                created_at,
                updated_at
            FROM reservations
            "#,
            $tail
        )
    };
}

// approved, oppure pending con lock non scaduto
const COUNT_BLOCKING_OVERLAPS: &str = r#"
    SELECT COUNT(*)
    FROM reservations
    WHERE facility_id = ?
      AND start_time < ?
      AND ? < end_time
      AND (? IS NULL OR reservation_id <> ?)
      AND (status = 'approved' OR (status = 'pending' AND lock_expires_at > ?))
"#;

async fn count_blocking_overlaps(
    conn: &mut MySqlConnection,
    facility_id: i32,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<i32>,
    now: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(COUNT_BLOCKING_OVERLAPS)
        .bind(facility_id)
        .bind(end)
        .bind(start)
        .bind(exclude)
        .bind(exclude)
        .bind(now)
        .fetch_one(conn)
        .await
}

async fn lock_facility(conn: &mut MySqlConnection, facility_id: i32) -> ReservationResult<()> {
    let locked: Option<i32> =
        sqlx::query_scalar("SELECT facility_id FROM facilities WHERE facility_id = ? FOR UPDATE")
            .bind(facility_id)
            .fetch_optional(conn)
            .await?;
    locked.map(|_| ()).ok_or(ReservationError::NotFound("facility"))
}

// RESERVATION GATEWAY
pub struct MySqlReservationGateway {
    connection_pool: MySqlPool,
}

impl MySqlReservationGateway {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    async fn write_transition(
        conn: &mut MySqlConnection,
        reservation: &Reservation,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE reservations
            SET status = ?,
                validated_by = ?,
                validated_at = ?,
                rejection_reason = ?,
                lock_expires_at = NULL,
                updated_at = ?
            WHERE reservation_id = ? AND status = 'pending'
            "#,
        )
        .bind(reservation.status)
        .bind(reservation.validated_by)
        .bind(reservation.validated_at)
        .bind(&reservation.rejection_reason)
        .bind(reservation.updated_at)
        .bind(reservation.reservation_id)
        .execute(conn)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ReservationGateway for MySqlReservationGateway {
    #[instrument(skip(self, data), fields(facility_id = data.facility_id))]
    async fn create_reservation_with_lock(
        &self,
        data: &CreateReservationDTO,
        lock_duration: TimeDelta,
        now: DateTime<Utc>,
    ) -> ReservationResult<Reservation> {
        let mut tx = self.connection_pool.begin().await?;

        lock_facility(&mut tx, data.facility_id).await?;

        let overlapping = count_blocking_overlaps(
            &mut tx,
            data.facility_id,
            data.start_time,
            data.end_time,
            None,
            now,
        )
        .await?;
        if overlapping > 0 {
            debug!("{} blocking reservations overlap the window", overlapping);
            // rollback on drop
            return Err(ReservationError::Conflict);
        }

        let lock_expires_at = now + lock_duration;
        let result = sqlx::query(
            r#"
            INSERT INTO reservations (
                facility_id, organizer_id, start_time, end_time, sport_type,
                max_participants, description, status, lock_expires_at, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, 'pending', ?, ?, ?)
            "#,
        )
        .bind(data.facility_id)
        .bind(data.organizer_id)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(&data.sport_type)
        .bind(data.max_participants)
        .bind(&data.description)
        .bind(lock_expires_at)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Reservation {
            reservation_id: result.last_insert_id() as i32,
            facility_id: data.facility_id,
            organizer_id: data.organizer_id,
            start_time: data.start_time,
            end_time: data.end_time,
            sport_type: data.sport_type.clone(),
            max_participants: data.max_participants,
            description: data.description.clone(),
            status: ReservationStatus::Pending,
            validated_by: None,
            validated_at: None,
            rejection_reason: None,
            lock_expires_at: Some(lock_expires_at),
            created_at: now,
            updated_at: now,
        })
    }

    #[instrument(skip(self, transition), fields(reservation_id = transition.reservation_id))]
    async fn update_reservation_status(
        &self,
        transition: &StatusTransition,
    ) -> ReservationResult<Reservation> {
        let mut tx = self.connection_pool.begin().await?;

        let facility_id: i32 =
            sqlx::query_scalar("SELECT facility_id FROM reservations WHERE reservation_id = ?")
                .bind(transition.reservation_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(ReservationError::NotFound("reservation"))?;

        // stesso ordine di lock della creazione: impianto, poi prenotazione
        lock_facility(&mut tx, facility_id).await?;

        let mut reservation =
            sqlx::query_as::<_, Reservation>(select_reservations!("WHERE reservation_id = ? FOR UPDATE"))
                .bind(transition.reservation_id)
                .fetch_one(&mut *tx)
                .await?;
        ensure_pending(reservation.status)?;

        if transition.verdict == Verdict::Approved {
            let overlapping = count_blocking_overlaps(
                &mut tx,
                reservation.facility_id,
                reservation.start_time,
                reservation.end_time,
                Some(reservation.reservation_id),
                transition.at,
            )
            .await?;
            if overlapping > 0 {
                warn!("Approval refused, {} blocking reservations overlap", overlapping);
                return Err(ReservationError::Conflict);
            }
        }

        apply_transition(&mut reservation, transition)?;
        Self::write_transition(&mut tx, &reservation).await?;
        tx.commit().await?;

        Ok(reservation)
    }

    #[instrument(skip(self))]
    async fn cancel_reservation(
        &self,
        reservation_id: i32,
        organizer_id: i32,
        now: DateTime<Utc>,
    ) -> ReservationResult<Reservation> {
        let mut tx = self.connection_pool.begin().await?;

        let mut reservation = sqlx::query_as::<_, Reservation>(select_reservations!(
            "WHERE reservation_id = ? AND organizer_id = ? FOR UPDATE"
        ))
        .bind(reservation_id)
        .bind(organizer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ReservationError::NotFound("reservation"))?;

        apply_cancellation(&mut reservation, now)?;

        sqlx::query(
            r#"
            UPDATE reservations
            SET status = ?, lock_expires_at = NULL, updated_at = ?
            WHERE reservation_id = ? AND status = 'pending'
            "#,
        )
        .bind(reservation.status)
        .bind(now)
        .bind(reservation_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(reservation)
    }

    async fn check_reservation_conflicts(
        &self,
        facility_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_reservation_id: Option<i32>,
        now: DateTime<Utc>,
    ) -> ReservationResult<bool> {
        let mut conn = self.connection_pool.acquire().await?;
        let overlapping =
            count_blocking_overlaps(&mut conn, facility_id, start, end, exclude_reservation_id, now)
                .await?;
        Ok(overlapping > 0)
    }

    async fn cleanup_expired_locks(&self, now: DateTime<Utc>) -> ReservationResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE reservations
            SET lock_expires_at = NULL, updated_at = ?
            WHERE status = 'pending'
              AND lock_expires_at IS NOT NULL
              AND lock_expires_at <= ?
            "#,
        )
        .bind(now)
        .bind(now)
        .execute(&self.connection_pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn read(&self, reservation_id: i32) -> ReservationResult<Option<Reservation>> {
        let reservation =
            sqlx::query_as::<_, Reservation>(select_reservations!("WHERE reservation_id = ?"))
                .bind(reservation_id)
                .fetch_optional(&self.connection_pool)
                .await?;
        Ok(reservation)
    }

    async fn find_by_organizer(&self, organizer_id: i32) -> ReservationResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(select_reservations!(
            "WHERE organizer_id = ? ORDER BY start_time ASC, reservation_id ASC"
        ))
        .bind(organizer_id)
        .fetch_all(&self.connection_pool)
        .await?;
        Ok(reservations)
    }

    async fn find_by_facility(&self, facility_id: i32) -> ReservationResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(select_reservations!(
            "WHERE facility_id = ? ORDER BY start_time ASC, reservation_id ASC"
        ))
        .bind(facility_id)
        .fetch_all(&self.connection_pool)
        .await?;
        Ok(reservations)
    }

    async fn find_pending(&self) -> ReservationResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(select_reservations!(
            "WHERE status = 'pending' ORDER BY start_time ASC, reservation_id ASC"
        ))
        .fetch_all(&self.connection_pool)
        .await?;
        Ok(reservations)
    }

    async fn find_all(&self) -> ReservationResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(select_reservations!(
            "ORDER BY start_time ASC, reservation_id ASC"
        ))
        .fetch_all(&self.connection_pool)
        .await?;
        Ok(reservations)
    }

    async fn find_approved_starting_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ReservationResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(select_reservations!(
            "WHERE status = 'approved' AND start_time > ? AND start_time <= ? ORDER BY start_time ASC"
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.connection_pool)
        .await?;
        Ok(reservations)
    }
}
