//! Common repository traits
//!
//! This module defines the storage interfaces the reservation workflow depends on.
//! Every backend (MySQL, in-memory) implements all three; the workflow only ever
//! sees them as trait objects.

use crate::dtos::{CreateNotificationDTO, CreateReservationDTO};
use crate::entities::{Facility, NotificationKind, Reservation, ReservationNotification, User};
use crate::workflow::ReservationResult;
use crate::workflow::lifecycle::StatusTransition;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};

/// Atomic reservation operations (the "gateway").
///
/// Conflict-check-and-insert and conditional status updates are single calls:
/// callers must never emulate them with a separate check followed by a write.
#[async_trait]
pub trait ReservationGateway: Send + Sync {
    /// Creates a `pending` reservation holding a soft lock of `lock_duration`
    ///
    /// # Returns
    /// * `Ok(Reservation)` - Created reservation with ID assigned by the store
    /// * `Err(ReservationError::Conflict)` - A blocking reservation overlaps the window
    /// * `Err(ReservationError::NotFound)` - Unknown facility
    async fn create_reservation_with_lock(
        &self,
        data: &CreateReservationDTO,
        lock_duration: TimeDelta,
        now: DateTime<Utc>,
    ) -> ReservationResult<Reservation>;

    /// Moves a `pending` reservation to `approved` or `rejected`, clearing the lock
    ///
    /// # Returns
    /// * `Ok(Reservation)` - Updated reservation
    /// * `Err(ReservationError::InvalidTransition)` - Reservation is no longer pending
    /// * `Err(ReservationError::Conflict)` - Approval would overlap a blocking reservation
    async fn update_reservation_status(
        &self,
        transition: &StatusTransition,
    ) -> ReservationResult<Reservation>;

    /// Moves a `pending` reservation owned by `organizer_id` to `cancelled`
    async fn cancel_reservation(
        &self,
        reservation_id: i32,
        organizer_id: i32,
        now: DateTime<Utc>,
    ) -> ReservationResult<Reservation>;

    /// Whether a blocking reservation on `facility_id` overlaps `[start, end)`
    async fn check_reservation_conflicts(
        &self,
        facility_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_reservation_id: Option<i32>,
        now: DateTime<Utc>,
    ) -> ReservationResult<bool>;

    /// Clears every expired soft lock on pending reservations
    ///
    /// # Returns
    /// * `Ok(n)` - Number of locks cleared by this call (already-cleared locks are not counted)
    async fn cleanup_expired_locks(&self, now: DateTime<Utc>) -> ReservationResult<u64>;

    async fn read(&self, reservation_id: i32) -> ReservationResult<Option<Reservation>>;

    async fn find_by_organizer(&self, organizer_id: i32) -> ReservationResult<Vec<Reservation>>;

    async fn find_by_facility(&self, facility_id: i32) -> ReservationResult<Vec<Reservation>>;

    async fn find_pending(&self) -> ReservationResult<Vec<Reservation>>;

    async fn find_all(&self) -> ReservationResult<Vec<Reservation>>;

    /// Approved reservations whose start lies in `(from, to]`
    async fn find_approved_starting_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ReservationResult<Vec<Reservation>>;
}

/// Notification records owned by their recipient
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create(
        &self,
        data: &CreateNotificationDTO,
        now: DateTime<Utc>,
    ) -> ReservationResult<ReservationNotification>;

    /// All notifications for `recipient_id`, newest first
    async fn find_by_recipient(
        &self,
        recipient_id: i32,
    ) -> ReservationResult<Vec<ReservationNotification>>;

    async fn unread_count(&self, recipient_id: i32) -> ReservationResult<u64>;

    /// Sets the read flag. Fails with `NotFound` when the notification belongs to someone else.
    async fn mark_read(
        &self,
        notification_id: i32,
        recipient_id: i32,
    ) -> ReservationResult<ReservationNotification>;

    async fn mark_all_read(&self, recipient_id: i32) -> ReservationResult<u64>;

    async fn exists_for(
        &self,
        reservation_id: i32,
        kind: NotificationKind,
    ) -> ReservationResult<bool>;
}

/// Read-only lookups into the facility and user directories
#[async_trait]
pub trait Directory: Send + Sync {
    async fn find_facility(&self, facility_id: i32) -> ReservationResult<Option<Facility>>;

    async fn find_user(&self, user_id: i32) -> ReservationResult<Option<User>>;
}
