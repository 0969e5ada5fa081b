//! InMemoryStore - Backend in memoria per sviluppo e test
//!
//! Tutte le operazioni avvengono sotto un unico mutex asincrono, quindi
//! check-and-insert e transizioni condizionali sono atomici come nel backend MySQL.

use super::traits::{Directory, NotificationStore, ReservationGateway};
use crate::dtos::{CreateNotificationDTO, CreateReservationDTO};
use crate::entities::{
    Facility, NotificationKind, Reservation, ReservationNotification, ReservationStatus, User,
};
use crate::workflow::lifecycle::{
    StatusTransition, Verdict, apply_cancellation, apply_transition, ensure_pending,
};
use crate::workflow::{ReservationError, ReservationResult};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Default)]
struct Inner {
    reservations: BTreeMap<i32, Reservation>,
    notifications: BTreeMap<i32, ReservationNotification>,
    facilities: HashMap<i32, Facility>,
    users: HashMap<i32, User>,
    last_reservation_id: i32,
    last_notification_id: i32,
}

impl Inner {
    fn has_blocking_overlap(
        &self,
        facility_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<i32>,
        now: DateTime<Utc>,
    ) -> bool {
        self.reservations.values().any(|r| {
            r.facility_id == facility_id
                && Some(r.reservation_id) != exclude
                && r.is_blocking(now)
                && r.overlaps(start, end)
        })
    }

    fn sorted<F>(&self, filter: F) -> Vec<Reservation>
    where
        F: Fn(&Reservation) -> bool,
    {
        let mut out: Vec<Reservation> = self
            .reservations
            .values()
            .filter(|r| filter(r))
            .cloned()
            .collect();
        out.sort_by_key(|r| (r.start_time, r.reservation_id));
        out
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_facility(&self, facility: Facility) {
        let mut inner = self.inner.lock().await;
        inner.facilities.insert(facility.facility_id, facility);
    }

    pub async fn insert_user(&self, user: User) {
        let mut inner = self.inner.lock().await;
        inner.users.insert(user.user_id, user);
    }

    /// Stores a reservation as-is, bypassing every check. Used to seed
    /// states the workflow cannot reach on its own (past windows, expired locks).
    pub async fn insert_reservation(&self, reservation: Reservation) -> i32 {
        let mut inner = self.inner.lock().await;
        let id = reservation.reservation_id;
        inner.last_reservation_id = inner.last_reservation_id.max(id);
        inner.reservations.insert(id, reservation);
        id
    }
}

#[async_trait]
impl ReservationGateway for InMemoryStore {
    async fn create_reservation_with_lock(
        &self,
        data: &CreateReservationDTO,
        lock_duration: TimeDelta,
        now: DateTime<Utc>,
    ) -> ReservationResult<Reservation> {
        let mut inner = self.inner.lock().await;

        if !inner.facilities.contains_key(&data.facility_id) {
            return Err(ReservationError::NotFound("facility"));
        }
        if inner.has_blocking_overlap(data.facility_id, data.start_time, data.end_time, None, now) {
            debug!("Overlap on facility {}", data.facility_id);
            return Err(ReservationError::Conflict);
        }

        inner.last_reservation_id += 1;
        let reservation = Reservation {
            reservation_id: inner.last_reservation_id,
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
            lock_expires_at: Some(now + lock_duration),
            created_at: now,
            updated_at: now,
        };
        inner
            .reservations
            .insert(reservation.reservation_id, reservation.clone());
        Ok(reservation)
    }

    async fn update_reservation_status(
        &self,
        transition: &StatusTransition,
    ) -> ReservationResult<Reservation> {
        let mut inner = self.inner.lock().await;

        let current = inner
            .reservations
            .get(&transition.reservation_id)
            .ok_or(ReservationError::NotFound("reservation"))?;
        ensure_pending(current.status)?;

        if transition.verdict == Verdict::Approved
            && inner.has_blocking_overlap(
                current.facility_id,
                current.start_time,
                current.end_time,
                Some(current.reservation_id),
                transition.at,
            )
        {
            return Err(ReservationError::Conflict);
        }

        let reservation = inner
            .reservations
            .get_mut(&transition.reservation_id)
            .ok_or(ReservationError::NotFound("reservation"))?;
        apply_transition(reservation, transition)?;
        Ok(reservation.clone())
    }

    async fn cancel_reservation(
        &self,
        reservation_id: i32,
        organizer_id: i32,
        now: DateTime<Utc>,
    ) -> ReservationResult<Reservation> {
        let mut inner = self.inner.lock().await;
        let reservation = inner
            .reservations
            .get_mut(&reservation_id)
            .filter(|r| r.organizer_id == organizer_id)
            .ok_or(ReservationError::NotFound("reservation"))?;
        apply_cancellation(reservation, now)?;
        Ok(reservation.clone())
    }

    async fn check_reservation_conflicts(
        &self,
        facility_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_reservation_id: Option<i32>,
        now: DateTime<Utc>,
    ) -> ReservationResult<bool> {
        let inner = self.inner.lock().await;
        Ok(inner.has_blocking_overlap(facility_id, start, end, exclude_reservation_id, now))
    }

    async fn cleanup_expired_locks(&self, now: DateTime<Utc>) -> ReservationResult<u64> {
        let mut inner = self.inner.lock().await;
        let mut reclaimed = 0;
        for reservation in inner.reservations.values_mut() {
            if reservation.has_expired_lock(now) {
                reservation.lock_expires_at = None;
                reservation.updated_at = now;
                reclaimed += 1;
            }
        }
        Ok(reclaimed)
    }

    async fn read(&self, reservation_id: i32) -> ReservationResult<Option<Reservation>> {
        let inner = self.inner.lock().await;
        Ok(inner.reservations.get(&reservation_id).cloned())
    }

    async fn find_by_organizer(&self, organizer_id: i32) -> ReservationResult<Vec<Reservation>> {
        let inner = self.inner.lock().await;
        Ok(inner.sorted(|r| r.organizer_id == organizer_id))
    }

    async fn find_by_facility(&self, facility_id: i32) -> ReservationResult<Vec<Reservation>> {
        let inner = self.inner.lock().await;
        Ok(inner.sorted(|r| r.facility_id == facility_id))
    }

    async fn find_pending(&self) -> ReservationResult<Vec<Reservation>> {
        let inner = self.inner.lock().await;
        Ok(inner.sorted(|r| r.status == ReservationStatus::Pending))
    }

    async fn find_all(&self) -> ReservationResult<Vec<Reservation>> {
        let inner = self.inner.lock().await;
        Ok(inner.sorted(|_| true))
    }

    async fn find_approved_starting_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ReservationResult<Vec<Reservation>> {
        let inner = self.inner.lock().await;
        Ok(inner.sorted(|r| {
            r.status == ReservationStatus::Approved && r.start_time > from && r.start_time <= to
        }))
    }
}

#[async_trait]
impl NotificationStore for InMemoryStore {
    async fn create(
        &self,
        data: &CreateNotificationDTO,
        now: DateTime<Utc>,
    ) -> ReservationResult<ReservationNotification> {
        let mut inner = self.inner.lock().await;
        inner.last_notification_id += 1;
        let notification = ReservationNotification {
            notification_id: inner.last_notification_id,
            reservation_id: data.reservation_id,
            recipient_id: data.recipient_id,
            kind: data.kind,
            title: data.title.clone(),
            message: data.message.clone(),
            is_read: false,
            sent_at: now,
        };
        inner
            .notifications
            .insert(notification.notification_id, notification.clone());
        Ok(notification)
    }

    async fn find_by_recipient(
        &self,
        recipient_id: i32,
    ) -> ReservationResult<Vec<ReservationNotification>> {
        let inner = self.inner.lock().await;
        let mut out: Vec<ReservationNotification> = inner
            .notifications
            .values()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            b.sent_at
                .cmp(&a.sent_at)
                .then(b.notification_id.cmp(&a.notification_id))
        });
        Ok(out)
    }

    async fn unread_count(&self, recipient_id: i32) -> ReservationResult<u64> {
        let inner = self.inner.lock().await;
        Ok(inner
            .notifications
            .values()
            .filter(|n| n.recipient_id == recipient_id && !n.is_read)
            .count() as u64)
    }

    async fn mark_read(
        &self,
        notification_id: i32,
        recipient_id: i32,
    ) -> ReservationResult<ReservationNotification> {
        let mut inner = self.inner.lock().await;
        let notification = inner
            .notifications
            .get_mut(&notification_id)
            .filter(|n| n.recipient_id == recipient_id)
            .ok_or(ReservationError::NotFound("notification"))?;
        notification.is_read = true;
        Ok(notification.clone())
    }

    async fn mark_all_read(&self, recipient_id: i32) -> ReservationResult<u64> {
        let mut inner = self.inner.lock().await;
        let mut updated = 0;
        for n in inner.notifications.values_mut() {
            if n.recipient_id == recipient_id && !n.is_read {
                n.is_read = true;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn exists_for(
        &self,
        reservation_id: i32,
        kind: NotificationKind,
    ) -> ReservationResult<bool> {
        let inner = self.inner.lock().await;
        Ok(inner
            .notifications
            .values()
            .any(|n| n.reservation_id == reservation_id && n.kind == kind))
    }
}

#[async_trait]
impl Directory for InMemoryStore {
    async fn find_facility(&self, facility_id: i32) -> ReservationResult<Option<Facility>> {
        let inner = self.inner.lock().await;
        Ok(inner.facilities.get(&facility_id).cloned())
    }

    async fn find_user(&self, user_id: i32) -> ReservationResult<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.get(&user_id).cloned())
    }
}
