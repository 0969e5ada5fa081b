//! Reservation workflow - Ciclo di vita delle prenotazioni
//!
//! Richiesta → gateway (creazione + soft lock) → validazione (admin o automatica)
//! → transizione di stato → notifica all'organizzatore.
//!
//! Le operazioni ricevono `now` esplicitamente; gli handler HTTP passano `Utc::now()`.

pub mod auto_validation;
pub mod error;
pub mod lifecycle;
pub mod notices;
pub mod request;
pub mod stats;

pub use auto_validation::Decision;
pub use error::{ReservationError, ReservationResult, ValidationError};
pub use lifecycle::{DEFAULT_REJECTION_REASON, StatusTransition, Verdict};
pub use request::{ReservationRequest, lock_duration};
pub use stats::ReservationStats;

use crate::dtos::{
    AutoValidationDTO, BatchValidationDTO, CreateNotificationDTO, ReservationDetailsDTO,
};
use crate::entities::{NotificationKind, Reservation, ReservationNotification};
use crate::repositories::{Directory, NotificationStore, ReservationGateway};
use crate::ws::usermap::{InternalSignal, UserMap};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

/// Result of auto-validating a single reservation
#[derive(Debug, Clone)]
pub struct AutoValidation {
    pub decision: Decision,
    pub reservation: Reservation,
}

impl From<&AutoValidation> for AutoValidationDTO {
    fn from(value: &AutoValidation) -> Self {
        Self {
            reservation_id: value.reservation.reservation_id,
            status: Some(value.reservation.status),
            reason: value.reservation.rejection_reason.clone(),
            error: None,
        }
    }
}

#[derive(Clone)]
pub struct ReservationWorkflow {
    gateway: Arc<dyn ReservationGateway>,
    notifications: Arc<dyn NotificationStore>,
    directory: Arc<dyn Directory>,
    users_online: Arc<UserMap>,
}

impl ReservationWorkflow {
    pub fn new(
        gateway: Arc<dyn ReservationGateway>,
        notifications: Arc<dyn NotificationStore>,
        directory: Arc<dyn Directory>,
        users_online: Arc<UserMap>,
    ) -> Self {
        Self {
            gateway,
            notifications,
            directory,
            users_online,
        }
    }

    /// Validates the request locally, then creates it atomically with a soft lock.
    /// On success the organizer receives a `confirmation` notification.
    #[instrument(skip(self, request), fields(facility_id = request.facility_id, organizer_id = request.organizer_id))]
    pub async fn build_and_submit(
        &self,
        request: ReservationRequest,
        now: DateTime<Utc>,
    ) -> ReservationResult<Reservation> {
        debug!("Validating reservation request");
        let data = request.validate(now).map_err(|e| {
            warn!("Reservation request rejected locally: {}", e);
            e
        })?;

        let reservation = self
            .gateway
            .create_reservation_with_lock(&data, lock_duration(), now)
            .await?;
        info!(
            reservation_id = reservation.reservation_id,
            "Reservation created, locked until {:?}", reservation.lock_expires_at
        );

        self.notify(notices::confirmation(&reservation), now).await;
        Ok(reservation)
    }

    /// Approves or rejects a pending reservation and notifies the organizer.
    #[instrument(skip(self, verdict), fields(reservation_id = %reservation_id, validator_id = %validator_id, status = %verdict.status()))]
    pub async fn set_status(
        &self,
        reservation_id: i32,
        verdict: Verdict,
        validator_id: i32,
        now: DateTime<Utc>,
    ) -> ReservationResult<Reservation> {
        let transition = StatusTransition {
            reservation_id,
            validator_id,
            verdict,
            at: now,
        };

        let updated = self.gateway.update_reservation_status(&transition).await?;
        info!("Reservation moved to {}", updated.status);

        self.notify(notices::status_change(&updated), now).await;
        Ok(updated)
    }

    #[instrument(skip(self), fields(reservation_id = %reservation_id, organizer_id = %organizer_id))]
    pub async fn cancel(
        &self,
        reservation_id: i32,
        organizer_id: i32,
        now: DateTime<Utc>,
    ) -> ReservationResult<Reservation> {
        let cancelled = self
            .gateway
            .cancel_reservation(reservation_id, organizer_id, now)
            .await?;
        info!("Reservation cancelled by organizer");
        Ok(cancelled)
    }

    /// Runs the ordered rule set on one pending reservation and applies the outcome.
    #[instrument(skip(self), fields(reservation_id = %reservation_id, validator_id = %validator_id))]
    pub async fn auto_validate_reservation(
        &self,
        reservation_id: i32,
        validator_id: i32,
        now: DateTime<Utc>,
    ) -> ReservationResult<AutoValidation> {
        let reservation = self.find(reservation_id).await?;
        lifecycle::ensure_pending(reservation.status)?;

        let decision = auto_validation::evaluate(&reservation, now, || {
            self.gateway.check_reservation_conflicts(
                reservation.facility_id,
                reservation.start_time,
                reservation.end_time,
                Some(reservation.reservation_id),
                now,
            )
        })
        .await?;
        debug!("Auto-validation decision: {:?}", decision);

        let reservation = self
            .set_status(reservation_id, decision.verdict(), validator_id, now)
            .await?;
        Ok(AutoValidation {
            decision,
            reservation,
        })
    }

    /// Auto-validates every pending reservation in turn. A failing item is
    /// recorded in the report and the batch goes on.
    #[instrument(skip(self), fields(validator_id = %validator_id))]
    pub async fn auto_validate_pending(
        &self,
        validator_id: i32,
        now: DateTime<Utc>,
    ) -> ReservationResult<BatchValidationDTO> {
        let pending = self.gateway.find_pending().await?;
        info!("Auto-validating {} pending reservations", pending.len());

        let mut report = BatchValidationDTO::default();
        for reservation in pending {
            let reservation_id = reservation.reservation_id;
            report.processed += 1;

            let outcome = match self
                .auto_validate_reservation(reservation_id, validator_id, now)
                .await
            {
                Ok(result) => {
                    match result.decision {
                        Decision::Approve => report.approved += 1,
                        Decision::Reject(_) => report.rejected += 1,
                    }
                    AutoValidationDTO::from(&result)
                }
                Err(e) => {
                    warn!(reservation_id, "Auto-validation failed: {}", e);
                    report.failed += 1;
                    AutoValidationDTO {
                        reservation_id,
                        status: None,
                        reason: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            report.outcomes.push(outcome);
        }

        info!(
            approved = report.approved,
            rejected = report.rejected,
            failed = report.failed,
            "Batch auto-validation completed"
        );
        Ok(report)
    }

    #[instrument(skip(self))]
    pub async fn cleanup_expired_locks(&self, now: DateTime<Utc>) -> ReservationResult<u64> {
        let reclaimed = self.gateway.cleanup_expired_locks(now).await?;
        if reclaimed > 0 {
            info!("Reclaimed {} expired locks", reclaimed);
        } else {
            debug!("No expired locks to reclaim");
        }
        Ok(reclaimed)
    }

    pub async fn check_conflicts(
        &self,
        facility_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_reservation_id: Option<i32>,
        now: DateTime<Utc>,
    ) -> ReservationResult<bool> {
        if start >= end {
            return Err(ValidationError::EndBeforeStart.into());
        }
        self.gateway
            .check_reservation_conflicts(facility_id, start, end, exclude_reservation_id, now)
            .await
    }

    /// Sends one `reminder` per approved reservation starting in `(now, now + horizon]`.
    /// Reservations already reminded are skipped, so repeated sweeps send nothing new.
    #[instrument(skip(self))]
    pub async fn send_reminders(
        &self,
        now: DateTime<Utc>,
        horizon: TimeDelta,
    ) -> ReservationResult<usize> {
        let until = now
            .checked_add_signed(horizon)
            .ok_or(ValidationError::ReminderHorizonOutOfRange)?;
        let upcoming = self
            .gateway
            .find_approved_starting_between(now, until)
            .await?;

        let mut sent = 0;
        for reservation in &upcoming {
            if self
                .notifications
                .exists_for(reservation.reservation_id, NotificationKind::Reminder)
                .await?
            {
                continue;
            }
            if self.notify(notices::reminder(reservation), now).await.is_some() {
                sent += 1;
            }
        }

        if sent > 0 {
            info!("Sent {} reminders", sent);
        }
        Ok(sent)
    }

    pub async fn find(&self, reservation_id: i32) -> ReservationResult<Reservation> {
        self.gateway
            .read(reservation_id)
            .await?
            .ok_or(ReservationError::NotFound("reservation"))
    }

    /// Reservation joined with facility and organizer summary at read time
    pub async fn details(&self, reservation_id: i32) -> ReservationResult<ReservationDetailsDTO> {
        let reservation = self.find(reservation_id).await?;
        let facility = self.directory.find_facility(reservation.facility_id).await?;
        let organizer = self.directory.find_user(reservation.organizer_id).await?;

        Ok(ReservationDetailsDTO {
            reservation: reservation.into(),
            facility: facility.map(Into::into),
            organizer: organizer.map(Into::into),
        })
    }

    pub async fn list_by_organizer(&self, organizer_id: i32) -> ReservationResult<Vec<Reservation>> {
        self.gateway.find_by_organizer(organizer_id).await
    }

    pub async fn list_by_facility(&self, facility_id: i32) -> ReservationResult<Vec<Reservation>> {
        if self.directory.find_facility(facility_id).await?.is_none() {
            return Err(ReservationError::NotFound("facility"));
        }
        self.gateway.find_by_facility(facility_id).await
    }

    pub async fn list_pending(&self) -> ReservationResult<Vec<Reservation>> {
        self.gateway.find_pending().await
    }

    /// Counts over one organizer's reservations, or over all of them
    pub async fn stats(&self, organizer_id: Option<i32>) -> ReservationResult<ReservationStats> {
        let reservations = match organizer_id {
            Some(id) => self.gateway.find_by_organizer(id).await?,
            None => self.gateway.find_all().await?,
        };
        Ok(ReservationStats::from_reservations(&reservations))
    }

    /// Stores the notification and pushes it to the recipient if online.
    /// Failures are logged: the transition that triggered it is already committed.
    async fn notify(
        &self,
        data: CreateNotificationDTO,
        now: DateTime<Utc>,
    ) -> Option<ReservationNotification> {
        if let Err(e) = data.validate() {
            warn!(reservation_id = data.reservation_id, "Invalid notification skipped: {}", e);
            return None;
        }

        match self.notifications.create(&data, now).await {
            Ok(notification) => {
                self.users_online.send_server_message_if_online(
                    &notification.recipient_id,
                    InternalSignal::Notification(notification.clone().into()),
                );
                Some(notification)
            }
            Err(e) => {
                error!(
                    reservation_id = data.reservation_id,
                    "Failed to record {:?} notification: {}", data.kind, e
                );
                None
            }
        }
    }
}
