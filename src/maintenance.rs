//! Manutenzione periodica delle prenotazioni
//!
//! Un task tokio in background che a intervalli regolari:
//! 1. rilascia i soft lock scaduti delle prenotazioni pending
//! 2. invia i promemoria per le prenotazioni approvate imminenti
//!
//! Gli errori di un giro vengono loggati e il giro successivo riparte da capo.

use crate::workflow::ReservationWorkflow;
use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;
use tokio::time;
use tracing::{debug, error, info};

/// Configurazione della manutenzione
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceConfig {
    /// Intervallo tra due giri in secondi
    pub interval_secs: u64,
    /// Finestra dei promemoria in ore
    pub reminder_horizon_hours: i64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            reminder_horizon_hours: 24,
        }
    }
}

/// Esito di un singolo giro
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub reclaimed: u64,
    pub reminders: usize,
}

impl SweepReport {
    pub fn format_for_log(&self) -> String {
        format!(
            "Locks reclaimed: {} | Reminders sent: {}",
            self.reclaimed, self.reminders
        )
    }
}

/// Esegue un giro completo. Un errore sui lock non impedisce i promemoria.
pub async fn run_sweep(
    workflow: &ReservationWorkflow,
    config: &MaintenanceConfig,
    now: DateTime<Utc>,
) -> SweepReport {
    let mut report = SweepReport::default();

    match workflow.cleanup_expired_locks(now).await {
        Ok(reclaimed) => report.reclaimed = reclaimed,
        Err(e) => error!("Lock reclamation failed: {}", e),
    }

    let Some(horizon) = TimeDelta::try_hours(config.reminder_horizon_hours) else {
        error!(
            "Reminder horizon of {} hours is out of range",
            config.reminder_horizon_hours
        );
        return report;
    };
    match workflow.send_reminders(now, horizon).await {
        Ok(sent) => report.reminders = sent,
        Err(e) => error!("Reminder sweep failed: {}", e),
    }

    report
}

/// Task di manutenzione che gira in background
///
/// # Example
///
/// ```rust,no_run
/// use reservation_server::maintenance::{start_maintenance, MaintenanceConfig};
/// # async fn spawn(workflow: reservation_server::workflow::ReservationWorkflow) {
/// tokio::spawn(start_maintenance(workflow, MaintenanceConfig::default()));
/// # }
/// ```
pub async fn start_maintenance(workflow: ReservationWorkflow, config: MaintenanceConfig) {
    info!(
        "Starting reservation maintenance every {} seconds",
        config.interval_secs
    );

    let mut interval = time::interval(Duration::from_secs(config.interval_secs));

    // Salta il primo tick che avviene immediatamente
    interval.tick().await;

    loop {
        interval.tick().await;

        let report = run_sweep(&workflow, &config, Utc::now()).await;
        if report == SweepReport::default() {
            debug!("Maintenance sweep: nothing to do");
        } else {
            info!("Maintenance sweep - {}", report.format_for_log());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AppState;
    use crate::entities::{Facility, Reservation, ReservationStatus};
    use crate::repositories::{InMemoryStore, NotificationStore};
    use chrono::Duration as ChronoDuration;
    use std::sync::Arc;

    fn reservation(
        id: i32,
        status: ReservationStatus,
        start: DateTime<Utc>,
        lock: Option<DateTime<Utc>>,
    ) -> Reservation {
        Reservation {
            reservation_id: id,
            facility_id: 1,
            organizer_id: 7,
            start_time: start,
            end_time: start + ChronoDuration::hours(1),
            sport_type: "Natation".to_string(),
            max_participants: 8,
            description: None,
            status,
            validated_by: None,
            validated_at: None,
            rejection_reason: None,
            lock_expires_at: lock,
            created_at: start - ChronoDuration::days(2),
            updated_at: start - ChronoDuration::days(2),
        }
    }

    #[test]
    fn test_default_config() {
        let config = MaintenanceConfig::default();
        assert_eq!(config.interval_secs, 60);
        assert_eq!(config.reminder_horizon_hours, 24);
    }

    #[test]
    fn test_report_format() {
        let report = SweepReport {
            reclaimed: 3,
            reminders: 1,
        };
        assert_eq!(
            report.format_for_log(),
            "Locks reclaimed: 3 | Reminders sent: 1"
        );
    }

    #[tokio::test]
    async fn test_sweep_reclaims_and_reminds_once() {
        let store = Arc::new(InMemoryStore::new());
        store
            .insert_facility(Facility {
                facility_id: 1,
                name: "Piscine municipale".to_string(),
                facility_type: "pool".to_string(),
                address: None,
                city: None,
            })
            .await;

        let now = Utc::now();
        store
            .insert_reservation(reservation(
                1,
                ReservationStatus::Pending,
                now + ChronoDuration::hours(5),
                Some(now - ChronoDuration::minutes(1)),
            ))
            .await;
        store
            .insert_reservation(reservation(
                2,
                ReservationStatus::Approved,
                now + ChronoDuration::hours(3),
                None,
            ))
            .await;
        // fuori dalla finestra di 24h
        store
            .insert_reservation(reservation(
                3,
                ReservationStatus::Approved,
                now + ChronoDuration::hours(30),
                None,
            ))
            .await;

        let state = AppState::in_memory(store.clone(), "secret".to_string());
        let config = MaintenanceConfig::default();

        let first = run_sweep(&state.reservations, &config, now).await;
        assert_eq!(
            first,
            SweepReport {
                reclaimed: 1,
                reminders: 1
            }
        );

        let second = run_sweep(&state.reservations, &config, now).await;
        assert_eq!(second, SweepReport::default());

        let inbox = store.find_by_recipient(7).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].reservation_id, 2);
    }

    #[tokio::test]
    async fn test_huge_horizon_does_not_panic() {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        store
            .insert_reservation(reservation(
                1,
                ReservationStatus::Pending,
                now + ChronoDuration::hours(5),
                Some(now - ChronoDuration::minutes(1)),
            ))
            .await;
        let state = AppState::in_memory(store, "secret".to_string());

        let first = run_sweep(
            &state.reservations,
            &MaintenanceConfig {
                interval_secs: 60,
                reminder_horizon_hours: 3_000_000_000,
            },
            now,
        )
        .await;
        // i lock vengono rilasciati anche se i promemoria falliscono
        assert_eq!(first.reclaimed, 1);
        assert_eq!(first.reminders, 0);

        let second = run_sweep(
            &state.reservations,
            &MaintenanceConfig {
                interval_secs: 60,
                reminder_horizon_hours: i64::MAX,
            },
            now,
        )
        .await;
        assert_eq!(second, SweepReport::default());

        let err = state
            .reservations
            .send_reminders(now, TimeDelta::days(100_000_000))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::workflow::ReservationError::Validation(
                crate::workflow::ValidationError::ReminderHorizonOutOfRange
            )
        ));
    }
}
