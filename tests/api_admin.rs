//! Integration tests per la validazione e la manutenzione (admin)

mod common;

#[cfg(test)]
mod admin_tests {
    use super::common::*;
    use axum::http::StatusCode;
    use axum_test::http::HeaderName;
    use chrono::{DateTime, Duration, Utc};
    use reservation_server::dtos::{
        AutoValidationDTO, BatchValidationDTO, NotificationDTO, ReservationDTO,
    };
    use reservation_server::entities::{NotificationKind, ReservationStatus};
    use reservation_server::workflow::auto_validation::{
        REASON_CONFLICT, REASON_DURATION_EXCEEDED, REASON_NOT_IN_FUTURE,
    };
    use serde_json::{Value, json};

    fn auth() -> HeaderName {
        HeaderName::from_static("authorization")
    }

    async fn submit(app: &TestApp, user_id: i32, start: DateTime<Utc>, end: DateTime<Utc>) -> ReservationDTO {
        let response = app
            .server
            .post("/reservations")
            .add_header(auth(), app.bearer(user_id))
            .json(&json!({
                "facility_id": COURT,
                "start_time": start,
                "end_time": end,
                "sport_type": "Tennis",
                "max_participants": 4,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json()
    }

    fn status_path(reservation_id: i32) -> String {
        format!("/admin/reservations/{}/status", reservation_id)
    }

    // ============================================================
    // PATCH /admin/reservations/{id}/status
    // ============================================================

    #[tokio::test]
    async fn test_reject_then_second_transition_conflicts() {
        let app = create_test_app().await;
        let start = Utc::now() + Duration::hours(1);
        let created = submit(&app, ALICE, start, start + Duration::hours(1)).await;

        let response = app
            .server
            .patch(&status_path(created.reservation_id))
            .add_header(auth(), app.bearer(ADMIN))
            .json(&json!({ "status": "rejected", "rejection_reason": "Terrain en travaux" }))
            .await;
        response.assert_status_ok();
        let rejected: ReservationDTO = response.json();
        assert_eq!(rejected.status, ReservationStatus::Rejected);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("Terrain en travaux"));
        assert_eq!(rejected.validated_by, Some(ADMIN));
        assert!(rejected.validated_at.is_some());
        assert!(rejected.lock_expires_at.is_none());

        // seconda transizione rifiutata, campi invariati
        let response = app
            .server
            .patch(&status_path(created.reservation_id))
            .add_header(auth(), app.bearer(ADMIN))
            .json(&json!({ "status": "approved" }))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(response.json::<Value>()["details"], "Reservation is already rejected");

        let details: Value = app
            .server
            .get(&format!("/reservations/{}", created.reservation_id))
            .add_header(auth(), app.bearer(ALICE))
            .await
            .json();
        assert_eq!(details["status"], "rejected");
        assert_eq!(details["rejection_reason"], "Terrain en travaux");

        let inbox: Vec<NotificationDTO> = app
            .server
            .get("/notifications")
            .add_header(auth(), app.bearer(ALICE))
            .await
            .json();
        assert_eq!(inbox.len(), 2);
        assert!(inbox.iter().any(|n| n.kind == NotificationKind::Confirmation));
        assert_eq!(
            inbox
                .iter()
                .filter(|n| n.kind == NotificationKind::StatusChange)
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_approve_clears_lock() {
        let app = create_test_app().await;
        let start = Utc::now() + Duration::hours(1);
        let created = submit(&app, ALICE, start, start + Duration::hours(1)).await;
        assert!(created.lock_expires_at.is_some());

        let approved: ReservationDTO = app
            .server
            .patch(&status_path(created.reservation_id))
            .add_header(auth(), app.bearer(ADMIN))
            .json(&json!({ "status": "approved" }))
            .await
            .json();
        assert_eq!(approved.status, ReservationStatus::Approved);
        assert!(approved.lock_expires_at.is_none());
        assert!(approved.rejection_reason.is_none());
        assert_eq!(approved.validated_by, Some(ADMIN));

        // l'organizzatore non può più annullare
        app.server
            .post(&format!("/reservations/{}/cancel", created.reservation_id))
            .add_header(auth(), app.bearer(ALICE))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_blank_reason_gets_default() {
        let app = create_test_app().await;
        let start = Utc::now() + Duration::hours(1);
        let created = submit(&app, ALICE, start, start + Duration::hours(1)).await;

        let rejected: ReservationDTO = app
            .server
            .patch(&status_path(created.reservation_id))
            .add_header(auth(), app.bearer(ADMIN))
            .json(&json!({ "status": "rejected", "rejection_reason": "  " }))
            .await
            .json();
        assert_eq!(
            rejected.rejection_reason.as_deref(),
            Some("Rejected by administrator")
        );
    }

    #[tokio::test]
    async fn test_unsupported_target_status() {
        let app = create_test_app().await;
        let start = Utc::now() + Duration::hours(1);
        let created = submit(&app, ALICE, start, start + Duration::hours(1)).await;

        for target in ["pending", "cancelled"] {
            let response = app
                .server
                .patch(&status_path(created.reservation_id))
                .add_header(auth(), app.bearer(ADMIN))
                .json(&json!({ "status": target }))
                .await;
            response.assert_status_bad_request();
            assert_eq!(response.json::<Value>()["details"], "unsupported target status");
        }
    }

    #[tokio::test]
    async fn test_approval_rechecks_conflicts() {
        let app = create_test_app().await;
        let now = Utc::now();
        let start = now + Duration::hours(1);
        let created = submit(&app, ALICE, start, start + Duration::hours(1)).await;

        // approvata inserita a mano sullo stesso slot
        app.store
            .insert_reservation(seeded_reservation(
                50,
                BOB,
                start + Duration::minutes(30),
                start + Duration::minutes(90),
                ReservationStatus::Approved,
                None,
            ))
            .await;

        app.server
            .patch(&status_path(created.reservation_id))
            .add_header(auth(), app.bearer(ADMIN))
            .json(&json!({ "status": "approved" }))
            .await
            .assert_status(StatusCode::CONFLICT);

        let pending: Vec<ReservationDTO> = app
            .server
            .get("/admin/reservations/pending")
            .add_header(auth(), app.bearer(ADMIN))
            .await
            .json();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].reservation_id, created.reservation_id);
    }

    #[tokio::test]
    async fn test_unknown_reservation_not_found() {
        let app = create_test_app().await;
        app.server
            .patch(&status_path(4242))
            .add_header(auth(), app.bearer(ADMIN))
            .json(&json!({ "status": "approved" }))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_member_cannot_use_admin_routes() {
        let app = create_test_app().await;
        let start = Utc::now() + Duration::hours(1);
        let created = submit(&app, ALICE, start, start + Duration::hours(1)).await;

        app.server
            .patch(&status_path(created.reservation_id))
            .add_header(auth(), app.bearer(ALICE))
            .json(&json!({ "status": "approved" }))
            .await
            .assert_status_forbidden();

        app.server
            .get("/admin/reservations/pending")
            .add_header(auth(), app.bearer(BOB))
            .await
            .assert_status_forbidden();

        app.server
            .get("/admin/reservations/pending")
            .await
            .assert_status_forbidden();
    }

    // ============================================================
    // Validazione automatica
    // ============================================================

    #[tokio::test]
    async fn test_auto_validate_past_reservation() {
        let app = create_test_app().await;
        let now = Utc::now();
        app.store
            .insert_reservation(seeded_reservation(
                10,
                ALICE,
                now - Duration::hours(1),
                now + Duration::minutes(30),
                ReservationStatus::Pending,
                Some(now + Duration::minutes(5)),
            ))
            .await;

        let outcome: AutoValidationDTO = app
            .server
            .post("/admin/reservations/10/auto-validate")
            .add_header(auth(), app.bearer(ADMIN))
            .await
            .json();
        assert_eq!(outcome.status, Some(ReservationStatus::Rejected));
        assert_eq!(outcome.reason.as_deref(), Some(REASON_NOT_IN_FUTURE));

        let inbox: Vec<NotificationDTO> = app
            .server
            .get("/notifications")
            .add_header(auth(), app.bearer(ALICE))
            .await
            .json();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].kind, NotificationKind::StatusChange);
        assert_eq!(inbox[0].reservation_id, 10);
    }

    #[tokio::test]
    async fn test_auto_validate_too_long() {
        let app = create_test_app().await;
        let start = Utc::now() + Duration::days(1);
        app.store
            .insert_reservation(seeded_reservation(
                11,
                ALICE,
                start,
                start + Duration::hours(5),
                ReservationStatus::Pending,
                None,
            ))
            .await;

        let outcome: AutoValidationDTO = app
            .server
            .post("/admin/reservations/11/auto-validate")
            .add_header(auth(), app.bearer(ADMIN))
            .await
            .json();
        assert_eq!(outcome.status, Some(ReservationStatus::Rejected));
        assert_eq!(outcome.reason.as_deref(), Some(REASON_DURATION_EXCEEDED));
    }

    #[tokio::test]
    async fn test_auto_validate_approves_and_refuses_terminal() {
        let app = create_test_app().await;
        let start = Utc::now() + Duration::hours(2);
        let created = submit(&app, ALICE, start, start + Duration::hours(1)).await;
        let path = format!("/admin/reservations/{}/auto-validate", created.reservation_id);

        let outcome: AutoValidationDTO = app
            .server
            .post(&path)
            .add_header(auth(), app.bearer(ADMIN))
            .await
            .json();
        assert_eq!(outcome.status, Some(ReservationStatus::Approved));
        assert!(outcome.reason.is_none());

        app.server
            .post(&path)
            .add_header(auth(), app.bearer(ADMIN))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_batch_auto_validation() {
        let app = create_test_app().await;
        let now = Utc::now();
        let live_lock = Some(now + Duration::minutes(5));

        let seeds = [
            // valida
            seeded_reservation(1, ALICE, now + Duration::hours(1), now + Duration::hours(2), ReservationStatus::Pending, live_lock),
            // nel passato
            seeded_reservation(2, ALICE, now - Duration::hours(2), now - Duration::hours(1), ReservationStatus::Pending, None),
            // troppo lunga
            seeded_reservation(3, BOB, now + Duration::hours(20), now + Duration::hours(25), ReservationStatus::Pending, None),
            // in conflitto con la 5
            seeded_reservation(4, BOB, now + Duration::minutes(630), now + Duration::minutes(690), ReservationStatus::Pending, live_lock),
            seeded_reservation(5, ALICE, now + Duration::hours(10), now + Duration::hours(11), ReservationStatus::Approved, None),
        ];
        for seed in seeds {
            app.store.insert_reservation(seed).await;
        }

        let report: BatchValidationDTO = app
            .server
            .post("/admin/reservations/auto-validate")
            .add_header(auth(), app.bearer(ADMIN))
            .await
            .json();
        assert_eq!(report.processed, 4);
        assert_eq!(report.approved, 1);
        assert_eq!(report.rejected, 3);
        assert_eq!(report.failed, 0);

        let reason_of = |id: i32| {
            report
                .outcomes
                .iter()
                .find(|o| o.reservation_id == id)
                .and_then(|o| o.reason.clone())
        };
        assert_eq!(reason_of(1), None);
        assert_eq!(reason_of(2).as_deref(), Some(REASON_NOT_IN_FUTURE));
        assert_eq!(reason_of(3).as_deref(), Some(REASON_DURATION_EXCEEDED));
        assert_eq!(reason_of(4).as_deref(), Some(REASON_CONFLICT));

        let pending: Vec<ReservationDTO> = app
            .server
            .get("/admin/reservations/pending")
            .add_header(auth(), app.bearer(ADMIN))
            .await
            .json();
        assert!(pending.is_empty());
    }

    // ============================================================
    // Manutenzione e statistiche
    // ============================================================

    #[tokio::test]
    async fn test_cleanup_is_idempotent() {
        let app = create_test_app().await;
        let now = Utc::now();
        let expired = Some(now - Duration::minutes(1));

        for id in [1, 2] {
            let start = now + Duration::hours(id as i64 * 2);
            app.store
                .insert_reservation(seeded_reservation(
                    id,
                    ALICE,
                    start,
                    start + Duration::hours(1),
                    ReservationStatus::Pending,
                    expired,
                ))
                .await;
        }

        let first: Value = app
            .server
            .post("/admin/locks/cleanup")
            .add_header(auth(), app.bearer(ADMIN))
            .await
            .json();
        assert_eq!(first["reclaimed"], 2);

        let second: Value = app
            .server
            .post("/admin/locks/cleanup")
            .add_header(auth(), app.bearer(ADMIN))
            .await
            .json();
        assert_eq!(second["reclaimed"], 0);

        // restano pending, senza lock
        let pending: Vec<ReservationDTO> = app
            .server
            .get("/admin/reservations/pending")
            .add_header(auth(), app.bearer(ADMIN))
            .await
            .json();
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|r| r.lock_expires_at.is_none()));
    }

    #[tokio::test]
    async fn test_expired_lock_does_not_block_new_request() {
        let app = create_test_app().await;
        let now = Utc::now();
        let start = now + Duration::hours(1);
        app.store
            .insert_reservation(seeded_reservation(
                1,
                ALICE,
                start,
                start + Duration::hours(1),
                ReservationStatus::Pending,
                Some(now - Duration::minutes(1)),
            ))
            .await;

        let created = submit(&app, BOB, start, start + Duration::hours(1)).await;
        assert_eq!(created.reservation_id, 2);
    }

    #[tokio::test]
    async fn test_stats_partition_total() {
        let app = create_test_app().await;
        let now = Utc::now();
        let statuses = [
            ReservationStatus::Pending,
            ReservationStatus::Approved,
            ReservationStatus::Approved,
            ReservationStatus::Rejected,
            ReservationStatus::Cancelled,
        ];
        for (i, status) in statuses.into_iter().enumerate() {
            let start = now + Duration::hours(2 * i as i64 + 1);
            let organizer = if i % 2 == 0 { ALICE } else { BOB };
            app.store
                .insert_reservation(seeded_reservation(
                    i as i32 + 1,
                    organizer,
                    start,
                    start + Duration::hours(1),
                    status,
                    None,
                ))
                .await;
        }

        let stats: Value = app
            .server
            .get("/admin/reservations/stats")
            .add_header(auth(), app.bearer(ADMIN))
            .await
            .json();
        assert_eq!(stats["total"], 5);
        assert_eq!(stats["approved"], 2);

        let sum: u64 = ["pending", "approved", "rejected", "cancelled"]
            .iter()
            .map(|k| stats[*k].as_u64().unwrap_or_default())
            .sum();
        assert_eq!(stats["total"].as_u64(), Some(sum));
    }

    #[tokio::test]
    async fn test_reminders_sent_once() {
        let app = create_test_app().await;
        let now = Utc::now();
        app.store
            .insert_reservation(seeded_reservation(
                1,
                ALICE,
                now + Duration::hours(3),
                now + Duration::hours(4),
                ReservationStatus::Approved,
                None,
            ))
            .await;
        // oltre la finestra di default
        app.store
            .insert_reservation(seeded_reservation(
                2,
                BOB,
                now + Duration::hours(48),
                now + Duration::hours(49),
                ReservationStatus::Approved,
                None,
            ))
            .await;

        let first: Value = app
            .server
            .post("/admin/reminders")
            .add_header(auth(), app.bearer(ADMIN))
            .await
            .json();
        assert_eq!(first["sent"], 1);

        let second: Value = app
            .server
            .post("/admin/reminders")
            .add_header(auth(), app.bearer(ADMIN))
            .await
            .json();
        assert_eq!(second["sent"], 0);

        let inbox: Vec<NotificationDTO> = app
            .server
            .get("/notifications")
            .add_header(auth(), app.bearer(ALICE))
            .await
            .json();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].kind, NotificationKind::Reminder);
    }
}
