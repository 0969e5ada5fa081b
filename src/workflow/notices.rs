//! Testi delle notifiche inviate all'organizzatore

use crate::dtos::CreateNotificationDTO;
use crate::entities::{NotificationKind, Reservation, ReservationStatus};

const DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

fn slot(reservation: &Reservation) -> String {
    format!(
        "{} du {} au {} (UTC)",
        reservation.sport_type,
        reservation.start_time.format(DATE_FORMAT),
        reservation.end_time.format("%H:%M"),
    )
}

pub fn confirmation(reservation: &Reservation) -> CreateNotificationDTO {
    CreateNotificationDTO {
        reservation_id: reservation.reservation_id,
        recipient_id: reservation.organizer_id,
        kind: NotificationKind::Confirmation,
        title: "Demande de réservation envoyée".to_string(),
        message: format!(
            "Votre demande pour {} est en attente de validation.",
            slot(reservation)
        ),
    }
}

/// Built from the reservation as stored after the transition.
pub fn status_change(reservation: &Reservation) -> CreateNotificationDTO {
    let (title, message) = match reservation.status {
        ReservationStatus::Approved => (
            "Réservation approuvée",
            format!("Votre réservation pour {} a été approuvée.", slot(reservation)),
        ),
        ReservationStatus::Rejected => (
            "Réservation refusée",
            format!(
                "Votre réservation pour {} a été refusée. Motif : {}",
                slot(reservation),
                reservation.rejection_reason.as_deref().unwrap_or("non précisé"),
            ),
        ),
        other => (
            "Réservation mise à jour",
            format!("Votre réservation pour {} est maintenant {}.", slot(reservation), other),
        ),
    };

    CreateNotificationDTO {
        reservation_id: reservation.reservation_id,
        recipient_id: reservation.organizer_id,
        kind: NotificationKind::StatusChange,
        title: title.to_string(),
        message,
    }
}

pub fn reminder(reservation: &Reservation) -> CreateNotificationDTO {
    CreateNotificationDTO {
        reservation_id: reservation.reservation_id,
        recipient_id: reservation.organizer_id,
        kind: NotificationKind::Reminder,
        title: "Rappel de réservation".to_string(),
        message: format!("Rappel : votre réservation {} approche.", slot(reservation)),
    }
}
