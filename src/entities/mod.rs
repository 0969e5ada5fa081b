//! Entities module - Entità del dominio applicativo
//!
//! Questo modulo contiene tutte le entità (models) che rappresentano i dati persistiti nel database.
//! Ogni entity corrisponde a una tabella nel database.

pub mod enums;
pub mod facility;
pub mod notification;
pub mod reservation;
pub mod user;

// Re-exports per facilitare l'import
pub use enums::{NotificationKind, ReservationStatus, UserRole};
pub use facility::Facility;
pub use notification::ReservationNotification;
pub use reservation::Reservation;
pub use user::User;
