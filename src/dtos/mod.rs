//! DTOs module - Data Transfer Objects
//!
//! Questo modulo contiene tutti i DTOs usati per la comunicazione client-server.
//! I DTOs separano la rappresentazione esterna (API) dalla rappresentazione interna (entities).

pub mod facility;
pub mod notification;
pub mod query;
pub mod reservation;
pub mod user;

pub use facility::FacilityDTO;
pub use notification::{CreateNotificationDTO, MarkedReadDTO, NotificationDTO, UnreadCountDTO};
pub use query::ConflictQuery;
pub use reservation::{
    AutoValidationDTO, BatchValidationDTO, CleanupDTO, ConflictDTO, CreateReservationDTO,
    RemindersDTO, ReservationDTO, ReservationDetailsDTO, ReservationRequestDTO, StatusUpdateDTO,
};
pub use user::UserDTO;
