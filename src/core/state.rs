//! Application State - Stato globale dell'applicazione
//!
//! Contiene il workflow delle prenotazioni, lo store delle notifiche,
//! la configurazione e lo stato condiviso necessario per gestire l'applicazione.

use crate::repositories::{
    Directory, InMemoryStore, MySqlDirectory, MySqlNotificationRepository,
    MySqlReservationGateway, NotificationStore, ReservationGateway,
};
use crate::workflow::ReservationWorkflow;
use crate::ws::usermap::UserMap;
use sqlx::MySqlPool;
use std::sync::Arc;

pub const DEFAULT_REMINDER_HORIZON_HOURS: i64 = 24;

/// Stato globale dell'applicazione condiviso tra tutte le route e middleware
pub struct AppState {
    /// Ciclo di vita delle prenotazioni (gateway + notifiche + directory)
    pub reservations: ReservationWorkflow,

    /// Inbox delle notifiche, letto direttamente dagli handler
    pub notifications: Arc<dyn NotificationStore>,

    /// Secret key per JWT token
    pub jwt_secret: String,

    /// Mappa concorrente degli utenti online con i loro canali WebSocket
    /// Key: user_id, Value: Sender per inviare segnali al WebSocket dell'utente
    pub users_online: Arc<UserMap>,

    /// Finestra (ore) usata da POST /admin/reminders
    pub reminder_horizon_hours: i64,
}

impl AppState {
    /// Crea una nuova istanza di AppState a partire dai tre backend di storage.
    ///
    /// # Arguments
    /// * `gateway` - Operazioni atomiche sulle prenotazioni
    /// * `notifications` - Store delle notifiche
    /// * `directory` - Letture su impianti e utenti
    /// * `jwt_secret` - Chiave segreta per la verifica dei token JWT
    pub fn new(
        gateway: Arc<dyn ReservationGateway>,
        notifications: Arc<dyn NotificationStore>,
        directory: Arc<dyn Directory>,
        jwt_secret: String,
    ) -> Self {
        let users_online = Arc::new(UserMap::new());
        Self {
            reservations: ReservationWorkflow::new(
                gateway,
                notifications.clone(),
                directory,
                users_online.clone(),
            ),
            notifications,
            jwt_secret,
            users_online,
            reminder_horizon_hours: DEFAULT_REMINDER_HORIZON_HOURS,
        }
    }

    pub fn with_reminder_horizon(mut self, hours: i64) -> Self {
        self.reminder_horizon_hours = hours;
        self
    }

    /// Tutti i repository MySQL sullo stesso pool di connessioni
    pub fn with_mysql(pool: MySqlPool, jwt_secret: String) -> Self {
        Self::new(
            Arc::new(MySqlReservationGateway::new(pool.clone())),
            Arc::new(MySqlNotificationRepository::new(pool.clone())),
            Arc::new(MySqlDirectory::new(pool)),
            jwt_secret,
        )
    }

    /// Un unico store in memoria per tutti e tre i ruoli
    pub fn in_memory(store: Arc<InMemoryStore>, jwt_secret: String) -> Self {
        Self::new(store.clone(), store.clone(), store, jwt_secret)
    }
}
