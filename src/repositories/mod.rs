//! Repositories module - Coordinatore per tutti i repository del progetto
//!
//! Il workflow vede solo i trait di `traits`; le implementazioni sono due:
//! MySQL (`sqlx`) e in memoria.

// ************************* NOTA SU SQLX ************************* //

/*
   Qui NON si usano le macro query!/query_as! : richiedono DATABASE_URL e un mysql
   raggiungibile a compile time, mentre il backend in memoria deve compilare anche senza.
   Si usano le versioni runtime:
   sqlx::query_as::<_, Reservation>("SELECT ... WHERE reservation_id = ?")
       .bind(id)
       .fetch_optional(&self.connection_pool)
       .await?;
   Il mapping riga -> struct lo fa #[derive(sqlx::FromRow)] sulle entity, quindi i nomi
   delle colonne nella SELECT devono coincidere con i campi.
   Number of Rows	Method to Call
   None	            .execute(...).await
   Zero or One	    .fetch_optional(...).await
   Exactly One	    .fetch_one(...).await
   Multiple	        .fetch_all(...).await
   Le operazioni che devono essere atomiche (create con lock, cambio di stato, cancel)
   aprono una transazione con pool.begin() e passano &mut *tx come executor.
*/

// ************************* MODULI REPOSITORY ************************* //

pub mod directory;
pub mod memory;
pub mod notification;
pub mod reservation;
pub mod traits;

// Re-esportazione dei trait per facilitare l'import
pub use traits::{Directory, NotificationStore, ReservationGateway};

// Re-esportazione delle struct dei repository per facilitare l'import
pub use directory::MySqlDirectory;
pub use memory::InMemoryStore;
pub use notification::MySqlNotificationRepository;
pub use reservation::MySqlReservationGateway;
