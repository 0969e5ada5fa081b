#![allow(dead_code)]

use axum_test::TestServer;
use chrono::{DateTime, Duration, Utc};
use reservation_server::core::AppState;
use reservation_server::entities::{Facility, Reservation, ReservationStatus, User, UserRole};
use reservation_server::repositories::InMemoryStore;
use std::sync::Arc;

pub const JWT_SECRET: &str = "ilmiobellissimosegretochevaassolutamentecambiato";

pub const ALICE: i32 = 1;
pub const BOB: i32 = 2;
pub const ADMIN: i32 = 99;

pub const COURT: i32 = 1;
pub const POOL: i32 = 2;

/// Server di test con lo store in memoria già popolato
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub store: Arc<InMemoryStore>,
}

impl TestApp {
    pub fn token(&self, user_id: i32) -> String {
        match user_id {
            ADMIN => create_test_jwt(ADMIN, "admin", "admin", JWT_SECRET),
            BOB => create_test_jwt(BOB, "bob", "member", JWT_SECRET),
            _ => create_test_jwt(user_id, "alice", "member", JWT_SECRET),
        }
    }

    pub fn bearer(&self, user_id: i32) -> String {
        format!("Bearer {}", self.token(user_id))
    }
}

/// Crea un AppState per i test sopra lo store fornito
pub fn create_test_state(store: Arc<InMemoryStore>) -> Arc<AppState> {
    Arc::new(AppState::in_memory(store, JWT_SECRET.to_string()))
}

/// Crea un TestServer per i test
pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = reservation_server::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Store con due utenti, un admin e due impianti
pub async fn create_test_app() -> TestApp {
    let store = Arc::new(InMemoryStore::new());

    for (user_id, username, role) in [
        (ALICE, "alice", UserRole::Member),
        (BOB, "bob", UserRole::Member),
        (ADMIN, "admin", UserRole::Admin),
    ] {
        store
            .insert_user(User {
                user_id,
                username: username.to_string(),
                role,
            })
            .await;
    }

    store
        .insert_facility(Facility {
            facility_id: COURT,
            name: "Court central".to_string(),
            facility_type: "tennis".to_string(),
            address: Some("1 rue du Stade".to_string()),
            city: Some("Lyon".to_string()),
        })
        .await;
    store
        .insert_facility(Facility {
            facility_id: POOL,
            name: "Piscine municipale".to_string(),
            facility_type: "pool".to_string(),
            address: None,
            city: Some("Lyon".to_string()),
        })
        .await;

    let state = create_test_state(store.clone());
    let server = create_test_server(state.clone());
    TestApp {
        server,
        state,
        store,
    }
}

/// Prenotazione da inserire direttamente nello store (stati non raggiungibili via API)
pub fn seeded_reservation(
    reservation_id: i32,
    organizer_id: i32,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    status: ReservationStatus,
    lock_expires_at: Option<DateTime<Utc>>,
) -> Reservation {
    let created = Utc::now() - Duration::days(1);
    Reservation {
        reservation_id,
        facility_id: COURT,
        organizer_id,
        start_time: start,
        end_time: end,
        sport_type: "Tennis".to_string(),
        max_participants: 4,
        description: None,
        status,
        validated_by: None,
        validated_at: None,
        rejection_reason: None,
        lock_expires_at,
        created_at: created,
        updated_at: created,
    }
}

/// Genera un JWT token per testing
///
/// # Arguments
/// * `user_id` - ID dell'utente per cui generare il token
/// * `username` - Username dell'utente
/// * `role` - "member" oppure "admin"
/// * `jwt_secret` - Secret key per firmare il token
///
/// # Returns
/// Token JWT valido per 24 ore
pub fn create_test_jwt(user_id: i32, username: &str, role: &str, jwt_secret: &str) -> String {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Claims {
        id: i32,
        username: String,
        role: String,
        exp: usize,
        iat: usize,
    }

    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::hours(24))
        .expect("valid timestamp")
        .timestamp() as usize;

    let claims = Claims {
        id: user_id,
        username: username.to_string(),
        role: role.to_string(),
        exp: expiration,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("Failed to create JWT token")
}
