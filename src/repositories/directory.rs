//! MySqlDirectory - Letture su impianti e utenti

use super::traits::Directory;
use crate::entities::{Facility, User};
use crate::workflow::ReservationResult;
use async_trait::async_trait;
use sqlx::MySqlPool;

pub struct MySqlDirectory {
    connection_pool: MySqlPool,
}

impl MySqlDirectory {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }
}

#[async_trait]
impl Directory for MySqlDirectory {
    async fn find_facility(&self, facility_id: i32) -> ReservationResult<Option<Facility>> {
        let facility = sqlx::query_as::<_, Facility>(
            r#"
            SELECT facility_id, name, facility_type, address, city
            FROM facilities
            WHERE facility_id = ?
            "#,
        )
        .bind(facility_id)
        .fetch_optional(&self.connection_pool)
        .await?;
        Ok(facility)
    }

    async fn find_user(&self, user_id: i32) -> ReservationResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, username, role FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.connection_pool)
        .await?;
        Ok(user)
    }
}
