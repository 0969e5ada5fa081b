//! Facility entity - Impianto sportivo pubblico prenotabile

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Facility {
    pub facility_id: i32,
    pub name: String,
    pub facility_type: String, // campo, terrain, piscina...
    pub address: Option<String>,
    pub city: Option<String>,
}
