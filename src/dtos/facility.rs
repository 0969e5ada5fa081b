//! Facility DTOs - Data Transfer Objects per impianti

use crate::entities::Facility;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FacilityDTO {
    pub facility_id: i32,
    pub name: String,
    pub facility_type: String,
    pub address: Option<String>,
    pub city: Option<String>,
}

impl From<Facility> for FacilityDTO {
    fn from(value: Facility) -> Self {
        Self {
            facility_id: value.facility_id,
            name: value.name,
            facility_type: value.facility_type,
            address: value.address,
            city: value.city,
        }
    }
}
