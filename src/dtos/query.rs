//! Query DTOs - Data Transfer Objects per query string

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// DTO per query parameters di GET /facilities/{id}/conflicts
#[derive(Serialize, Deserialize, Debug)]
pub struct ConflictQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub exclude: Option<i32>,
}
