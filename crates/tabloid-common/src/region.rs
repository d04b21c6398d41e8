//! Region records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A sales region a tabloid belongs to.
///
/// Regions are owned by an external system; this workflow only ever reads
/// one row by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
