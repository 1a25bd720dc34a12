use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::order::GeoPoint;

/// One immutable sample in an order's location history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationEvent {
    pub id: Uuid,
    pub order_id: Uuid,
    pub point: GeoPoint,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}
