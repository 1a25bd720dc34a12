use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum OrderStatus {
    Pending,
    Dispatched,
    Delivered,
}

/// A named place on the order: address and coordinates are independently
/// optional, so an address-only order is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Waypoint {
    pub address: Option<String>,
    pub point: Option<GeoPoint>,
}

/// Cached "where is it now" projection, refreshed on every location event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionFix {
    pub point: GeoPoint,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub name: String,
    pub description: String,
    pub status: OrderStatus,
    pub pickup: Waypoint,
    pub dropoff: Waypoint,
    pub current_position: Option<PositionFix>,
    pub assigned_rider: Option<Uuid>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
