use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiderProfile {
    pub vehicle_type: String,
    pub license_number: Option<String>,
    pub is_available: bool,
    pub rating: f64,
    pub total_deliveries: u64,
}

impl RiderProfile {
    pub fn new(vehicle_type: String, license_number: Option<String>) -> Self {
        Self {
            vehicle_type,
            license_number,
            is_available: true,
            rating: 5.0,
            total_deliveries: 0,
        }
    }
}

/// Closed set of principal roles. A rider's profile lives inside the
/// variant, so a rider account cannot exist without one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Role {
    Customer,
    Rider(RiderProfile),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub phone_number: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}
