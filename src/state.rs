use dashmap::DashMap;
use uuid::Uuid;

use crate::models::account::Account;
use crate::models::location::LocationEvent;
use crate::models::order::Order;
use crate::observability::metrics::Metrics;

/// Shared in-process store. Every mutation is scoped to a single entry;
/// the exclusive guard returned by `DashMap::get_mut` is the
/// conditional-write primitive that serializes racing claims on one order.
pub struct AppState {
    pub accounts: DashMap<Uuid, Account>,
    pub orders: DashMap<Uuid, Order>,
    pub location_log: DashMap<Uuid, Vec<LocationEvent>>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            orders: DashMap::new(),
            location_log: DashMap::new(),
            metrics: Metrics::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
