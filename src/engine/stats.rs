use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::engine::require_customer;
use crate::error::AppError;
use crate::models::account::Role;
use crate::models::order::OrderStatus;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CustomerStats {
    pub total_orders: usize,
    pub pending: usize,
    pub dispatched: usize,
    pub delivered: usize,
}

#[derive(Debug, Serialize)]
pub struct RiderStats {
    pub total_deliveries: u64,
    pub active_orders: usize,
    pub completed_today: usize,
    pub rating: f64,
}

pub fn customer_stats(state: &AppState, customer_id: Uuid) -> Result<CustomerStats, AppError> {
    require_customer(state, customer_id)?;

    let mut stats = CustomerStats {
        total_orders: 0,
        pending: 0,
        dispatched: 0,
        delivered: 0,
    };

    for entry in state.orders.iter() {
        let order = entry.value();
        if order.customer_id != customer_id {
            continue;
        }

        stats.total_orders += 1;
        match order.status {
            OrderStatus::Pending => stats.pending += 1,
            OrderStatus::Dispatched => stats.dispatched += 1,
            OrderStatus::Delivered => stats.delivered += 1,
        }
    }

    Ok(stats)
}

pub fn rider_stats(state: &AppState, rider_id: Uuid) -> Result<RiderStats, AppError> {
    let (total_deliveries, rating) = {
        let account = state
            .accounts
            .get(&rider_id)
            .ok_or_else(|| AppError::Forbidden(format!("unknown account {rider_id}")))?;

        match &account.role {
            Role::Rider(profile) => (profile.total_deliveries, profile.rating),
            Role::Customer => {
                return Err(AppError::Forbidden(
                    "this operation is for riders only".to_string(),
                ));
            }
        }
    };

    let today = Utc::now().date_naive();
    let mut active_orders = 0;
    let mut completed_today = 0;

    for entry in state.orders.iter() {
        let order = entry.value();
        if order.assigned_rider != Some(rider_id) {
            continue;
        }

        match order.status {
            OrderStatus::Dispatched => active_orders += 1,
            OrderStatus::Delivered if order.created_at.date_naive() == today => {
                completed_today += 1;
            }
            _ => {}
        }
    }

    Ok(RiderStats {
        total_deliveries,
        active_orders,
        completed_today,
        rating,
    })
}
