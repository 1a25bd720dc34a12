use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::engine::{require_customer, require_rider};
use crate::error::AppError;
use crate::models::account::Role;
use crate::models::order::{Order, OrderStatus, Waypoint};
use crate::state::AppState;

pub const CLAIMABLE_PAGE_SIZE: usize = 20;
pub const ASSIGNED_PAGE_SIZE: usize = 10;

const MIN_NAME_LEN: usize = 3;
const MIN_DESCRIPTION_LEN: usize = 10;

pub struct CreateOrder {
    pub name: String,
    pub description: String,
    pub pickup: Waypoint,
    pub dropoff: Waypoint,
}

#[derive(Debug, Serialize)]
pub struct CompletionReceipt {
    pub order: Order,
    pub already_delivered: bool,
}

pub fn create_order(
    state: &AppState,
    customer_id: Uuid,
    input: CreateOrder,
) -> Result<Order, AppError> {
    require_customer(state, customer_id)?;

    if input.name.chars().count() < MIN_NAME_LEN {
        return Err(AppError::Validation(format!(
            "order name must be at least {MIN_NAME_LEN} characters long"
        )));
    }

    if input.description.chars().count() < MIN_DESCRIPTION_LEN {
        return Err(AppError::Validation(format!(
            "order description must be at least {MIN_DESCRIPTION_LEN} characters long"
        )));
    }

    let order = Order {
        id: Uuid::new_v4(),
        customer_id,
        name: input.name,
        description: input.description,
        status: OrderStatus::Pending,
        pickup: input.pickup,
        dropoff: input.dropoff,
        current_position: None,
        assigned_rider: None,
        accepted_at: None,
        created_at: Utc::now(),
    };

    state.orders.insert(order.id, order.clone());
    state.metrics.orders_created_total.inc();
    info!(order_id = %order.id, customer_id = %customer_id, "order created");

    Ok(order)
}

/// Atomically take ownership of a pending order. The precondition checks
/// and the assignment happen under the order entry's exclusive guard, so
/// of N racing claims exactly one commits.
pub fn claim_order(state: &AppState, rider_id: Uuid, order_id: Uuid) -> Result<Order, AppError> {
    require_rider(state, rider_id)?;

    let mut order = state
        .orders
        .get_mut(&order_id)
        .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

    if order.assigned_rider.is_some() {
        state
            .metrics
            .claims_total
            .with_label_values(&["lost_race"])
            .inc();
        return Err(AppError::AlreadyClaimed(format!(
            "order {order_id} was already accepted by another rider"
        )));
    }

    if order.status != OrderStatus::Pending {
        state
            .metrics
            .claims_total
            .with_label_values(&["invalid_state"])
            .inc();
        return Err(AppError::InvalidState(format!(
            "order {order_id} is no longer available"
        )));
    }

    order.assigned_rider = Some(rider_id);
    order.status = OrderStatus::Dispatched;
    order.accepted_at = Some(Utc::now());

    state
        .metrics
        .claims_total
        .with_label_values(&["success"])
        .inc();
    state.metrics.active_deliveries.inc();
    info!(order_id = %order_id, rider_id = %rider_id, "order claimed");

    Ok(order.clone())
}

/// Mark a delivery complete. Repeating the call is a no-op that reports
/// `already_delivered`; the rider's counter moves exactly once.
pub fn complete_delivery(
    state: &AppState,
    rider_id: Uuid,
    order_id: Uuid,
) -> Result<CompletionReceipt, AppError> {
    require_rider(state, rider_id)?;

    let mut order = state
        .orders
        .get_mut(&order_id)
        .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

    if order.assigned_rider != Some(rider_id) {
        return Err(AppError::Forbidden(
            "only the assigned rider can complete this delivery".to_string(),
        ));
    }

    if order.status == OrderStatus::Delivered {
        return Ok(CompletionReceipt {
            order: order.clone(),
            already_delivered: true,
        });
    }

    order.status = OrderStatus::Delivered;

    // Order guard still held: the idempotence check above and this
    // increment form one critical section.
    if let Some(mut account) = state.accounts.get_mut(&rider_id) {
        if let Role::Rider(profile) = &mut account.role {
            profile.total_deliveries += 1;
        }
    }

    state.metrics.deliveries_completed_total.inc();
    state.metrics.active_deliveries.dec();
    info!(order_id = %order_id, rider_id = %rider_id, "delivery completed");

    Ok(CompletionReceipt {
        order: order.clone(),
        already_delivered: false,
    })
}

pub fn list_claimable(state: &AppState, rider_id: Uuid) -> Result<Vec<Order>, AppError> {
    require_rider(state, rider_id)?;

    let mut orders: Vec<Order> = state
        .orders
        .iter()
        .filter(|entry| {
            let order = entry.value();
            order.status == OrderStatus::Pending && order.assigned_rider.is_none()
        })
        .map(|entry| entry.value().clone())
        .collect();

    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    orders.truncate(CLAIMABLE_PAGE_SIZE);
    Ok(orders)
}

pub fn list_assigned(state: &AppState, rider_id: Uuid) -> Result<Vec<Order>, AppError> {
    require_rider(state, rider_id)?;

    let mut orders: Vec<Order> = state
        .orders
        .iter()
        .filter(|entry| entry.value().assigned_rider == Some(rider_id))
        .map(|entry| entry.value().clone())
        .collect();

    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    orders.truncate(ASSIGNED_PAGE_SIZE);
    Ok(orders)
}

pub fn list_customer_orders(state: &AppState, customer_id: Uuid) -> Result<Vec<Order>, AppError> {
    require_customer(state, customer_id)?;

    let mut orders: Vec<Order> = state
        .orders
        .iter()
        .filter(|entry| entry.value().customer_id == customer_id)
        .map(|entry| entry.value().clone())
        .collect();

    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(orders)
}

/// Single-order view, visible to the owning customer and the assigned
/// rider. Everyone else sees the same answer as a missing order.
pub fn get_order(state: &AppState, caller_id: Uuid, order_id: Uuid) -> Result<Order, AppError> {
    let order = state
        .orders
        .get(&order_id)
        .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

    if order.customer_id != caller_id && order.assigned_rider != Some(caller_id) {
        return Err(AppError::NotFound(format!("order {order_id} not found")));
    }

    Ok(order.clone())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::account::{Account, RiderProfile, Role};
    use crate::state::AppState;

    fn seed_account(state: &AppState, role: Role) -> Uuid {
        let account = Account {
            id: Uuid::new_v4(),
            username: format!("acct-{}", Uuid::new_v4()),
            phone_number: Some("555-0100".to_string()),
            role,
            created_at: Utc::now(),
        };
        let id = account.id;
        state.accounts.insert(id, account);
        id
    }

    fn customer(state: &AppState) -> Uuid {
        seed_account(state, Role::Customer)
    }

    fn rider(state: &AppState) -> Uuid {
        seed_account(
            state,
            Role::Rider(RiderProfile::new("bike".to_string(), None)),
        )
    }

    fn pending_order(state: &AppState, customer_id: Uuid) -> Order {
        create_order(
            state,
            customer_id,
            CreateOrder {
                name: "Lunch box".to_string(),
                description: "Deliver hot lunch to office".to_string(),
                pickup: Waypoint::default(),
                dropoff: Waypoint::default(),
            },
        )
        .unwrap()
    }

    fn total_deliveries(state: &AppState, rider_id: Uuid) -> u64 {
        match &state.accounts.get(&rider_id).unwrap().role {
            Role::Rider(profile) => profile.total_deliveries,
            Role::Customer => panic!("not a rider"),
        }
    }

    #[test]
    fn create_rejects_short_name_without_writing() {
        let state = AppState::new();
        let customer_id = customer(&state);

        let err = create_order(
            &state,
            customer_id,
            CreateOrder {
                name: "ab".to_string(),
                description: "short description ok".to_string(),
                pickup: Waypoint::default(),
                dropoff: Waypoint::default(),
            },
        )
        .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(state.orders.is_empty());
    }

    #[test]
    fn create_rejects_short_description_without_writing() {
        let state = AppState::new();
        let customer_id = customer(&state);

        let err = create_order(
            &state,
            customer_id,
            CreateOrder {
                name: "Lunch box".to_string(),
                description: "short".to_string(),
                pickup: Waypoint::default(),
                dropoff: Waypoint::default(),
            },
        )
        .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(state.orders.is_empty());
    }

    #[test]
    fn create_requires_customer_role() {
        let state = AppState::new();
        let rider_id = rider(&state);

        let err = create_order(
            &state,
            rider_id,
            CreateOrder {
                name: "Lunch box".to_string(),
                description: "Deliver hot lunch to office".to_string(),
                pickup: Waypoint::default(),
                dropoff: Waypoint::default(),
            },
        )
        .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn new_order_is_pending_and_unassigned() {
        let state = AppState::new();
        let customer_id = customer(&state);

        let order = pending_order(&state, customer_id);

        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.assigned_rider.is_none());
        assert!(order.accepted_at.is_none());
        assert!(order.current_position.is_none());
    }

    #[test]
    fn claim_assigns_rider_and_dispatches() {
        let state = AppState::new();
        let customer_id = customer(&state);
        let rider_id = rider(&state);
        let order = pending_order(&state, customer_id);

        let claimed = claim_order(&state, rider_id, order.id).unwrap();

        assert_eq!(claimed.status, OrderStatus::Dispatched);
        assert_eq!(claimed.assigned_rider, Some(rider_id));
        assert!(claimed.accepted_at.is_some());
    }

    #[test]
    fn second_claim_loses() {
        let state = AppState::new();
        let customer_id = customer(&state);
        let first = rider(&state);
        let second = rider(&state);
        let order = pending_order(&state, customer_id);

        claim_order(&state, first, order.id).unwrap();
        let err = claim_order(&state, second, order.id).unwrap_err();

        assert!(matches!(err, AppError::AlreadyClaimed(_)));

        let stored = state.orders.get(&order.id).unwrap();
        assert_eq!(stored.assigned_rider, Some(first));
    }

    #[test]
    fn claim_unknown_order_is_not_found() {
        let state = AppState::new();
        let rider_id = rider(&state);

        let err = claim_order(&state, rider_id, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn claim_requires_rider_role() {
        let state = AppState::new();
        let customer_id = customer(&state);
        let order = pending_order(&state, customer_id);

        let err = claim_order(&state, customer_id, order.id).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn completion_is_idempotent_and_counts_once() {
        let state = AppState::new();
        let customer_id = customer(&state);
        let rider_id = rider(&state);
        let order = pending_order(&state, customer_id);

        claim_order(&state, rider_id, order.id).unwrap();

        let first = complete_delivery(&state, rider_id, order.id).unwrap();
        assert!(!first.already_delivered);
        assert_eq!(first.order.status, OrderStatus::Delivered);
        assert_eq!(total_deliveries(&state, rider_id), 1);

        let second = complete_delivery(&state, rider_id, order.id).unwrap();
        assert!(second.already_delivered);
        assert_eq!(total_deliveries(&state, rider_id), 1);
    }

    #[test]
    fn completion_by_other_rider_is_forbidden() {
        let state = AppState::new();
        let customer_id = customer(&state);
        let assignee = rider(&state);
        let intruder = rider(&state);
        let order = pending_order(&state, customer_id);

        claim_order(&state, assignee, order.id).unwrap();

        let err = complete_delivery(&state, intruder, order.id).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(total_deliveries(&state, assignee), 0);
    }

    #[test]
    fn rider_assignment_tracks_status_at_every_step() {
        let state = AppState::new();
        let customer_id = customer(&state);
        let rider_id = rider(&state);
        let order = pending_order(&state, customer_id);

        let check = |state: &AppState| {
            let stored = state.orders.get(&order.id).unwrap();
            assert_eq!(
                stored.assigned_rider.is_none(),
                stored.status == OrderStatus::Pending
            );
        };

        check(&state);
        claim_order(&state, rider_id, order.id).unwrap();
        check(&state);
        complete_delivery(&state, rider_id, order.id).unwrap();
        check(&state);
    }

    #[test]
    fn claimable_list_skips_assigned_orders_newest_first() {
        let state = AppState::new();
        let customer_id = customer(&state);
        let rider_id = rider(&state);

        let older = pending_order(&state, customer_id);
        let claimed = pending_order(&state, customer_id);
        let newer = pending_order(&state, customer_id);

        claim_order(&state, rider_id, claimed.id).unwrap();

        let claimable = list_claimable(&state, rider_id).unwrap();
        let ids: Vec<Uuid> = claimable.iter().map(|order| order.id).collect();

        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[test]
    fn concurrent_claims_have_single_winner() {
        let state = Arc::new(AppState::new());
        let customer_id = customer(&state);
        let order = pending_order(&state, customer_id);

        let riders: Vec<Uuid> = (0..8).map(|_| rider(&state)).collect();
        let barrier = Arc::new(Barrier::new(riders.len()));

        let handles: Vec<_> = riders
            .iter()
            .map(|&rider_id| {
                let state = state.clone();
                let barrier = barrier.clone();
                let order_id = order.id;
                thread::spawn(move || {
                    barrier.wait();
                    claim_order(&state, rider_id, order_id).map(|order| (rider_id, order))
                })
            })
            .collect();

        let mut winners = Vec::new();
        let mut losses = 0;
        for handle in handles {
            match handle.join().unwrap() {
                Ok((rider_id, order)) => {
                    assert_eq!(order.assigned_rider, Some(rider_id));
                    winners.push(rider_id);
                }
                Err(err) => {
                    assert!(matches!(err, AppError::AlreadyClaimed(_)));
                    losses += 1;
                }
            }
        }

        assert_eq!(winners.len(), 1);
        assert_eq!(losses, riders.len() - 1);

        let stored = state.orders.get(&order.id).unwrap();
        assert_eq!(stored.assigned_rider, Some(winners[0]));
        assert_eq!(stored.status, OrderStatus::Dispatched);
    }
}
