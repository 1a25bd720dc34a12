use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::location::LocationEvent;
use crate::models::order::{GeoPoint, Order, OrderStatus, PositionFix, Waypoint};
use crate::state::AppState;

pub const HISTORY_PAGE_SIZE: usize = 50;

/// Owner-facing tracking snapshot. Substructures stay `None` until their
/// coordinates exist; (0, 0) is a real place, never an "unset" marker.
#[derive(Debug, Serialize)]
pub struct LocationSnapshot {
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub pickup: Option<TrackedPoint>,
    pub dropoff: Option<TrackedPoint>,
    pub current: Option<PositionFix>,
}

#[derive(Debug, Serialize)]
pub struct TrackedPoint {
    pub address: Option<String>,
    pub point: GeoPoint,
}

/// Append a location sample and refresh the order's current-position
/// projection. The history entry lands first; it is the authoritative
/// record the projection can be rebuilt from.
pub fn record_location(
    state: &AppState,
    order_id: Uuid,
    point: GeoPoint,
    note: Option<String>,
) -> Result<LocationEvent, AppError> {
    let mut order = state
        .orders
        .get_mut(&order_id)
        .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

    let recorded_at = Utc::now();
    let event = LocationEvent {
        id: Uuid::new_v4(),
        order_id,
        point: point.clone(),
        note,
        recorded_at,
    };

    state
        .location_log
        .entry(order_id)
        .or_default()
        .push(event.clone());

    order.current_position = Some(PositionFix {
        point,
        updated_at: recorded_at,
    });

    state.metrics.location_updates_total.inc();
    info!(
        order_id = %order_id,
        lat = event.point.lat,
        lng = event.point.lng,
        "location recorded"
    );

    Ok(event)
}

pub fn current_location(
    state: &AppState,
    customer_id: Uuid,
    order_id: Uuid,
) -> Result<LocationSnapshot, AppError> {
    let order = owned_order(state, customer_id, order_id)?;

    Ok(LocationSnapshot {
        order_id: order.id,
        status: order.status.clone(),
        pickup: waypoint_snapshot(&order.pickup),
        dropoff: waypoint_snapshot(&order.dropoff),
        current: order.current_position.clone(),
    })
}

pub fn location_history(
    state: &AppState,
    customer_id: Uuid,
    order_id: Uuid,
) -> Result<Vec<LocationEvent>, AppError> {
    owned_order(state, customer_id, order_id)?;

    let mut events = state
        .location_log
        .get(&order_id)
        .map(|entries| entries.value().clone())
        .unwrap_or_default();

    // Appended oldest-first; presented newest-first.
    events.reverse();
    events.truncate(HISTORY_PAGE_SIZE);
    Ok(events)
}

fn owned_order(state: &AppState, customer_id: Uuid, order_id: Uuid) -> Result<Order, AppError> {
    let order = state
        .orders
        .get(&order_id)
        .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

    if order.customer_id != customer_id {
        return Err(AppError::NotFound(format!("order {order_id} not found")));
    }

    Ok(order.clone())
}

fn waypoint_snapshot(waypoint: &Waypoint) -> Option<TrackedPoint> {
    waypoint.point.clone().map(|point| TrackedPoint {
        address: waypoint.address.clone(),
        point,
    })
}
