use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::rest::Caller;
use crate::engine::lifecycle::{self, CreateOrder};
use crate::engine::location;
use crate::engine::stats;
use crate::error::AppError;
use crate::models::location::LocationEvent;
use crate::models::order::{GeoPoint, Order, Waypoint};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/stats", get(order_stats))
        .route("/orders/:id", get(get_order))
        .route(
            "/orders/:id/location",
            post(record_location).get(current_location),
        )
        .route("/orders/:id/history", get(location_history))
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub pickup: Waypoint,
    #[serde(default)]
    pub dropoff: Waypoint,
}

#[derive(Deserialize)]
pub struct RecordLocationRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub note: Option<String>,
}

#[derive(Serialize)]
pub struct RecordLocationAck {
    pub event_id: Uuid,
    pub recorded_at: DateTime<Utc>,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Caller(customer_id): Caller,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    let order = lifecycle::create_order(
        &state,
        customer_id,
        CreateOrder {
            name: payload.name,
            description: payload.description,
            pickup: payload.pickup,
            dropoff: payload.dropoff,
        },
    )?;

    Ok(Json(order))
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    Caller(customer_id): Caller,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(lifecycle::list_customer_orders(&state, customer_id)?))
}

async fn order_stats(
    State(state): State<Arc<AppState>>,
    Caller(customer_id): Caller,
) -> Result<Json<stats::CustomerStats>, AppError> {
    Ok(Json(stats::customer_stats(&state, customer_id)?))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Caller(caller_id): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(lifecycle::get_order(&state, caller_id, id)?))
}

// Deliberately unauthenticated, matching the system ingestion endpoint:
// anyone holding the order id may push a sample.
async fn record_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordLocationRequest>,
) -> Result<Json<RecordLocationAck>, AppError> {
    let (Some(latitude), Some(longitude)) = (payload.latitude, payload.longitude) else {
        return Err(AppError::Validation(
            "latitude and longitude are required".to_string(),
        ));
    };

    let event = location::record_location(
        &state,
        id,
        GeoPoint {
            lat: latitude,
            lng: longitude,
        },
        payload.note,
    )?;

    Ok(Json(RecordLocationAck {
        event_id: event.id,
        recorded_at: event.recorded_at,
    }))
}

async fn current_location(
    State(state): State<Arc<AppState>>,
    Caller(customer_id): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<location::LocationSnapshot>, AppError> {
    Ok(Json(location::current_location(&state, customer_id, id)?))
}

async fn location_history(
    State(state): State<Arc<AppState>>,
    Caller(customer_id): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<LocationEvent>>, AppError> {
    Ok(Json(location::location_history(&state, customer_id, id)?))
}
