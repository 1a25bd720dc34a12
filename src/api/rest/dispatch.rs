use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use uuid::Uuid;

use crate::api::rest::Caller;
use crate::engine::lifecycle::{self, CompletionReceipt};
use crate::engine::stats;
use crate::error::AppError;
use crate::models::order::Order;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dispatch/available", get(available_orders))
        .route("/dispatch/assigned", get(assigned_orders))
        .route("/dispatch/stats", get(rider_stats))
        .route("/dispatch/orders/:id/claim", post(claim_order))
        .route("/dispatch/orders/:id/complete", post(complete_delivery))
}

async fn available_orders(
    State(state): State<Arc<AppState>>,
    Caller(rider_id): Caller,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(lifecycle::list_claimable(&state, rider_id)?))
}

async fn assigned_orders(
    State(state): State<Arc<AppState>>,
    Caller(rider_id): Caller,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(lifecycle::list_assigned(&state, rider_id)?))
}

async fn rider_stats(
    State(state): State<Arc<AppState>>,
    Caller(rider_id): Caller,
) -> Result<Json<stats::RiderStats>, AppError> {
    Ok(Json(stats::rider_stats(&state, rider_id)?))
}

async fn claim_order(
    State(state): State<Arc<AppState>>,
    Caller(rider_id): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(lifecycle::claim_order(&state, rider_id, id)?))
}

async fn complete_delivery(
    State(state): State<Arc<AppState>>,
    Caller(rider_id): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<CompletionReceipt>, AppError> {
    Ok(Json(lifecycle::complete_delivery(&state, rider_id, id)?))
}
