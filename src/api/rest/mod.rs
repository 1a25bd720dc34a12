pub mod accounts;
pub mod dispatch;
pub mod orders;

use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(accounts::router())
        .merge(orders::router())
        .merge(dispatch::router())
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Explicit caller identity, taken from the `x-account-id` header. There
/// is no session state; every operation names its principal.
pub struct Caller(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get("x-account-id")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Forbidden("missing x-account-id header".to_string()))?;

        let id = raw
            .parse::<Uuid>()
            .map_err(|_| AppError::Forbidden("x-account-id is not a valid account id".to_string()))?;

        Ok(Caller(id))
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    accounts: usize,
    orders: usize,
    location_events: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let location_events: usize = state
        .location_log
        .iter()
        .map(|entry| entry.value().len())
        .sum();

    Json(HealthResponse {
        status: "ok",
        accounts: state.accounts.len(),
        orders: state.orders.len(),
        location_events,
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}
