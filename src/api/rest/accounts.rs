use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::account::{Account, RiderProfile, Role};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/accounts", post(register_account))
        .route("/accounts/:id", get(get_account))
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegisterRole {
    Customer,
    Rider,
}

#[derive(Deserialize)]
pub struct RegisterAccountRequest {
    pub username: String,
    pub role: RegisterRole,
    pub phone_number: Option<String>,
    pub vehicle_type: Option<String>,
    pub license_number: Option<String>,
}

async fn register_account(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterAccountRequest>,
) -> Result<Json<Account>, AppError> {
    let username = payload.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::Validation("username cannot be empty".to_string()));
    }

    if state
        .accounts
        .iter()
        .any(|entry| entry.value().username == username)
    {
        return Err(AppError::Validation("username already exists".to_string()));
    }

    let phone_number = payload
        .phone_number
        .as_deref()
        .map(str::trim)
        .filter(|phone| !phone.is_empty())
        .map(str::to_string);

    let role = match payload.role {
        RegisterRole::Customer => Role::Customer,
        RegisterRole::Rider => {
            let vehicle_type = payload
                .vehicle_type
                .as_deref()
                .map(str::trim)
                .filter(|vehicle| !vehicle.is_empty());

            match (&phone_number, vehicle_type) {
                (Some(_), Some(vehicle_type)) => Role::Rider(RiderProfile::new(
                    vehicle_type.to_string(),
                    payload.license_number.clone(),
                )),
                _ => {
                    return Err(AppError::Validation(
                        "phone number and vehicle type are required for riders".to_string(),
                    ));
                }
            }
        }
    };

    let account = Account {
        id: Uuid::new_v4(),
        username,
        phone_number,
        role,
        created_at: Utc::now(),
    };

    state.accounts.insert(account.id, account.clone());
    tracing::info!(account_id = %account.id, "account registered");

    Ok(Json(account))
}

async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Account>, AppError> {
    let account = state
        .accounts
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("account {id} not found")))?;

    Ok(Json(account.value().clone()))
}
