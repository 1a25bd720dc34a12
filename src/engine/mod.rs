pub mod lifecycle;
pub mod location;
pub mod stats;

use uuid::Uuid;

use crate::error::AppError;
use crate::models::account::Role;
use crate::state::AppState;

/// Role gates for the two caller kinds. Callers are identified explicitly
/// by account id; an unknown id is treated the same as a role mismatch.
pub(crate) fn require_customer(state: &AppState, account_id: Uuid) -> Result<(), AppError> {
    let account = state
        .accounts
        .get(&account_id)
        .ok_or_else(|| AppError::Forbidden(format!("unknown account {account_id}")))?;

    match account.role {
        Role::Customer => Ok(()),
        Role::Rider(_) => Err(AppError::Forbidden(
            "this operation is for customers only".to_string(),
        )),
    }
}

pub(crate) fn require_rider(state: &AppState, account_id: Uuid) -> Result<(), AppError> {
    let account = state
        .accounts
        .get(&account_id)
        .ok_or_else(|| AppError::Forbidden(format!("unknown account {account_id}")))?;

    match account.role {
        Role::Rider(_) => Ok(()),
        Role::Customer => Err(AppError::Forbidden(
            "this operation is for riders only".to_string(),
        )),
    }
}
