//! Employee API endpoints - JSON API

use axum::extract::{Path, State};
use axum::Json;
use txfeed_core::TransactionSource;
use txfeed_data::{Employee, Transaction};

use crate::{ApiError, AppState};

/// Get the employee directory, in dataset order
pub async fn api_employees(state: State<AppState>) -> Result<Json<Vec<Employee>>, ApiError> {
    let employees = state.source.fetch_employees().await?;
    Ok(Json(employees))
}

/// Get every transaction of one employee
pub async fn api_employee_transactions(
    state: State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    if id.trim().is_empty() {
        return Err(ApiError::BadRequest {
            message: "employee id must not be empty".to_string(),
        });
    }

    let transactions = state.source.fetch_transactions_for_employee(&id).await?;
    Ok(Json(transactions))
}
