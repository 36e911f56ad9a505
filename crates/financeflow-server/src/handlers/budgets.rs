//! Budget handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;

use financeflow_core::models::{Budget, BudgetUpdate, NewBudget};
use financeflow_core::MonthPeriod;

use super::{parse_body, ApiJson, ApiQuery};
use crate::{AppError, AppState, CurrentUser, SuccessResponse};

/// Optional month filter; both fields or neither
#[derive(Debug, Deserialize)]
pub struct BudgetQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// GET /api/budgets - List budgets, optionally for one month
pub async fn list_budgets(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiQuery(params): ApiQuery<BudgetQuery>,
) -> Result<Json<Vec<Budget>>, AppError> {
    let budgets = match (params.month, params.year) {
        (None, None) => state.db.list_budgets(user.id())?,
        (Some(month), Some(year)) => {
            let period = MonthPeriod::new(month, year).map_err(AppError::from_core)?;
            state
                .db
                .list_budgets_by_period(user.id(), period.month, period.year)?
        }
        _ => {
            return Err(AppError::bad_request(
                "month and year must be given together",
            ))
        }
    };
    Ok(Json(budgets))
}

/// POST /api/budgets - Create a budget
pub async fn create_budget(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(body): ApiJson<serde_json::Value>,
) -> Result<Json<Budget>, AppError> {
    let budget: NewBudget = parse_body(body, "budget")?;
    let created = state
        .db
        .create_budget(user.id(), &budget)
        .map_err(AppError::from_core)?;
    Ok(Json(created))
}

/// PUT /api/budgets/:id - Partially update a budget
pub async fn update_budget(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<serde_json::Value>,
) -> Result<Json<Budget>, AppError> {
    let updates: BudgetUpdate = parse_body(body, "update")?;
    state
        .db
        .update_budget(&id, user.id(), &updates)
        .map_err(AppError::from_core)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Budget not found"))
}

/// DELETE /api/budgets/:id - Delete a budget
pub async fn delete_budget(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    if !state.db.delete_budget(&id, user.id())? {
        return Err(AppError::not_found("Budget not found"));
    }
    Ok(Json(SuccessResponse { success: true }))
}
