//! Savings goal handlers

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;

use financeflow_core::models::{Goal, GoalUpdate, NewGoal};

use super::{parse_body, ApiJson};
use crate::{AppError, AppState, CurrentUser, SuccessResponse};

/// A goal plus its display progress, computed at response time
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalResponse {
    #[serde(flatten)]
    pub goal: Goal,
    pub progress_percent: f64,
    pub time_left: String,
}

impl From<Goal> for GoalResponse {
    fn from(goal: Goal) -> Self {
        Self {
            progress_percent: goal.progress_percent(),
            time_left: goal.time_left(Utc::now()),
            goal,
        }
    }
}

fn respond(goal: Goal) -> Json<GoalResponse> {
    Json(goal.into())
}

/// GET /api/goals - List the user's goals
pub async fn list_goals(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<GoalResponse>>, AppError> {
    let goals = state.db.list_goals(user.id())?;
    Ok(Json(goals.into_iter().map(GoalResponse::from).collect()))
}

/// POST /api/goals - Create a goal with zero progress
pub async fn create_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(body): ApiJson<serde_json::Value>,
) -> Result<Json<GoalResponse>, AppError> {
    let goal: NewGoal = parse_body(body, "goal")?;
    let created = state
        .db
        .create_goal(user.id(), &goal)
        .map_err(AppError::from_core)?;
    Ok(respond(created))
}

/// PUT /api/goals/:id - Partially update a goal
pub async fn update_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<serde_json::Value>,
) -> Result<Json<GoalResponse>, AppError> {
    let updates: GoalUpdate = parse_body(body, "update")?;
    state
        .db
        .update_goal(&id, user.id(), &updates)
        .map_err(AppError::from_core)?
        .map(respond)
        .ok_or_else(|| AppError::not_found("Goal not found"))
}

/// POST /api/goals/:id/progress - Add `{ "amount": <number> }` to a goal
///
/// The amount must be a JSON number; strings are rejected.
pub async fn update_goal_progress(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<serde_json::Value>,
) -> Result<Json<GoalResponse>, AppError> {
    let amount = body
        .get("amount")
        .filter(|v| v.is_number())
        .map(|v| v.to_string())
        .and_then(|n| {
            Decimal::from_str(&n)
                .or_else(|_| Decimal::from_scientific(&n))
                .ok()
        })
        .ok_or_else(|| AppError::bad_request("Amount must be a number"))?;

    state
        .db
        .update_goal_progress(&id, user.id(), amount)
        .map_err(AppError::from_core)?
        .map(respond)
        .ok_or_else(|| AppError::not_found("Goal not found"))
}

/// DELETE /api/goals/:id - Delete a goal
pub async fn delete_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    if !state.db.delete_goal(&id, user.id())? {
        return Err(AppError::not_found("Goal not found"));
    }
    Ok(Json(SuccessResponse { success: true }))
}
