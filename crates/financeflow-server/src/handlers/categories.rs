//! Category handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use financeflow_core::models::{Category, NewCategory};

use super::{parse_body, ApiJson};
use crate::{AppError, AppState, CurrentUser, SuccessResponse};

/// GET /api/categories - List the user's categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.db.list_categories(user.id())?))
}

/// POST /api/categories - Create a category
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(body): ApiJson<serde_json::Value>,
) -> Result<Json<Category>, AppError> {
    let category: NewCategory = parse_body(body, "category")?;
    let created = state
        .db
        .create_category(user.id(), &category)
        .map_err(AppError::from_core)?;
    Ok(Json(created))
}

/// DELETE /api/categories/:id - Delete a category
///
/// Transactions and budgets in the category become uncategorized.
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    if !state.db.delete_category(&id, user.id())? {
        return Err(AppError::not_found("Category not found"));
    }
    Ok(Json(SuccessResponse { success: true }))
}
