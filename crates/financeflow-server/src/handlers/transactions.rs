//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;

use financeflow_core::models::{NewTransaction, Transaction, TransactionUpdate};

use super::{parse_body, ApiJson, ApiQuery};
use crate::{AppError, AppState, CurrentUser, SuccessResponse, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

/// Query parameters for listing transactions
#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}

/// GET /api/transactions - List transactions, newest first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiQuery(params): ApiQuery<TransactionQuery>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    // Input validation: clamp pagination parameters
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);
    let offset = params.offset.max(0);

    Ok(Json(state.db.list_transactions(user.id(), limit, offset)?))
}

/// POST /api/transactions - Record a transaction
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(body): ApiJson<serde_json::Value>,
) -> Result<Json<Transaction>, AppError> {
    let tx: NewTransaction = parse_body(body, "transaction")?;
    let created = state
        .db
        .create_transaction(user.id(), &tx)
        .map_err(AppError::from_core)?;
    Ok(Json(created))
}

/// PUT /api/transactions/:id - Partially update a transaction
pub async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<serde_json::Value>,
) -> Result<Json<Transaction>, AppError> {
    let updates: TransactionUpdate = parse_body(body, "update")?;
    state
        .db
        .update_transaction(&id, user.id(), &updates)
        .map_err(AppError::from_core)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Transaction not found"))
}

/// DELETE /api/transactions/:id - Delete a transaction
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    if !state.db.delete_transaction(&id, user.id())? {
        return Err(AppError::not_found("Transaction not found"));
    }
    Ok(Json(SuccessResponse { success: true }))
}
