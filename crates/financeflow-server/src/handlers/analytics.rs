//! Analytics handlers

use std::sync::Arc;

use axum::{
    extract::State,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;

use financeflow_core::analytics::{
    AnalysisContext, BudgetPrediction, CategoryBreakdown, DailySpending, HealthScore,
    MonthlySummary,
};
use financeflow_core::MonthPeriod;

use super::ApiQuery;
use crate::{AppError, AppState, CurrentUser, MAX_TREND_DAYS};

/// `?month=&year=`; each defaults to the current one
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl PeriodQuery {
    fn resolve(&self) -> Result<MonthPeriod, AppError> {
        MonthPeriod::resolve(self.month, self.year, Utc::now().date_naive())
            .map_err(AppError::from_core)
    }
}

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    #[serde(default = "default_trend_days")]
    pub days: u32,
}

fn default_trend_days() -> u32 {
    7
}

/// GET /api/analytics/monthly-summary - Income, expenses and savings for a month
pub async fn get_monthly_summary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiQuery(params): ApiQuery<PeriodQuery>,
) -> Result<Json<MonthlySummary>, AppError> {
    let period = params.resolve()?;
    let ctx = AnalysisContext::new(&state.db, user.id());
    Ok(Json(ctx.monthly_summary(period)?))
}

/// GET /api/analytics/category-breakdown - Expenses by category for a month
pub async fn get_category_breakdown(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiQuery(params): ApiQuery<PeriodQuery>,
) -> Result<Json<CategoryBreakdown>, AppError> {
    let period = params.resolve()?;
    let ctx = AnalysisContext::new(&state.db, user.id());
    Ok(Json(ctx.category_breakdown(period)?))
}

/// GET /api/analytics/health-score - Health score for a month
pub async fn get_health_score(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiQuery(params): ApiQuery<PeriodQuery>,
) -> Result<Json<HealthScore>, AppError> {
    let period = params.resolve()?;
    let ctx = AnalysisContext::new(&state.db, user.id());
    Ok(Json(ctx.health_score(period)?))
}

/// GET /api/analytics/predictions - Next-period spending per category
pub async fn get_predictions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<BudgetPrediction>>, AppError> {
    let ctx = AnalysisContext::new(&state.db, user.id());
    Ok(Json(ctx.predictions()?))
}

/// GET /api/analytics/recommendations - Advice derived from the predictions
pub async fn get_recommendations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<String>>, AppError> {
    let ctx = AnalysisContext::new(&state.db, user.id());
    Ok(Json(ctx.recommendations()?))
}

/// GET /api/analytics/spending-trend - Daily expenses for the last `days` days
pub async fn get_spending_trend(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiQuery(params): ApiQuery<TrendQuery>,
) -> Result<Json<Vec<DailySpending>>, AppError> {
    if !(1..=MAX_TREND_DAYS).contains(&params.days) {
        return Err(AppError::bad_request(&format!(
            "days must be between 1 and {}",
            MAX_TREND_DAYS
        )));
    }

    let ctx = AnalysisContext::new(&state.db, user.id());
    let today = Utc::now().date_naive();
    Ok(Json(ctx.spending_trend(today, params.days)?))
}
