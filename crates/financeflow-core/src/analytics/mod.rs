//! Analytics - derived views over a user's transactions
//!
//! The submodules are pure functions of the snapshot they are given:
//!
//! - **summary** - Monthly income/expense totals and per-category breakdown
//! - **forecast** - Next-period spending prediction per category, plus advice
//! - **health** - A 0-100 financial health score
//! - **trend** - Daily expense totals over a short window
//!
//! [`AnalysisContext`] composes them with the record store for one user.
//!
//! ```rust,ignore
//! use financeflow_core::analytics::AnalysisContext;
//!
//! let ctx = AnalysisContext::new(&db, "demo-user");
//! let summary = ctx.monthly_summary(MonthPeriod::new(12, 2024)?)?;
//! ```

pub mod forecast;
pub mod health;
pub mod summary;
pub mod trend;

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

use crate::db::Database;
use crate::error::Result;
use crate::models::UNCATEGORIZED;
use crate::period::MonthPeriod;

pub use forecast::{
    generate_recommendations, predict_next_period, BudgetPrediction, TransactionSample, Trend,
};
pub use health::{health_score, HealthLabel, HealthScore};
pub use summary::{
    breakdown_by_category, summarize, CategoryBreakdown, CategoryTotal, MonthlySummary,
};
pub use trend::{daily_expenses, DailySpending};

/// Record-store reads plus the pure analytics, scoped to one user
pub struct AnalysisContext<'a> {
    pub db: &'a Database,
    pub owner_id: &'a str,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(db: &'a Database, owner_id: &'a str) -> Self {
        Self { db, owner_id }
    }

    pub fn monthly_summary(&self, period: MonthPeriod) -> Result<MonthlySummary> {
        let (start, end) = period.range();
        let transactions = self
            .db
            .list_transactions_in_range(self.owner_id, start, end)?;
        summarize(&transactions)
    }

    pub fn category_breakdown(&self, period: MonthPeriod) -> Result<CategoryBreakdown> {
        let (start, end) = period.range();
        let transactions = self
            .db
            .list_transactions_in_range(self.owner_id, start, end)?;
        let categories = self.db.list_categories(self.owner_id)?;
        breakdown_by_category(&transactions, &categories)
    }

    pub fn health_score(&self, period: MonthPeriod) -> Result<HealthScore> {
        Ok(health_score(&self.monthly_summary(period)?))
    }

    /// Full history as forecast samples, oldest first
    fn samples(&self) -> Result<Vec<TransactionSample>> {
        let categories = self.db.list_categories(self.owner_id)?;
        let names: HashMap<&str, &str> = categories
            .iter()
            .map(|c| (c.id.as_str(), c.name.as_str()))
            .collect();

        let transactions = self.db.list_transactions_chronological(self.owner_id)?;
        Ok(transactions
            .iter()
            .map(|tx| TransactionSample {
                amount: tx.amount.to_f64().unwrap_or(0.0),
                category: tx
                    .category_id
                    .as_deref()
                    .and_then(|id| names.get(id).copied())
                    .unwrap_or(UNCATEGORIZED)
                    .to_string(),
                kind: tx.kind,
            })
            .collect())
    }

    pub fn predictions(&self) -> Result<Vec<BudgetPrediction>> {
        let samples = self.samples()?;
        let predictions = predict_next_period(&samples);
        debug!(
            owner = self.owner_id,
            samples = samples.len(),
            categories = predictions.len(),
            "Forecast computed"
        );
        Ok(predictions)
    }

    pub fn recommendations(&self) -> Result<Vec<String>> {
        Ok(generate_recommendations(&self.predictions()?))
    }

    /// Daily expenses for the `days` days ending on `end`
    pub fn spending_trend(&self, end: NaiveDate, days: u32) -> Result<Vec<DailySpending>> {
        let start = end - chrono::Duration::days(i64::from(days.saturating_sub(1)));
        let from = start.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
        let to = end.and_hms_opt(23, 59, 59).unwrap_or_default().and_utc();

        let transactions = self.db.list_transactions_in_range(self.owner_id, from, to)?;
        daily_expenses(&transactions, end, days)
    }
}
