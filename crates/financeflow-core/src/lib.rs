//! FinanceFlow Core Library
//!
//! Shared functionality for the FinanceFlow personal finance tracker:
//! - Domain models (transactions, categories, goals, budgets, users)
//! - Record store with owner-scoped queries and migrations
//! - Analytics: monthly summaries, category breakdowns, forecasting,
//!   health score and daily spending trend
//! - Calendar period resolution for reports
//! - Password hashing

pub mod analytics;
pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod period;

pub use analytics::{
    AnalysisContext, BudgetPrediction, CategoryBreakdown, DailySpending, HealthLabel,
    HealthScore, MonthlySummary, Trend,
};
pub use db::Database;
pub use error::{Error, Result};
pub use period::MonthPeriod;
