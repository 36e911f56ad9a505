//! Daily spending trend

use chrono::{Duration, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Kind, Transaction};

/// Expense total for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySpending {
    pub date: NaiveDate,
    /// Short weekday name, e.g. "Mon"
    pub label: String,
    /// Rounded to the nearest whole unit
    pub expenses: i64,
}

/// Expense totals for the `days` calendar days ending on `end` (inclusive),
/// oldest first. Days without expenses are reported as zero.
pub fn daily_expenses(
    transactions: &[Transaction],
    end: NaiveDate,
    days: u32,
) -> Result<Vec<DailySpending>> {
    (0..days)
        .rev()
        .filter_map(|offset| end.checked_sub_signed(Duration::days(i64::from(offset))))
        .map(|date| {
            let total = transactions
                .iter()
                .filter(|t| t.kind == Kind::Expense && t.occurred_at.date_naive() == date)
                .try_fold(Decimal::ZERO, |acc, t| acc.checked_add(t.amount))
                .and_then(|total| {
                    total
                        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                        .to_i64()
                })
                .ok_or_else(|| {
                    Error::DataIntegrity(format!("Expenses on {} are too large to total", date))
                })?;

            Ok(DailySpending {
                date,
                label: date.format("%a").to_string(),
                expenses: total,
            })
        })
        .collect()
}
