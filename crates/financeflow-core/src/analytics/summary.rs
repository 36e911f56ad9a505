//! Monthly summary and per-category breakdown

use std::collections::{BTreeMap, HashMap};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Category, Kind, Transaction, UNCATEGORIZED, UNCATEGORIZED_COLOR};

/// Income/expense totals over a set of transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expenses: Decimal,
    /// May be negative
    #[serde(with = "rust_decimal::serde::float")]
    pub net_savings: Decimal,
    /// Percent of income saved, one decimal place; 0 when there is no income
    pub savings_rate: f64,
    pub transaction_count: usize,
}

/// Expense total and display color for one category name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub color: String,
}

/// Category name to expense total, ordered by name
pub type CategoryBreakdown = BTreeMap<String, CategoryTotal>;

/// Reduce transactions to income, expense and savings totals
///
/// Fails with [`Error::DataIntegrity`] when stored amounts are too large to
/// total.
pub fn summarize(transactions: &[Transaction]) -> Result<MonthlySummary> {
    let mut total_income = Decimal::ZERO;
    let mut total_expenses = Decimal::ZERO;

    for tx in transactions {
        let total = match tx.kind {
            Kind::Income => &mut total_income,
            Kind::Expense => &mut total_expenses,
        };
        *total = total.checked_add(tx.amount).ok_or_else(overflow)?;
    }

    let net_savings = total_income
        .checked_sub(total_expenses)
        .ok_or_else(overflow)?;
    let savings_rate = if total_income.is_zero() {
        0.0
    } else {
        net_savings
            .checked_div(total_income)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(overflow)?
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
            .to_f64()
            .unwrap_or(0.0)
    };

    Ok(MonthlySummary {
        total_income,
        total_expenses,
        net_savings,
        savings_rate,
        transaction_count: transactions.len(),
    })
}

fn overflow() -> Error {
    Error::DataIntegrity("Stored amounts are too large to total".to_string())
}

/// Sum expense amounts per category name
///
/// Transactions whose category is missing or unknown land in
/// `Uncategorized`. When two categories share a name, the bucket keeps the
/// color of the first one seen.
pub fn breakdown_by_category(
    transactions: &[Transaction],
    categories: &[Category],
) -> Result<CategoryBreakdown> {
    let by_id: HashMap<&str, &Category> = categories.iter().map(|c| (c.id.as_str(), c)).collect();
    let mut breakdown = CategoryBreakdown::new();

    for tx in transactions.iter().filter(|t| t.kind == Kind::Expense) {
        let category = tx
            .category_id
            .as_deref()
            .and_then(|id| by_id.get(id).copied());
        let (name, color) = match category {
            Some(c) => (c.name.as_str(), c.color.as_str()),
            None => (UNCATEGORIZED, UNCATEGORIZED_COLOR),
        };

        let bucket = breakdown
            .entry(name.to_string())
            .or_insert_with(|| CategoryTotal {
                amount: Decimal::ZERO,
                color: color.to_string(),
            });
        bucket.amount = bucket.amount.checked_add(tx.amount).ok_or_else(overflow)?;
    }

    Ok(breakdown)
}
