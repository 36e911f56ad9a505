//! Domain models for FinanceFlow
//!
//! JSON field names follow the web client's camelCase contract
//! (`userId`, `categoryId`, `type`, `date`, ...).

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Display name used for transactions without a resolvable category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Color used for the `Uncategorized` bucket
pub const UNCATEGORIZED_COLOR: &str = "#6B7280";

/// Largest magnitude accepted for a single amount or balance (one trillion)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Round a money amount to cents, midpoint away from zero
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Income vs. expense discriminator for transactions and categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Income,
    Expense,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown kind: {}", s)),
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered user
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

/// Public view of a user returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// A spending or income category owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    #[serde(rename = "userId")]
    pub owner_id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    #[serde(rename = "type")]
    pub kind: Kind,
}

/// A category to be created
#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub icon: String,
    pub color: String,
    #[serde(rename = "type")]
    pub kind: Kind,
}

impl NewCategory {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidData("Category name is required".to_string()));
        }
        Ok(())
    }
}

/// A financial transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "userId")]
    pub owner_id: String,
    pub category_id: Option<String>,
    /// Non-negative magnitude; direction comes from `kind`
    pub amount: Decimal,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: Kind,
    #[serde(rename = "date")]
    pub occurred_at: DateTime<Utc>,
}

/// A transaction to be recorded (before DB insertion)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(default)]
    pub category_id: Option<String>,
    pub amount: Decimal,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: Kind,
    /// Defaults to the time of insertion
    #[serde(default, rename = "date")]
    pub occurred_at: Option<DateTime<Utc>>,
}

impl NewTransaction {
    pub fn validate(&self) -> Result<()> {
        validate_amount(self.amount)?;
        if self.description.trim().is_empty() {
            return Err(Error::InvalidData("Description is required".to_string()));
        }
        Ok(())
    }
}

/// Partial update of a transaction; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    pub category_id: Option<String>,
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<Kind>,
    #[serde(rename = "date")]
    pub occurred_at: Option<DateTime<Utc>>,
}

impl TransactionUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }
        if let Some(description) = &self.description {
            if description.trim().is_empty() {
                return Err(Error::InvalidData("Description is required".to_string()));
            }
        }
        Ok(())
    }
}

fn validate_amount(amount: Decimal) -> Result<()> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::InvalidData(
            "Amount must be a non-negative magnitude".to_string(),
        ));
    }
    check_amount_bound(amount)
}

/// Reject magnitudes above [`MAX_AMOUNT`]
pub fn check_amount_bound(amount: Decimal) -> Result<()> {
    if amount.abs() > MAX_AMOUNT {
        return Err(Error::InvalidData(format!(
            "Amount must not exceed {}",
            MAX_AMOUNT
        )));
    }
    Ok(())
}

/// A savings goal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    #[serde(rename = "userId")]
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub deadline: Option<DateTime<Utc>>,
    /// Derived: current_amount >= target_amount
    pub achieved: bool,
}

impl Goal {
    /// Percent of the target reached, capped at 100
    pub fn progress_percent(&self) -> f64 {
        use rust_decimal::prelude::ToPrimitive;

        if self.target_amount <= Decimal::ZERO {
            return 0.0;
        }
        let pct = self
            .current_amount
            .checked_div(self.target_amount)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .and_then(|pct| pct.to_f64());
        match pct {
            Some(pct) => pct.clamp(0.0, 100.0),
            // Only out-of-range stored balances overflow
            None if self.current_amount.is_sign_negative() => 0.0,
            None => 100.0,
        }
    }

    /// Human-readable time remaining until the deadline
    pub fn time_left(&self, now: DateTime<Utc>) -> String {
        let Some(deadline) = self.deadline else {
            return "No deadline".to_string();
        };

        // Whole days, rounded up
        let days = ((deadline - now).num_seconds() as f64 / 86_400.0).ceil() as i64;

        match days {
            d if d < 0 => "Overdue".to_string(),
            0 => "Due today".to_string(),
            1 => "1 day left".to_string(),
            d if d < 30 => format!("{} days left", d),
            d => {
                let months = (d as f64 / 30.0).ceil() as i64;
                format!("{} month{} left", months, if months == 1 { "" } else { "s" })
            }
        }
    }
}

/// A goal to be created; progress starts at zero
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub target_amount: Decimal,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

impl NewGoal {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidData("Goal title is required".to_string()));
        }
        validate_amount(self.target_amount)
    }
}

/// Partial update of a goal
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_amount: Option<Decimal>,
    pub deadline: Option<DateTime<Utc>>,
}

impl GoalUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(target) = self.target_amount {
            validate_amount(target)?;
        }
        Ok(())
    }
}

/// Budget period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::str::FromStr for BudgetPeriod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!("Unknown budget period: {}", s)),
        }
    }
}

/// A spending limit for a category and period
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    #[serde(rename = "userId")]
    pub owner_id: String,
    pub category_id: Option<String>,
    pub amount: Decimal,
    pub period: BudgetPeriod,
    pub month: u32,
    pub year: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    #[serde(default)]
    pub category_id: Option<String>,
    pub amount: Decimal,
    pub period: BudgetPeriod,
    pub month: u32,
    pub year: i32,
}

impl NewBudget {
    pub fn validate(&self) -> Result<()> {
        validate_amount(self.amount)?;
        validate_month(self.month)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetUpdate {
    pub category_id: Option<String>,
    pub amount: Option<Decimal>,
    pub period: Option<BudgetPeriod>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl BudgetUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }
        if let Some(month) = self.month {
            validate_month(month)?;
        }
        Ok(())
    }
}

fn validate_month(month: u32) -> Result<()> {
    if !(1..=12).contains(&month) {
        return Err(Error::InvalidData(format!(
            "Month must be between 1 and 12, got {}",
            month
        )));
    }
    Ok(())
}
