//! Financial health score

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::summary::MonthlySummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthLabel {
    Excellent,
    Good,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

impl HealthLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::NeedsImprovement => "Needs Improvement",
        }
    }

    fn for_score(score: u32) -> Self {
        match score {
            s if s >= 80 => Self::Excellent,
            s if s >= 60 => Self::Good,
            _ => Self::NeedsImprovement,
        }
    }
}

impl std::fmt::Display for HealthLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    /// 0..=100
    pub score: u32,
    pub label: HealthLabel,
}

/// Score a month: up to 40 points for the savings rate (full marks at 20%),
/// up to 30 for keeping expenses below income, and a flat 30.
pub fn health_score(summary: &MonthlySummary) -> HealthScore {
    let savings_part = (summary.savings_rate / 20.0 * 40.0).min(40.0);

    let expense_part = if summary.total_income.is_zero() {
        0.0
    } else {
        // An unrepresentable ratio means expenses dwarf income
        match summary
            .total_expenses
            .checked_div(summary.total_income)
            .and_then(|ratio| ratio.to_f64())
        {
            Some(ratio) => (30.0 - ratio * 30.0).max(0.0),
            None => 0.0,
        }
    };

    let raw = (savings_part + expense_part + 30.0).clamp(0.0, 100.0);
    let score = raw.round() as u32;

    HealthScore {
        score,
        label: HealthLabel::for_score(score),
    }
}
