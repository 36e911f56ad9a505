//! Per-category budget forecasting
//!
//! A simple moving-average predictor: for each expense category, take the
//! most recent amounts, compare the older half against the newer half to
//! classify a trend, nudge the average in that direction, and derive a
//! confidence from how consistent the amounts are.
//!
//! Input order matters. Samples must be in ascending time order so that the
//! trailing window is the most recent spending.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::Kind;

/// Number of trailing amounts per category considered
pub const WINDOW: usize = 6;

/// Relative change between halves needed to call a trend
const TREND_THRESHOLD: f64 = 0.10;

/// Recommendation threshold for the potential savings line, in currency units
const SAVINGS_RECOMMENDATION_MIN: f64 = 50.0;

/// Minimal view of a transaction for forecasting
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionSample {
    pub amount: f64,
    /// Category display name
    pub category: String,
    pub kind: Kind,
}

/// Direction of spending in a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        }
    }

    /// Multiplier applied to the average for the prediction
    fn factor(&self) -> f64 {
        match self {
            Self::Increasing => 1.0 + TREND_THRESHOLD,
            Self::Decreasing => 1.0 - TREND_THRESHOLD,
            Self::Stable => 1.0,
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Predicted spending for one category over the next period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPrediction {
    pub category: String,
    /// Rounded to the nearest whole unit
    pub predicted_amount: i64,
    /// 0..=100
    pub confidence: u32,
    pub trend: Trend,
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn classify(window: &[f64]) -> Trend {
    if window.len() < 2 {
        return Trend::Stable;
    }

    let (first, second) = window.split_at(window.len() / 2);
    let first_avg = mean(first);
    let second_avg = mean(second);

    if second_avg > first_avg * (1.0 + TREND_THRESHOLD) {
        Trend::Increasing
    } else if second_avg < first_avg * (1.0 - TREND_THRESHOLD) {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

fn predict_category(category: String, amounts: &[f64]) -> BudgetPrediction {
    let window = &amounts[amounts.len().saturating_sub(WINDOW)..];
    let average = mean(window);
    let trend = classify(window);

    let variance = window.iter().map(|a| (a - average).powi(2)).sum::<f64>() / window.len() as f64;
    let coefficient = if average == 0.0 {
        0.0
    } else {
        variance.sqrt() / average
    };
    let confidence = (1.0 - coefficient).clamp(0.0, 1.0);

    BudgetPrediction {
        category,
        predicted_amount: (average * trend.factor()).round() as i64,
        confidence: (confidence * 100.0).round() as u32,
        trend,
    }
}

/// Predict next-period spending for every expense category in `samples`
///
/// Output is sorted by predicted amount, highest first. Ties keep the order
/// in which categories first appear in the input.
pub fn predict_next_period(samples: &[TransactionSample]) -> Vec<BudgetPrediction> {
    let mut order: Vec<&str> = Vec::new();
    let mut amounts: HashMap<&str, Vec<f64>> = HashMap::new();

    for sample in samples.iter().filter(|s| s.kind == Kind::Expense) {
        let entry = amounts.entry(sample.category.as_str()).or_insert_with(|| {
            order.push(sample.category.as_str());
            Vec::new()
        });
        entry.push(sample.amount);
    }

    let mut predictions: Vec<BudgetPrediction> = order
        .into_iter()
        .filter_map(|category| {
            let values = amounts.get(category)?;
            Some(predict_category(category.to_string(), values))
        })
        .collect();

    predictions.sort_by(|a, b| b.predicted_amount.cmp(&a.predicted_amount));
    predictions
}

/// Turn predictions (as returned by [`predict_next_period`]) into advice
pub fn generate_recommendations(predictions: &[BudgetPrediction]) -> Vec<String> {
    let mut recommendations = Vec::new();

    if let Some(highest) = predictions.first() {
        if highest.trend == Trend::Increasing {
            recommendations.push(format!(
                "Your {} spending is trending upward. Consider reviewing this category.",
                highest.category
            ));
        }
    }

    let potential_savings: f64 = predictions
        .iter()
        .filter(|p| p.trend == Trend::Increasing)
        .map(|p| p.predicted_amount as f64 * TREND_THRESHOLD)
        .sum();

    if potential_savings > SAVINGS_RECOMMENDATION_MIN {
        recommendations.push(format!(
            "You could save approximately ${} by reducing trending expenses.",
            potential_savings.round() as i64
        ));
    }

    recommendations
}
