//! Report command implementations

use anyhow::{Context, Result};
use chrono::Utc;
use financeflow_core::analytics::{generate_recommendations, AnalysisContext};
use financeflow_core::db::Database;
use financeflow_core::MonthPeriod;
use serde::Serialize;

use super::truncate;
use crate::cli::{PeriodArgs, ReportArgs};

/// Resolve `--month/--year` against today's date
pub fn resolve_period(args: &PeriodArgs) -> Result<MonthPeriod> {
    MonthPeriod::resolve(args.month, args.year, Utc::now().date_naive())
        .context("Invalid --month/--year")
}

/// Analysis context for the report's user, failing on unknown ids
fn context<'a>(db: &'a Database, args: &'a ReportArgs) -> Result<AnalysisContext<'a>> {
    if db.get_user(&args.user)?.is_none() {
        anyhow::bail!(
            "Unknown user: {} (run 'financeflow init' to create the demo user)",
            args.user
        );
    }
    Ok(AnalysisContext::new(db, &args.user))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn cmd_summary(db: &Database, args: &PeriodArgs) -> Result<()> {
    let period = resolve_period(args)?;
    let summary = context(db, &args.report)?.monthly_summary(period)?;

    if args.report.json {
        return print_json(&summary);
    }

    println!();
    println!("📊 Monthly Summary - {}", period);
    println!("   ─────────────────────────────");
    println!("   Income:        {:>12.2}", summary.total_income);
    println!("   Expenses:      {:>12.2}", summary.total_expenses);
    println!("   Net savings:   {:>12.2}", summary.net_savings);
    println!("   Savings rate:  {:>11.1}%", summary.savings_rate);
    println!("   Transactions:  {:>12}", summary.transaction_count);

    Ok(())
}

pub fn cmd_breakdown(db: &Database, args: &PeriodArgs) -> Result<()> {
    let period = resolve_period(args)?;
    let breakdown = context(db, &args.report)?.category_breakdown(period)?;

    if args.report.json {
        return print_json(&breakdown);
    }

    println!();
    println!("🗂️  Spending by Category - {}", period);
    println!("   ─────────────────────────────────────────");

    if breakdown.is_empty() {
        println!("   No expenses found in this period.");
        return Ok(());
    }

    println!("   {:25} │ {:>12}", "Category", "Amount");
    println!("   ──────────────────────────┼─────────────");
    for (name, total) in &breakdown {
        println!("   {:25} │ {:>12.2}", truncate(name, 25), total.amount);
    }

    Ok(())
}

pub fn cmd_forecast(db: &Database, args: &ReportArgs) -> Result<()> {
    let predictions = context(db, args)?.predictions()?;
    let recommendations = generate_recommendations(&predictions);

    if args.json {
        return print_json(&serde_json::json!({
            "predictions": predictions,
            "recommendations": recommendations,
        }));
    }

    println!();
    println!("🔮 Next-Period Forecast");
    println!("   ─────────────────────────────────────────────────────────");

    if predictions.is_empty() {
        println!("   No expense history to forecast from.");
        return Ok(());
    }

    println!(
        "   {:25} │ {:>10} │ {:>10} │ {:>10}",
        "Category", "Predicted", "Confidence", "Trend"
    );
    println!("   ──────────────────────────┼────────────┼────────────┼───────────");
    for p in &predictions {
        println!(
            "   {:25} │ {:>10} │ {:>9}% │ {:>10}",
            truncate(&p.category, 25),
            p.predicted_amount,
            p.confidence,
            p.trend.to_string()
        );
    }

    if !recommendations.is_empty() {
        println!();
        for advice in &recommendations {
            println!("   💡 {}", advice);
        }
    }

    Ok(())
}

pub fn cmd_health(db: &Database, args: &PeriodArgs) -> Result<()> {
    let period = resolve_period(args)?;
    let health = context(db, &args.report)?.health_score(period)?;

    if args.report.json {
        return print_json(&health);
    }

    let icon = match health.score {
        s if s >= 80 => "🟢",
        s if s >= 60 => "🟡",
        _ => "🔴",
    };

    println!();
    println!("❤️  Financial Health - {}", period);
    println!("   ─────────────────────────────");
    println!("   {} {}/100 ({})", icon, health.score, health.label);

    Ok(())
}

/// Width of a trend bar scaled so `peak` fills the column
pub fn bar_len(expenses: i64, peak: i64) -> usize {
    const WIDTH: i128 = 30;
    // Widened so totals near i64::MAX cannot overflow
    let scaled = i128::from(expenses) * WIDTH / i128::from(peak.max(1));
    scaled.clamp(0, WIDTH) as usize
}

pub fn cmd_trend(db: &Database, days: u32, args: &ReportArgs) -> Result<()> {
    if !(1..=financeflow_server::MAX_TREND_DAYS).contains(&days) {
        anyhow::bail!(
            "--days must be between 1 and {}",
            financeflow_server::MAX_TREND_DAYS
        );
    }

    let today = Utc::now().date_naive();
    let trend = context(db, args)?.spending_trend(today, days)?;

    if args.json {
        return print_json(&trend);
    }

    println!();
    println!("📈 Daily Spending - last {} day(s)", days);
    println!("   ─────────────────────────────");

    let peak = trend.iter().map(|d| d.expenses).max().unwrap_or(0);
    for day in &trend {
        println!(
            "   {} {} │ {:>8} {}",
            day.date,
            day.label,
            day.expenses,
            "█".repeat(bar_len(day.expenses, peak))
        );
    }

    Ok(())
}
