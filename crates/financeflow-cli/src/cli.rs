//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use financeflow_core::db::DEMO_USER_ID;

/// FinanceFlow - Track spending, savings goals and budgets
#[derive(Parser)]
#[command(name = "financeflow")]
#[command(about = "Self-hosted personal finance tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(
        long,
        env = "FINANCEFLOW_DB",
        default_value = "financeflow.db",
        global = true
    )]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and seed the demo user
    Init,

    /// Start the web server
    ///
    /// Token secrets are read from FINANCEFLOW_JWT_SECRET and
    /// FINANCEFLOW_JWT_REFRESH_SECRET unless --no-auth is given.
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication; every request acts as the demo user
        #[arg(long)]
        no_auth: bool,

        /// Directory of static files to serve (the web client)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Income, expenses and savings rate for a month
    Summary {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Expenses by category for a month
    Breakdown {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Predicted next-period spending per category, with advice
    Forecast {
        #[command(flatten)]
        report: ReportArgs,
    },

    /// Financial health score for a month
    Health {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Daily expenses over the last few days
    Trend {
        /// Number of days, ending today
        #[arg(short, long, default_value = "7")]
        days: u32,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Manage user accounts
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
}

/// Options shared by every report
#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// User id to report on
    #[arg(short, long, default_value = DEMO_USER_ID)]
    pub user: String,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Report options plus a month selection (defaults to the current month)
#[derive(Args, Debug, Clone)]
pub struct PeriodArgs {
    /// Month (1-12)
    #[arg(short, long)]
    pub month: Option<u32>,

    /// Year
    #[arg(short, long)]
    pub year: Option<i32>,

    #[command(flatten)]
    pub report: ReportArgs,
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// Create a user account
    Add {
        /// Email address (must be unique)
        #[arg(long)]
        email: String,

        /// Display name
        #[arg(long)]
        name: String,

        /// Password (min 6 characters)
        #[arg(long, env = "FINANCEFLOW_USER_PASSWORD", hide_env_values = true)]
        password: String,
    },
}
