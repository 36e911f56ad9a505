//! FinanceFlow CLI - Personal finance tracker
//!
//! Usage:
//!   financeflow init                  Initialize database and demo data
//!   financeflow serve --port 3000     Start web server
//!   financeflow summary --month 12    Monthly income/expense summary
//!   financeflow forecast              Next-period spending predictions

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => commands::cmd_serve(&cli.db, &host, port, no_auth, static_dir.as_deref()).await,
        Commands::Summary { period } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_summary(&db, &period)
        }
        Commands::Breakdown { period } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_breakdown(&db, &period)
        }
        Commands::Forecast { report } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_forecast(&db, &report)
        }
        Commands::Health { period } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_health(&db, &period)
        }
        Commands::Trend { days, report } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_trend(&db, days, &report)
        }
        Commands::Users { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                UsersAction::Add {
                    email,
                    name,
                    password,
                } => commands::cmd_users_add(&db, &email, &name, &password),
            }
        }
    }
}
