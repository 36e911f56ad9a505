//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use financeflow_core::db::{Database, DEMO_USER_EMAIL, DEMO_USER_PASSWORD};

/// Open (or create) the database at `db_path`, running migrations
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path)?;

    if db.seed_demo_data().context("Failed to seed demo data")? {
        println!(
            "   Seeded demo user {} (password: {})",
            DEMO_USER_EMAIL, DEMO_USER_PASSWORD
        );
    } else {
        println!("   Demo user already present");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Create an account: financeflow users add --email you@example.com --name You --password ...");
    println!("  2. Start web UI: financeflow serve");

    Ok(())
}
