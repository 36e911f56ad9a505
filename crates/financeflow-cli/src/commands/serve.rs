//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use financeflow_server::{JwtConfig, ServerConfig};

use super::open_db;

/// Non-empty value of an environment variable
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

/// Split a comma-separated list, dropping blanks
pub fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Token secrets from the environment; both must be set
pub fn jwt_from_env() -> Option<JwtConfig> {
    let access = env_var("FINANCEFLOW_JWT_SECRET")?;
    let refresh = env_var("FINANCEFLOW_JWT_REFRESH_SECRET")?;
    Some(JwtConfig::new(access, refresh))
}

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    static_dir: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting FinanceFlow web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    let allowed_origins = parse_origins(&env_var("FINANCEFLOW_ALLOWED_ORIGINS").unwrap_or_default());
    let jwt = jwt_from_env();

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else if jwt.is_none() {
        anyhow::bail!(
            "FINANCEFLOW_JWT_SECRET and FINANCEFLOW_JWT_REFRESH_SECRET must be set (or pass --no-auth)"
        );
    } else {
        println!("   🔒 Authentication: JWT bearer tokens");
    }
    if !allowed_origins.is_empty() {
        println!("   🌐 CORS origins: {}", allowed_origins.join(", "));
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path)?;

    // The demo user backs no-auth mode (idempotent)
    db.seed_demo_data().context("Failed to seed demo data")?;

    let config = ServerConfig {
        require_auth: !no_auth,
        allowed_origins,
        jwt,
    };

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("Static directory path must be valid UTF-8"))
        .transpose()?;
    financeflow_server::serve(db, host, port, static_dir_str, config).await?;

    Ok(())
}
