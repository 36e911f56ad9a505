//! User account commands

use anyhow::{Context, Result};
use financeflow_core::auth::{hash_password, MIN_PASSWORD_LEN};
use financeflow_core::db::Database;
use financeflow_core::models::User;

/// Create a user account and print its id
pub fn cmd_users_add(db: &Database, email: &str, name: &str, password: &str) -> Result<()> {
    let user = add_user(db, email, name, password)?;
    println!("✅ Created user {} <{}>", user.name, user.email);
    println!("   Id: {}", user.id);
    Ok(())
}

fn add_user(db: &Database, email: &str, name: &str, password: &str) -> Result<User> {
    let email = email.trim();
    let name = name.trim();
    if email.is_empty() || name.is_empty() {
        anyhow::bail!("Email and name are required");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        anyhow::bail!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        );
    }
    if db.get_user_by_email(email)?.is_some() {
        anyhow::bail!("User with this email already exists: {}", email);
    }

    let hash = hash_password(password).context("Failed to hash password")?;
    db.create_user(email, name, &hash)
        .context("Failed to create user")
}
