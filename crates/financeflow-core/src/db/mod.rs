//! Record store: SQLite access layer with connection pooling and migrations
//!
//! This module is organized by collection:
//! - `users` - Accounts, credentials and refresh tokens
//! - `categories` - Category CRUD
//! - `transactions` - Transaction CRUD and range reads for analytics
//! - `goals` - Savings goals and progress
//! - `budgets` - Per-period budgets
//! - `seed` - Demo user and default data
//!
//! Every query is scoped by owning user id. There is no process-wide store:
//! callers construct a [`Database`] and hand clones of it to whatever needs it.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{Error, Result};

mod budgets;
mod categories;
mod goals;
mod seed;
mod transactions;
mod users;

pub use seed::{DEMO_USER_EMAIL, DEMO_USER_ID, DEMO_USER_PASSWORD};

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Timestamp layout used for every stored datetime (sorts lexicographically)
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a timestamp for storage
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp, failing on malformed values
pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map(|dt| dt.and_utc())
        .map_err(|e| Error::DataIntegrity(format!("Malformed timestamp {:?}: {}", s, e)))
}

/// Parse a stored decimal amount, failing on malformed values
pub(crate) fn parse_amount(s: &str) -> Result<Decimal> {
    Decimal::from_str(s.trim())
        .map_err(|e| Error::DataIntegrity(format!("Malformed amount {:?}: {}", s, e)))
}

/// Format an amount for storage (cents, midpoint away from zero)
pub(crate) fn format_amount(amount: Decimal) -> String {
    crate::models::round_cents(amount).to_string()
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Open (or create) a database file and run migrations
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        });
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because every pooled
    /// connection to `:memory:` would see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "financeflow_test_{}_{}.db",
            std::process::id(),
            id
        ));

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new(&path.to_string_lossy())
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block writers
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            -- Users
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                name TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- Issued refresh tokens (a token is valid only while its row exists)
            CREATE TABLE IF NOT EXISTS refresh_tokens (
                token_id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                expires_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_refresh_tokens_user ON refresh_tokens(user_id);

            -- Categories
            CREATE TABLE IF NOT EXISTS categories (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                icon TEXT NOT NULL,
                color TEXT NOT NULL,
                kind TEXT NOT NULL                         -- income, expense
            );

            CREATE INDEX IF NOT EXISTS idx_categories_user ON categories(user_id);

            -- Transactions
            -- amount is TEXT so it round-trips as an exact decimal
            CREATE TABLE IF NOT EXISTS transactions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                category_id TEXT REFERENCES categories(id) ON DELETE SET NULL,
                amount TEXT NOT NULL,
                description TEXT NOT NULL,
                kind TEXT NOT NULL,                        -- income, expense
                occurred_at TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, occurred_at);
            CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category_id);

            -- Savings goals
            CREATE TABLE IF NOT EXISTS goals (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                description TEXT,
                target_amount TEXT NOT NULL,
                current_amount TEXT NOT NULL DEFAULT '0.00',
                deadline TEXT,
                achieved BOOLEAN NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_goals_user ON goals(user_id);

            -- Budgets
            CREATE TABLE IF NOT EXISTS budgets (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                category_id TEXT REFERENCES categories(id) ON DELETE SET NULL,
                amount TEXT NOT NULL,
                period TEXT NOT NULL,                      -- weekly, monthly, yearly
                month INTEGER NOT NULL,
                year INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_budgets_user_period ON budgets(user_id, year, month);
            "#,
        )?;

        debug!(path = %self.db_path, "Database migrations applied");
        Ok(())
    }
}
