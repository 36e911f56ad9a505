//! Demo user and default data

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use tracing::info;

use super::Database;
use crate::auth::hash_password;
use crate::error::Result;
use crate::models::{Kind, NewCategory, NewGoal};

pub const DEMO_USER_ID: &str = "demo-user";
pub const DEMO_USER_EMAIL: &str = "demo@financeflow.com";
pub const DEMO_USER_PASSWORD: &str = "password";
const DEMO_USER_NAME: &str = "Demo User";

/// (name, icon, color, kind)
const DEFAULT_CATEGORIES: &[(&str, &str, &str, Kind)] = &[
    ("Food & Dining", "utensils", "#3B82F6", Kind::Expense),
    ("Transportation", "car", "#10B981", Kind::Expense),
    ("Entertainment", "film", "#8B5CF6", Kind::Expense),
    ("Shopping", "shopping-bag", "#F59E0B", Kind::Expense),
    ("Bills & Utilities", "receipt", "#EF4444", Kind::Expense),
    ("Salary", "briefcase", "#059669", Kind::Income),
    ("Freelance", "laptop", "#7C3AED", Kind::Income),
];

impl Database {
    /// Create the demo user with default categories and two goals
    ///
    /// Returns `false` without touching anything if the demo user exists.
    pub fn seed_demo_data(&self) -> Result<bool> {
        if self.get_user(DEMO_USER_ID)?.is_some() {
            return Ok(false);
        }

        let hash = hash_password(DEMO_USER_PASSWORD)?;
        self.create_user_with_id(DEMO_USER_ID, DEMO_USER_EMAIL, DEMO_USER_NAME, &hash)?;

        for (name, icon, color, kind) in DEFAULT_CATEGORIES {
            self.create_category(
                DEMO_USER_ID,
                &NewCategory {
                    name: name.to_string(),
                    icon: icon.to_string(),
                    color: color.to_string(),
                    kind: *kind,
                },
            )?;
        }

        let goals = [
            (
                "Emergency Fund",
                "Save for unexpected expenses",
                10_000,
                3_250,
                Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).single(),
            ),
            (
                "Vacation Fund",
                "Trip to Europe next summer",
                5_000,
                1_850,
                Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).single(),
            ),
        ];
        for (title, description, target, current, deadline) in goals {
            self.insert_goal(
                DEMO_USER_ID,
                &NewGoal {
                    title: title.to_string(),
                    description: Some(description.to_string()),
                    target_amount: Decimal::from(target),
                    deadline,
                },
                Decimal::from(current),
            )?;
        }

        info!(
            user = DEMO_USER_ID,
            categories = DEFAULT_CATEGORIES.len(),
            "Seeded demo data"
        );
        Ok(true)
    }
}
