//! Budget operations

use rusqlite::{params, OptionalExtension, Row};

use super::{format_amount, new_id, parse_amount, Database};
use crate::error::{Error, Result};
use crate::models::{Budget, BudgetPeriod, BudgetUpdate, NewBudget};

struct BudgetRow {
    id: String,
    owner_id: String,
    category_id: Option<String>,
    amount: String,
    period: String,
    month: u32,
    year: i32,
}

impl BudgetRow {
    const COLUMNS: &'static str = "id, user_id, category_id, amount, period, month, year";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            category_id: row.get(2)?,
            amount: row.get(3)?,
            period: row.get(4)?,
            month: row.get(5)?,
            year: row.get(6)?,
        })
    }

    fn into_budget(self) -> Result<Budget> {
        let period: BudgetPeriod = self
            .period
            .parse()
            .map_err(|e: String| Error::DataIntegrity(format!("budget {}: {}", self.id, e)))?;

        Ok(Budget {
            amount: parse_amount(&self.amount)?,
            period,
            id: self.id,
            owner_id: self.owner_id,
            category_id: self.category_id,
            month: self.month,
            year: self.year,
        })
    }
}

impl Database {
    /// List all of a user's budgets
    pub fn list_budgets(&self, owner_id: &str) -> Result<Vec<Budget>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM budgets WHERE user_id = ? ORDER BY year, month, rowid",
            BudgetRow::COLUMNS
        ))?;

        let rows = stmt
            .query_map(params![owner_id], BudgetRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(BudgetRow::into_budget).collect()
    }

    /// List a user's budgets for one month
    pub fn list_budgets_by_period(
        &self,
        owner_id: &str,
        month: u32,
        year: i32,
    ) -> Result<Vec<Budget>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM budgets WHERE user_id = ? AND month = ? AND year = ? ORDER BY rowid",
            BudgetRow::COLUMNS
        ))?;

        let rows = stmt
            .query_map(params![owner_id, month, year], BudgetRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(BudgetRow::into_budget).collect()
    }

    /// Get one of a user's budgets
    pub fn get_budget(&self, id: &str, owner_id: &str) -> Result<Option<Budget>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM budgets WHERE id = ? AND user_id = ?",
                    BudgetRow::COLUMNS
                ),
                params![id, owner_id],
                BudgetRow::from_row,
            )
            .optional()?;

        row.map(BudgetRow::into_budget).transpose()
    }

    /// Create a budget
    pub fn create_budget(&self, owner_id: &str, budget: &NewBudget) -> Result<Budget> {
        budget.validate()?;
        self.ensure_category_owned(budget.category_id.as_deref(), owner_id)?;

        let id = new_id();
        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO budgets ({}) VALUES (?, ?, ?, ?, ?, ?, ?)",
                BudgetRow::COLUMNS
            ),
            params![
                id,
                owner_id,
                budget.category_id,
                format_amount(budget.amount),
                budget.period.as_str(),
                budget.month,
                budget.year
            ],
        )?;

        self.get_budget(&id, owner_id)?
            .ok_or_else(|| Error::NotFound(format!("budget {}", id)))
    }

    /// Apply a partial update; returns None if the budget is not the user's
    pub fn update_budget(
        &self,
        id: &str,
        owner_id: &str,
        updates: &BudgetUpdate,
    ) -> Result<Option<Budget>> {
        updates.validate()?;

        let Some(mut budget) = self.get_budget(id, owner_id)? else {
            return Ok(None);
        };

        if let Some(category_id) = &updates.category_id {
            self.ensure_category_owned(Some(category_id), owner_id)?;
            budget.category_id = Some(category_id.clone());
        }
        if let Some(amount) = updates.amount {
            budget.amount = amount;
        }
        if let Some(period) = updates.period {
            budget.period = period;
        }
        if let Some(month) = updates.month {
            budget.month = month;
        }
        if let Some(year) = updates.year {
            budget.year = year;
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            UPDATE budgets
            SET category_id = ?, amount = ?, period = ?, month = ?, year = ?
            WHERE id = ? AND user_id = ?
            "#,
            params![
                budget.category_id,
                format_amount(budget.amount),
                budget.period.as_str(),
                budget.month,
                budget.year,
                id,
                owner_id
            ],
        )?;

        self.get_budget(id, owner_id)
    }

    /// Delete a budget; returns false if it is not the user's
    pub fn delete_budget(&self, id: &str, owner_id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM budgets WHERE id = ? AND user_id = ?",
            params![id, owner_id],
        )?;
        Ok(deleted > 0)
    }
}
