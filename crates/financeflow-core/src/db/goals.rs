//! Savings goal operations

use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use rust_decimal::Decimal;

use super::{format_amount, format_timestamp, new_id, parse_amount, parse_timestamp, Database};
use crate::error::{Error, Result};
use crate::models::{check_amount_bound, round_cents, Goal, GoalUpdate, NewGoal};

struct GoalRow {
    id: String,
    owner_id: String,
    title: String,
    description: Option<String>,
    target_amount: String,
    current_amount: String,
    deadline: Option<String>,
    achieved: bool,
}

impl GoalRow {
    const COLUMNS: &'static str =
        "id, user_id, title, description, target_amount, current_amount, deadline, achieved";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            target_amount: row.get(4)?,
            current_amount: row.get(5)?,
            deadline: row.get(6)?,
            achieved: row.get(7)?,
        })
    }

    fn into_goal(self) -> Result<Goal> {
        let deadline = self.deadline.as_deref().map(parse_timestamp).transpose()?;
        Ok(Goal {
            target_amount: parse_amount(&self.target_amount)?,
            current_amount: parse_amount(&self.current_amount)?,
            deadline,
            id: self.id,
            owner_id: self.owner_id,
            title: self.title,
            description: self.description,
            achieved: self.achieved,
        })
    }
}

/// Read a goal on an already-held connection
fn select_goal(conn: &Connection, id: &str, owner_id: &str) -> Result<Option<Goal>> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {} FROM goals WHERE id = ? AND user_id = ?",
                GoalRow::COLUMNS
            ),
            params![id, owner_id],
            GoalRow::from_row,
        )
        .optional()?;

    row.map(GoalRow::into_goal).transpose()
}

fn write_goal(conn: &Connection, goal: &Goal) -> Result<()> {
    conn.execute(
        r#"
        UPDATE goals
        SET title = ?, description = ?, target_amount = ?, current_amount = ?, deadline = ?, achieved = ?
        WHERE id = ? AND user_id = ?
        "#,
        params![
            goal.title,
            goal.description,
            format_amount(goal.target_amount),
            format_amount(goal.current_amount),
            goal.deadline.map(format_timestamp),
            goal.achieved,
            goal.id,
            goal.owner_id
        ],
    )?;
    Ok(())
}

impl Database {
    /// List a user's goals in creation order
    pub fn list_goals(&self, owner_id: &str) -> Result<Vec<Goal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM goals WHERE user_id = ? ORDER BY rowid",
            GoalRow::COLUMNS
        ))?;

        let rows = stmt
            .query_map(params![owner_id], GoalRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(GoalRow::into_goal).collect()
    }

    /// Get one of a user's goals
    pub fn get_goal(&self, id: &str, owner_id: &str) -> Result<Option<Goal>> {
        let conn = self.conn()?;
        select_goal(&conn, id, owner_id)
    }

    /// Create a goal with zero progress
    pub fn create_goal(&self, owner_id: &str, goal: &NewGoal) -> Result<Goal> {
        goal.validate()?;
        self.insert_goal(owner_id, goal, Decimal::ZERO)
    }

    /// Insert a goal with a starting balance (used by seeding)
    pub(crate) fn insert_goal(
        &self,
        owner_id: &str,
        goal: &NewGoal,
        current_amount: Decimal,
    ) -> Result<Goal> {
        let created = Goal {
            id: new_id(),
            owner_id: owner_id.to_string(),
            title: goal.title.clone(),
            description: goal.description.clone(),
            target_amount: goal.target_amount,
            current_amount,
            deadline: goal.deadline,
            achieved: current_amount >= goal.target_amount,
        };

        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO goals ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                GoalRow::COLUMNS
            ),
            params![
                created.id,
                created.owner_id,
                created.title,
                created.description,
                format_amount(created.target_amount),
                format_amount(created.current_amount),
                created.deadline.map(format_timestamp),
                created.achieved
            ],
        )?;

        select_goal(&conn, &created.id, owner_id)?
            .ok_or_else(|| Error::NotFound(format!("goal {}", created.id)))
    }

    /// Apply a partial update and recompute `achieved`
    pub fn update_goal(
        &self,
        id: &str,
        owner_id: &str,
        updates: &GoalUpdate,
    ) -> Result<Option<Goal>> {
        updates.validate()?;

        let conn = self.conn()?;
        let Some(mut goal) = select_goal(&conn, id, owner_id)? else {
            return Ok(None);
        };

        if let Some(title) = &updates.title {
            if title.trim().is_empty() {
                return Err(Error::InvalidData("Goal title is required".to_string()));
            }
            goal.title = title.clone();
        }
        if let Some(description) = &updates.description {
            goal.description = Some(description.clone());
        }
        if let Some(target) = updates.target_amount {
            goal.target_amount = target;
        }
        if let Some(deadline) = updates.deadline {
            goal.deadline = Some(deadline);
        }
        goal.achieved = goal.current_amount >= goal.target_amount;

        write_goal(&conn, &goal)?;
        select_goal(&conn, id, owner_id)
    }

    /// Add `amount` to a goal's current balance and recompute `achieved`
    ///
    /// The read and the write run inside one immediate transaction so
    /// concurrent contributions are not lost. Dropping the transaction on
    /// any error rolls it back.
    pub fn update_goal_progress(
        &self,
        id: &str,
        owner_id: &str,
        amount: Decimal,
    ) -> Result<Option<Goal>> {
        check_amount_bound(amount)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(mut goal) = select_goal(&tx, id, owner_id)? else {
            return Ok(None);
        };
        let balance = goal
            .current_amount
            .checked_add(amount)
            .ok_or_else(|| Error::InvalidData("Goal balance is out of range".to_string()))?;
        check_amount_bound(balance)?;

        goal.current_amount = round_cents(balance);
        goal.achieved = goal.current_amount >= goal.target_amount;
        write_goal(&tx, &goal)?;
        let updated = select_goal(&tx, id, owner_id)?;

        tx.commit()?;
        Ok(updated)
    }

    /// Delete a goal; returns false if it is not the user's
    pub fn delete_goal(&self, id: &str, owner_id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM goals WHERE id = ? AND user_id = ?",
            params![id, owner_id],
        )?;
        Ok(deleted > 0)
    }
}
