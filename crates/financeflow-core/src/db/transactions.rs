//! Transaction CRUD and range reads

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{format_amount, format_timestamp, new_id, parse_amount, parse_timestamp, Database};
use crate::error::{Error, Result};
use crate::models::{Kind, NewTransaction, Transaction, TransactionUpdate};

/// Raw row as stored; decoding is fallible and happens outside rusqlite
struct TransactionRow {
    id: String,
    owner_id: String,
    category_id: Option<String>,
    amount: String,
    description: String,
    kind: String,
    occurred_at: String,
}

impl TransactionRow {
    const COLUMNS: &'static str =
        "id, user_id, category_id, amount, description, kind, occurred_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            category_id: row.get(2)?,
            amount: row.get(3)?,
            description: row.get(4)?,
            kind: row.get(5)?,
            occurred_at: row.get(6)?,
        })
    }

    fn into_transaction(self) -> Result<Transaction> {
        let amount = parse_amount(&self.amount)
            .map_err(|e| Error::DataIntegrity(format!("transaction {}: {}", self.id, e)))?;
        let kind: Kind = self
            .kind
            .parse()
            .map_err(|e: String| Error::DataIntegrity(format!("transaction {}: {}", self.id, e)))?;

        Ok(Transaction {
            amount,
            kind,
            occurred_at: parse_timestamp(&self.occurred_at)?,
            id: self.id,
            owner_id: self.owner_id,
            category_id: self.category_id,
            description: self.description,
        })
    }
}

impl Database {
    /// Record a transaction for a user
    ///
    /// The referenced category, if any, must belong to the same user.
    pub fn create_transaction(&self, owner_id: &str, tx: &NewTransaction) -> Result<Transaction> {
        tx.validate()?;
        self.ensure_category_owned(tx.category_id.as_deref(), owner_id)?;

        let id = new_id();
        let occurred_at = tx.occurred_at.unwrap_or_else(Utc::now);
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO transactions (id, user_id, category_id, amount, description, kind, occurred_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                id,
                owner_id,
                tx.category_id,
                format_amount(tx.amount),
                tx.description,
                tx.kind.as_str(),
                format_timestamp(occurred_at),
                format_timestamp(Utc::now())
            ],
        )?;

        self.get_transaction(&id, owner_id)?
            .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))
    }

    /// Get one of a user's transactions
    pub fn get_transaction(&self, id: &str, owner_id: &str) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM transactions WHERE id = ? AND user_id = ?",
                    TransactionRow::COLUMNS
                ),
                params![id, owner_id],
                TransactionRow::from_row,
            )
            .optional()?;

        row.map(TransactionRow::into_transaction).transpose()
    }

    /// List a user's transactions, newest first
    pub fn list_transactions(
        &self,
        owner_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions WHERE user_id = ? ORDER BY occurred_at DESC, rowid DESC LIMIT ? OFFSET ?",
            TransactionRow::COLUMNS
        ))?;

        let rows = stmt
            .query_map(params![owner_id, limit, offset], TransactionRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(TransactionRow::into_transaction)
            .collect()
    }

    /// List a user's transactions with `start <= occurred_at <= end`, oldest first
    pub fn list_transactions_in_range(
        &self,
        owner_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {} FROM transactions
            WHERE user_id = ? AND occurred_at >= ? AND occurred_at <= ?
            ORDER BY occurred_at ASC, rowid ASC
            "#,
            TransactionRow::COLUMNS
        ))?;

        let rows = stmt
            .query_map(
                params![owner_id, format_timestamp(start), format_timestamp(end)],
                TransactionRow::from_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(TransactionRow::into_transaction)
            .collect()
    }

    /// List all of a user's transactions in ascending time order
    ///
    /// Ties on the timestamp keep insertion order. The forecaster relies on
    /// this ordering to treat trailing samples as the most recent ones.
    pub fn list_transactions_chronological(&self, owner_id: &str) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions WHERE user_id = ? ORDER BY occurred_at ASC, rowid ASC",
            TransactionRow::COLUMNS
        ))?;

        let rows = stmt
            .query_map(params![owner_id], TransactionRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(TransactionRow::into_transaction)
            .collect()
    }

    /// Apply a partial update; returns None if the transaction is not the user's
    pub fn update_transaction(
        &self,
        id: &str,
        owner_id: &str,
        updates: &TransactionUpdate,
    ) -> Result<Option<Transaction>> {
        updates.validate()?;

        let Some(mut tx) = self.get_transaction(id, owner_id)? else {
            return Ok(None);
        };

        if let Some(category_id) = &updates.category_id {
            self.ensure_category_owned(Some(category_id), owner_id)?;
            tx.category_id = Some(category_id.clone());
        }
        if let Some(amount) = updates.amount {
            tx.amount = amount;
        }
        if let Some(description) = &updates.description {
            tx.description = description.clone();
        }
        if let Some(kind) = updates.kind {
            tx.kind = kind;
        }
        if let Some(occurred_at) = updates.occurred_at {
            tx.occurred_at = occurred_at;
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            UPDATE transactions
            SET category_id = ?, amount = ?, description = ?, kind = ?, occurred_at = ?
            WHERE id = ? AND user_id = ?
            "#,
            params![
                tx.category_id,
                format_amount(tx.amount),
                tx.description,
                tx.kind.as_str(),
                format_timestamp(tx.occurred_at),
                id,
                owner_id
            ],
        )?;

        self.get_transaction(id, owner_id)
    }

    /// Delete a transaction; returns false if it is not the user's
    pub fn delete_transaction(&self, id: &str, owner_id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM transactions WHERE id = ? AND user_id = ?",
            params![id, owner_id],
        )?;
        Ok(deleted > 0)
    }

    /// Reject references to categories the user does not own
    pub(crate) fn ensure_category_owned(
        &self,
        category_id: Option<&str>,
        owner_id: &str,
    ) -> Result<()> {
        if let Some(category_id) = category_id {
            if self.get_category(category_id, owner_id)?.is_none() {
                return Err(Error::InvalidData(format!(
                    "Unknown category: {}",
                    category_id
                )));
            }
        }
        Ok(())
    }
}
