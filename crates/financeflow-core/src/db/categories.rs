//! Category operations

use rusqlite::{params, OptionalExtension, Row};

use super::{new_id, Database};
use crate::error::{Error, Result};
use crate::models::{Category, Kind, NewCategory};

struct CategoryRow {
    id: String,
    owner_id: String,
    name: String,
    icon: String,
    color: String,
    kind: String,
}

impl CategoryRow {
    const COLUMNS: &'static str = "id, user_id, name, icon, color, kind";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            name: row.get(2)?,
            icon: row.get(3)?,
            color: row.get(4)?,
            kind: row.get(5)?,
        })
    }

    fn into_category(self) -> Result<Category> {
        let kind: Kind = self
            .kind
            .parse()
            .map_err(|e: String| Error::DataIntegrity(format!("category {}: {}", self.id, e)))?;

        Ok(Category {
            id: self.id,
            owner_id: self.owner_id,
            name: self.name,
            icon: self.icon,
            color: self.color,
            kind,
        })
    }
}

impl Database {
    /// List a user's categories
    pub fn list_categories(&self, owner_id: &str) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM categories WHERE user_id = ? ORDER BY rowid",
            CategoryRow::COLUMNS
        ))?;

        let rows = stmt
            .query_map(params![owner_id], CategoryRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(CategoryRow::into_category).collect()
    }

    /// Get one of a user's categories
    pub fn get_category(&self, id: &str, owner_id: &str) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM categories WHERE id = ? AND user_id = ?",
                    CategoryRow::COLUMNS
                ),
                params![id, owner_id],
                CategoryRow::from_row,
            )
            .optional()?;

        row.map(CategoryRow::into_category).transpose()
    }

    /// Create a category for a user
    pub fn create_category(&self, owner_id: &str, category: &NewCategory) -> Result<Category> {
        category.validate()?;

        let id = new_id();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO categories (id, user_id, name, icon, color, kind) VALUES (?, ?, ?, ?, ?, ?)",
            params![
                id,
                owner_id,
                category.name,
                category.icon,
                category.color,
                category.kind.as_str()
            ],
        )?;

        Ok(Category {
            id,
            owner_id: owner_id.to_string(),
            name: category.name.clone(),
            icon: category.icon.clone(),
            color: category.color.clone(),
            kind: category.kind,
        })
    }

    /// Delete a category; returns false if it is not the user's
    ///
    /// Transactions and budgets pointing at it become uncategorized.
    pub fn delete_category(&self, id: &str, owner_id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM categories WHERE id = ? AND user_id = ?",
            params![id, owner_id],
        )?;
        Ok(deleted > 0)
    }
}
