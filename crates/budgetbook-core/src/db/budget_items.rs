//! Budget item storage
//!
//! A user's budget is stored as a flat row set that is only ever replaced as
//! a whole.

use rusqlite::params;
use tracing::info;

use super::Database;
use crate::error::Result;
use crate::models::{format_amount, BudgetItemRow, StoredBudgetItem};

impl Database {
    /// Replace every budget item row of `user_id` with `rows`.
    ///
    /// The delete and the inserts run in one transaction; on any failure the
    /// previous row set is left untouched. Returns the number of rows inserted.
    pub fn replace_budget_items(&self, user_id: i64, rows: &[BudgetItemRow]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let deleted = tx.execute(
            "DELETE FROM current_budget_items WHERE user_id = ?",
            params![user_id],
        )?;

        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO current_budget_items
                    (user_id, primary_category, secondary_category, tertiary_category,
                     item_name, current_amount, frequency, current_four_weekly_amount)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )?;

            for row in rows {
                inserted += stmt.execute(params![
                    user_id,
                    row.primary_category.as_str(),
                    row.secondary_category,
                    row.tertiary_category,
                    row.item_name,
                    format_amount(row.current_amount),
                    row.frequency,
                    row.current_four_weekly_amount.map(format_amount),
                ])?;
            }
        }

        tx.commit()?;

        info!(user_id, deleted, inserted, "Replaced budget items");
        Ok(inserted)
    }

    /// All stored budget item rows of `user_id`, in insertion order
    pub fn list_budget_items(&self, user_id: i64) -> Result<Vec<StoredBudgetItem>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT primary_category, secondary_category, tertiary_category, item_name,
                    current_amount, frequency, current_four_weekly_amount
             FROM current_budget_items
             WHERE user_id = ?
             ORDER BY id",
        )?;

        let items = stmt
            .query_map(params![user_id], |row| {
                Ok(StoredBudgetItem {
                    primary_category: row.get(0)?,
                    secondary_category: row.get(1)?,
                    tertiary_category: row.get(2)?,
                    item_name: row.get(3)?,
                    current_amount: row.get(4)?,
                    frequency: row.get(5)?,
                    current_four_weekly_amount: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(items)
    }
}
