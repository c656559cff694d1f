//! Organisation and gift operations

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

use super::Database;
use crate::error::{Error, Result};
use crate::models::{Gift, NewGift, Organisation};

const GIFT_COLUMNS: &str = "g.id, g.gift_type, o.entity_name, g.amount, g.date, g.description, \
                            g.receipt_url, g.is_tax_deductible";

fn gift_from_row(row: &Row) -> rusqlite::Result<Gift> {
    let date_str: String = row.get(4)?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(Gift {
        id: row.get(0)?,
        gift_type: row.get(1)?,
        organisation: row.get(2)?,
        amount: row.get(3)?,
        date,
        description: row.get(5)?,
        receipt: row.get(6)?,
        dgr: row.get(7)?,
    })
}

impl Database {
    /// All organisations, alphabetically
    pub fn list_organisations(&self) -> Result<Vec<Organisation>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT org_id, entity_name, abn FROM organisations ORDER BY entity_name")?;

        let orgs = stmt
            .query_map([], |row| {
                Ok(Organisation {
                    org_id: row.get(0)?,
                    entity_name: row.get(1)?,
                    abn: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(orgs)
    }

    pub fn get_organisation(&self, org_id: i64) -> Result<Option<Organisation>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT org_id, entity_name, abn FROM organisations WHERE org_id = ?",
            params![org_id],
            |row| {
                Ok(Organisation {
                    org_id: row.get(0)?,
                    entity_name: row.get(1)?,
                    abn: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(Into::into)
    }

    /// Add an organisation to the DGR list
    pub fn add_organisation(&self, entity_name: &str, abn: Option<i64>) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO organisations (entity_name, abn) VALUES (?, ?)",
            params![entity_name, abn],
        )?;
        let id = conn.last_insert_rowid();
        info!(org_id = id, entity_name, "Added organisation");
        Ok(id)
    }

    /// Gifts of `user_id` dated in calendar year `year`
    pub fn list_gifts_for_year(&self, user_id: i64, year: i32) -> Result<Vec<Gift>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM gift_items g
             LEFT JOIN organisations o ON o.org_id = g.org_id
             WHERE g.user_id = ? AND strftime('%Y', g.date) = ?
             ORDER BY g.date, g.id",
            GIFT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let gifts = stmt
            .query_map(params![user_id, format!("{:04}", year)], gift_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(gifts)
    }

    /// Every gift of `user_id`
    pub fn list_gifts(&self, user_id: i64) -> Result<Vec<Gift>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM gift_items g
             LEFT JOIN organisations o ON o.org_id = g.org_id
             WHERE g.user_id = ?
             ORDER BY g.date, g.id",
            GIFT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let gifts = stmt
            .query_map(params![user_id], gift_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(gifts)
    }

    /// Record a gift. It is tax deductible exactly when it names an organisation.
    pub fn insert_gift(&self, user_id: i64, gift: &NewGift) -> Result<i64> {
        let org_id = gift.organisation_id();
        if let Some(id) = org_id {
            if self.get_organisation(id)?.is_none() {
                return Err(Error::NotFound(format!("Organisation {}", id)));
            }
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO gift_items
                (user_id, gift_type, org_id, amount, date, description, receipt_url, is_tax_deductible)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                user_id,
                gift.gift_type,
                org_id,
                gift.amount,
                gift.date.format("%Y-%m-%d").to_string(),
                gift.description,
                gift.receipt,
                org_id.is_some(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        info!(user_id, gift_id = id, dgr = org_id.is_some(), "Recorded gift");
        Ok(id)
    }

    /// Owner of a gift, if the gift exists
    pub fn gift_owner(&self, gift_id: i64) -> Result<Option<i64>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT user_id FROM gift_items WHERE id = ?",
            params![gift_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(Into::into)
    }

    /// Delete a gift, returning whether it existed
    pub fn delete_gift(&self, gift_id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM gift_items WHERE id = ?", params![gift_id])?;
        Ok(deleted > 0)
    }
}
