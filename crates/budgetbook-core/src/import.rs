//! Bank statement CSV import
//!
//! Statements are exported with a header row and five columns:
//! `Date, Amount, Name, Balance, Category`. Columns are read by position, so
//! the header text itself is not checked.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;

use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::round_cents;
use crate::taxonomy::Primary;

/// Categories excluded from the summary
const TRANSFER_CATEGORY: &str = "Transfer";
const NULL_CATEGORY: &str = "Null";

/// Per-category totals of a statement, split by sign
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementSummary {
    /// Categories with a positive total
    #[serde(rename = "Income", default)]
    pub income: BTreeMap<String, f64>,
    /// Categories with a negative total (kept negative)
    #[serde(rename = "Expenditure", default)]
    pub expenditure: BTreeMap<String, f64>,
}

impl StatementSummary {
    pub fn is_empty(&self) -> bool {
        self.income.is_empty() && self.expenditure.is_empty()
    }
}

/// One category of a transformed summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformedRow {
    #[serde(rename = "Transaction Cat")]
    pub category: String,
    /// Absolute amount
    #[serde(rename = "Amount")]
    pub amount: f64,
    /// `None` when neither side of the category is positive
    #[serde(rename = "Transaction Type")]
    pub transaction_type: Option<Primary>,
}

/// Summarize a statement CSV into per-category income and expenditure totals.
///
/// Rows in the `Transfer` category are ignored. Totals for the `Null`
/// category, blank categories and totals of zero are dropped.
pub fn summarize_statement<R: Read>(reader: R) -> Result<StatementSummary> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut sums: BTreeMap<String, f64> = BTreeMap::new();
    let mut row_count = 0usize;

    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        // Header is line 1
        let line = index + 2;

        let date_str = record
            .get(0)
            .ok_or_else(|| Error::Import(format!("Line {}: missing date", line)))?;
        parse_statement_date(date_str)
            .map_err(|e| Error::Import(format!("Line {}: {}", line, e)))?;

        let amount_str = record
            .get(1)
            .ok_or_else(|| Error::Import(format!("Line {}: missing amount", line)))?;
        let amount = parse_amount(amount_str)
            .map_err(|e| Error::Import(format!("Line {}: {}", line, e)))?;

        let category = record.get(4).unwrap_or("").trim();
        row_count += 1;

        if category == TRANSFER_CATEGORY {
            continue;
        }

        *sums.entry(category.to_string()).or_insert(0.0) += amount;
    }

    let mut summary = StatementSummary::default();
    for (category, total) in sums {
        if category.is_empty() || category == NULL_CATEGORY {
            continue;
        }
        let total = round_cents(total);
        if total > 0.0 {
            summary.income.insert(category, total);
        } else if total < 0.0 {
            summary.expenditure.insert(category, total);
        }
    }

    debug!(
        rows = row_count,
        income = summary.income.len(),
        expenditure = summary.expenditure.len(),
        "Summarized statement"
    );
    Ok(summary)
}

/// Read any CSV as raw rows.
///
/// Every line (including the first) becomes an object with a 1-based `id`
/// and generic `header_1..header_N` keys holding the cell text. Short rows
/// are padded with empty strings.
pub fn raw_rows<R: Read>(reader: R) -> Result<Vec<Map<String, Value>>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let records = rdr.records().collect::<std::result::Result<Vec<_>, _>>()?;
    let width = records.iter().map(|r| r.len()).max().unwrap_or(0);

    let rows = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let mut row = Map::new();
            row.insert("id".to_string(), Value::from(index as u64 + 1));
            for col in 0..width {
                let cell = record.get(col).unwrap_or("");
                row.insert(format!("header_{}", col + 1), Value::String(cell.to_string()));
            }
            row
        })
        .collect::<Vec<_>>();

    debug!(rows = rows.len(), columns = width, "Read raw CSV rows");
    Ok(rows)
}

/// Flatten a summary into one row per category with an absolute amount.
///
/// A category present on both sides takes its expenditure figure when that
/// is positive after taking the absolute value.
pub fn transform_summary(summary: &StatementSummary) -> Vec<TransformedRow> {
    let categories: BTreeSet<&String> = summary
        .income
        .keys()
        .chain(summary.expenditure.keys())
        .collect();

    categories
        .into_iter()
        .map(|category| {
            let income = summary.income.get(category).copied().unwrap_or(-1.0);
            let expenditure = summary
                .expenditure
                .get(category)
                .map(|v| v.abs())
                .unwrap_or(-1.0);

            let (amount, transaction_type) = if expenditure > 0.0 {
                (expenditure, Some(Primary::Expenditure))
            } else if income > 0.0 {
                (income, Some(Primary::Income))
            } else {
                (0.0, None)
            };

            TransformedRow {
                category: category.clone(),
                amount,
                transaction_type,
            }
        })
        .collect()
}

fn parse_statement_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%d/%m/%Y")
        .map_err(|_| format!("unable to parse date: {}", s))
}

fn parse_amount(s: &str) -> std::result::Result<f64, String> {
    let cleaned = s.trim().replace(['$', ',', ' '], "");

    cleaned
        .parse::<f64>()
        .map_err(|_| format!("unable to parse amount: {}", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATEMENT: &str = "\
Date,Amount,Name,Balance,Category
01/03/2025,2500.00,ACME PAYROLL,3100.00,Salary
03/03/2025,-85.40,WOOLWORTHS,3014.60,Groceries
05/03/2025,-40.10,COLES,2974.50,Groceries
07/03/2025,-500.00,TO SAVINGS,2474.50,Transfer
09/03/2025,12.00,REFUND,2486.50,Null
10/03/2025,-30.00,CAFE,2456.50,Dining
11/03/2025,30.00,CAFE REFUND,2486.50,Dining
15/03/2025,2500.00,ACME PAYROLL,4986.50,Salary
";

    #[test]
    fn test_summarize_statement() {
        let summary = summarize_statement(STATEMENT.as_bytes()).unwrap();

        assert_eq!(summary.income.len(), 1);
        assert_eq!(summary.income["Salary"], 5000.0);
        assert_eq!(summary.expenditure.len(), 1);
        assert_eq!(summary.expenditure["Groceries"], -125.5);
        // Transfer ignored, Null dropped, Dining nets to zero
        assert!(!summary.expenditure.contains_key("Transfer"));
        assert!(!summary.income.contains_key("Null"));
        assert!(!summary.expenditure.contains_key("Dining"));
    }

    #[test]
    fn test_summarize_serializes_with_client_names() {
        let summary = summarize_statement(STATEMENT.as_bytes()).unwrap();
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["Income"]["Salary"], serde_json::json!(5000.0));
        assert_eq!(value["Expenditure"]["Groceries"], serde_json::json!(-125.5));
    }

    #[test]
    fn test_summarize_rejects_bad_date() {
        let csv = "Date,Amount,Name,Balance,Category\n2025-03-01,10.00,X,10.00,Misc\n";
        let err = summarize_statement(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Line 2"));
    }

    #[test]
    fn test_summarize_rejects_bad_amount() {
        let csv = "Date,Amount,Name,Balance,Category\n01/03/2025,ten,X,10.00,Misc\n";
        assert!(matches!(
            summarize_statement(csv.as_bytes()),
            Err(Error::Import(_))
        ));
    }

    #[test]
    fn test_summarize_header_only() {
        let csv = "Date,Amount,Name,Balance,Category\n";
        assert!(summarize_statement(csv.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_raw_rows() {
        let csv = "a,b,c\n1,2\n";
        let rows = raw_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], serde_json::json!(1));
        assert_eq!(rows[0]["header_1"], serde_json::json!("a"));
        assert_eq!(rows[0]["header_3"], serde_json::json!("c"));
        assert_eq!(rows[1]["id"], serde_json::json!(2));
        assert_eq!(rows[1]["header_2"], serde_json::json!("2"));
        assert_eq!(rows[1]["header_3"], serde_json::json!(""));
    }

    #[test]
    fn test_raw_rows_empty() {
        assert!(raw_rows("".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_transform_summary() {
        let mut summary = StatementSummary::default();
        summary.income.insert("Salary".to_string(), 5000.0);
        summary.expenditure.insert("Groceries".to_string(), -125.5);
        summary.expenditure.insert("Rent".to_string(), -1800.0);

        let rows = transform_summary(&summary);
        assert_eq!(
            rows,
            vec![
                TransformedRow {
                    category: "Groceries".to_string(),
                    amount: 125.5,
                    transaction_type: Some(Primary::Expenditure),
                },
                TransformedRow {
                    category: "Rent".to_string(),
                    amount: 1800.0,
                    transaction_type: Some(Primary::Expenditure),
                },
                TransformedRow {
                    category: "Salary".to_string(),
                    amount: 5000.0,
                    transaction_type: Some(Primary::Income),
                },
            ]
        );
    }

    #[test]
    fn test_transform_non_positive_income() {
        let mut summary = StatementSummary::default();
        summary.income.insert("Odd".to_string(), 0.0);

        let rows = transform_summary(&summary);
        assert_eq!(rows[0].amount, 0.0);
        assert_eq!(rows[0].transaction_type, None);

        let value = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(value["Transaction Type"], Value::Null);
        assert_eq!(value["Transaction Cat"], serde_json::json!("Odd"));
    }
}
