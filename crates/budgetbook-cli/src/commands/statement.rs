//! Bank statement commands

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use budgetbook_core::import::{raw_rows, summarize_statement, transform_summary};
use serde_json::Value;

use super::truncate;

fn open_file(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open {}", path.display()))
}

pub fn cmd_statement_summarize(file: &Path, transform: bool, json: bool) -> Result<()> {
    let summary = summarize_statement(open_file(file)?)
        .with_context(|| format!("Failed to read statement {}", file.display()))?;

    if transform {
        let rows = transform_summary(&summary);
        if json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        println!();
        println!("📊 Categories");
        println!("   ─────────────────────────────────────────────");
        for row in rows {
            let kind = row.transaction_type.map(|t| t.as_str()).unwrap_or("-");
            println!(
                "   {:24} │ {:>10.2} │ {}",
                truncate(&row.category, 24),
                row.amount,
                kind
            );
        }
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if summary.is_empty() {
        println!("No categorised transactions found in {}", file.display());
        return Ok(());
    }

    println!();
    println!("💰 Income");
    println!("   ─────────────────────────────────────");
    for (category, total) in &summary.income {
        println!("   {:24} │ {:>10.2}", truncate(category, 24), total);
    }
    println!();
    println!("💸 Expenditure");
    println!("   ─────────────────────────────────────");
    for (category, total) in &summary.expenditure {
        println!("   {:24} │ {:>10.2}", truncate(category, 24), total);
    }

    let income: f64 = summary.income.values().sum();
    let spent: f64 = summary.expenditure.values().sum();
    println!();
    println!("   Net: {:.2}", income + spent);

    Ok(())
}

pub fn cmd_statement_raw(file: &Path, limit: usize) -> Result<()> {
    let rows = raw_rows(open_file(file)?)
        .with_context(|| format!("Failed to read CSV {}", file.display()))?;

    for row in rows.iter().take(limit) {
        let cells: Vec<String> = row
            .iter()
            .filter(|(key, _)| key.as_str() != "id")
            .map(|(_, value)| match value {
                Value::String(s) => truncate(s, 16),
                other => other.to_string(),
            })
            .collect();
        let id = row.get("id").cloned().unwrap_or(Value::Null);
        println!("   {:>4} │ {}", id, cells.join(" │ "));
    }

    if rows.len() > limit {
        println!("   ... {} more rows", rows.len() - limit);
    }

    Ok(())
}
