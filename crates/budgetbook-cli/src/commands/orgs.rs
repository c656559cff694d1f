//! Gift recipient organisation commands

use anyhow::{Context, Result};
use budgetbook_core::db::Database;

use super::truncate;

pub fn cmd_orgs_list(db: &Database) -> Result<()> {
    let orgs = db.list_organisations()?;

    if orgs.is_empty() {
        println!("No organisations yet. Add one with:");
        println!("  budgetbook orgs add \"Red Cross\" --abn 50169561394");
        return Ok(());
    }

    println!();
    println!("🏛  Gift Recipients");
    println!("   ─────────────────────────────────────────────────");

    for org in orgs {
        let abn = org
            .abn
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "   {:>4} │ {:32} │ {:>11}",
            org.org_id,
            truncate(&org.entity_name, 32),
            abn
        );
    }

    Ok(())
}

pub fn cmd_orgs_add(db: &Database, name: &str, abn: Option<i64>) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Organisation name cannot be empty");
    }

    let org_id = db
        .add_organisation(name, abn)
        .with_context(|| format!("Failed to add organisation '{}'", name))?;

    println!("✅ Added {} (ID: {})", name, org_id);
    Ok(())
}
