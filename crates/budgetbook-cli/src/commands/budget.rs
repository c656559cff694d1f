//! Saved budget commands

use anyhow::Result;
use budgetbook_core::{db::Database, decode, BudgetTree, Primary};

use super::truncate;

/// Four-weekly totals of one branch of the tree
pub fn branch_total(tree: &BudgetTree, primary: Primary) -> f64 {
    tree.branch(primary)
        .values()
        .flat_map(|tertiaries| tertiaries.values())
        .flatten()
        .map(|leaf| leaf.total)
        .sum()
}

pub fn cmd_budget_show(db: &Database, user_id: i64, json: bool) -> Result<()> {
    let tree = decode(&db.list_budget_items(user_id)?);

    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
        return Ok(());
    }

    if tree.item_count() == 0 {
        println!("No budget saved for user {}", user_id);
        return Ok(());
    }

    for primary in Primary::ALL {
        println!();
        println!("📒 {}", primary.as_str());
        println!("   ─────────────────────────────────────────────────────────────");
        for (secondary, tertiaries) in tree.branch(primary) {
            for (tertiary, leaves) in tertiaries {
                for leaf in leaves {
                    println!(
                        "   {:28} │ {:20} │ {:>9.2} {:<12} │ {:>9.2}",
                        format!("{}.{}", secondary, tertiary),
                        truncate(&leaf.item, 20),
                        leaf.amount,
                        leaf.frequency,
                        leaf.total
                    );
                }
            }
        }
    }

    let income = branch_total(&tree, Primary::Income);
    let expenditure = branch_total(&tree, Primary::Expenditure);
    println!();
    println!("   Four-weekly income:      {:>10.2}", income);
    println!("   Four-weekly expenditure: {:>10.2}", expenditure);
    println!("   Surplus:                 {:>10.2}", income - expenditure);

    Ok(())
}
