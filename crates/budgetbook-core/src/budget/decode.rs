//! Flat stored rows → fully enumerated budget tree

use tracing::warn;

use super::BudgetTree;
use crate::models::{BudgetItemLeaf, Frequency, StoredBudgetItem};
use crate::taxonomy;

/// Rebuild the budget tree from stored rows.
///
/// Every taxonomy slot is present in the result. Rows are placed by their
/// tertiary label; rows that cannot be placed or parsed are dropped with a
/// warning.
pub fn decode(rows: &[StoredBudgetItem]) -> BudgetTree {
    let mut tree = BudgetTree::empty();

    for row in rows {
        let Some(entry) = taxonomy::by_tertiary_label(&row.tertiary_category) else {
            warn!(
                tertiary_category = %row.tertiary_category,
                item = %row.item_name,
                "Dropping budget item with unrecognized category"
            );
            continue;
        };

        match leaf_from_row(row) {
            Some(leaf) => tree.slot_mut(entry).push(leaf),
            None => warn!(
                item = %row.item_name,
                amount = %row.current_amount,
                "Dropping budget item with unparseable amount"
            ),
        }
    }

    tree
}

fn leaf_from_row(row: &StoredBudgetItem) -> Option<BudgetItemLeaf> {
    let amount: f64 = row.current_amount.trim().parse().ok()?;

    let total = row
        .current_four_weekly_amount
        .as_deref()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .or_else(|| {
            row.frequency
                .parse::<Frequency>()
                .ok()
                .map(|f| f.four_weekly_amount(amount))
        })
        .unwrap_or(0.0);

    Some(BudgetItemLeaf {
        item: row.item_name.clone(),
        amount,
        frequency: row.frequency.clone(),
        total,
    })
}
