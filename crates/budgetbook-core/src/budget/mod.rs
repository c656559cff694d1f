//! Budget tree <-> flat budget item rows
//!
//! Clients exchange a nested tree (`Income` / `Expenditure` → secondary key →
//! tertiary key → list of line items). Storage keeps one flat row per line
//! item, labelled with display labels. [`encode`] flattens, [`decode`] rebuilds.

mod decode;
mod encode;

pub use decode::decode;
pub use encode::{encode, EncodedBudget};

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::models::BudgetItemLeaf;
use crate::taxonomy::{self, CategoryEntry, Primary};

/// Secondary key → tertiary key → line items
pub type CategoryTree = BTreeMap<String, BTreeMap<String, Vec<BudgetItemLeaf>>>;

/// Secondary key → tertiary key → raw leaf slot, as submitted
pub type SlotMap = BTreeMap<String, BTreeMap<String, serde_json::Value>>;

/// Fully enumerated budget tree returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetTree {
    #[serde(rename = "IsUserData")]
    pub is_user_data: bool,
    #[serde(rename = "Income")]
    pub income: CategoryTree,
    #[serde(rename = "Expenditure")]
    pub expenditure: CategoryTree,
}

impl BudgetTree {
    /// A tree with every taxonomy slot present and empty
    pub fn empty() -> Self {
        let mut tree = Self {
            is_user_data: true,
            income: BTreeMap::new(),
            expenditure: BTreeMap::new(),
        };
        for entry in taxonomy::entries() {
            tree.slot_mut(entry);
        }
        tree
    }

    pub fn branch(&self, primary: Primary) -> &CategoryTree {
        match primary {
            Primary::Income => &self.income,
            Primary::Expenditure => &self.expenditure,
        }
    }

    fn branch_mut(&mut self, primary: Primary) -> &mut CategoryTree {
        match primary {
            Primary::Income => &mut self.income,
            Primary::Expenditure => &mut self.expenditure,
        }
    }

    /// Line items stored under a slot, creating the slot if needed
    pub fn slot_mut(&mut self, entry: &CategoryEntry) -> &mut Vec<BudgetItemLeaf> {
        self.branch_mut(entry.primary)
            .entry(entry.secondary_key.to_string())
            .or_default()
            .entry(entry.tertiary_key.to_string())
            .or_default()
    }

    pub fn slot(&self, primary: Primary, secondary: &str, tertiary: &str) -> Option<&[BudgetItemLeaf]> {
        self.branch(primary)
            .get(secondary)
            .and_then(|t| t.get(tertiary))
            .map(|items| items.as_slice())
    }

    /// Total number of line items across all slots
    pub fn item_count(&self) -> usize {
        Primary::ALL
            .iter()
            .flat_map(|p| self.branch(*p).values())
            .flat_map(|t| t.values())
            .map(|items| items.len())
            .sum()
    }
}

/// Budget tree as submitted by a client
///
/// Leaf slots are kept as raw JSON so that non-list values can be skipped
/// instead of failing the whole request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetTreeInput {
    #[serde(rename = "Income", default, deserialize_with = "lenient_branch")]
    pub income: SlotMap,
    #[serde(rename = "Expenditure", default, deserialize_with = "lenient_branch")]
    pub expenditure: SlotMap,
}

/// Read a primary branch, treating `null` or non-object values at the branch
/// and secondary levels as empty.
fn lenient_branch<'de, D>(deserializer: D) -> std::result::Result<SlotMap, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(secondaries) = Value::deserialize(deserializer)? else {
        debug!("Skipping non-object budget branch");
        return Ok(SlotMap::new());
    };

    let branch: SlotMap = secondaries
        .into_iter()
        .filter_map(|(secondary, value)| match value {
            Value::Object(tertiaries) => Some((secondary, tertiaries.into_iter().collect())),
            _ => {
                debug!(secondary = %secondary, "Skipping non-object secondary");
                None
            }
        })
        .collect();
    Ok(branch)
}

impl BudgetTreeInput {
    pub fn branch(&self, primary: Primary) -> &SlotMap {
        match primary {
            Primary::Income => &self.income,
            Primary::Expenditure => &self.expenditure,
        }
    }
}

impl From<&BudgetTree> for BudgetTreeInput {
    fn from(tree: &BudgetTree) -> Self {
        let convert = |branch: &CategoryTree| -> SlotMap {
            branch
                .iter()
                .map(|(secondary, tertiaries)| {
                    let slots = tertiaries
                        .iter()
                        .map(|(tertiary, items)| {
                            let leaves = items
                                .iter()
                                .map(|leaf| {
                                    serde_json::json!({
                                        "item": leaf.item,
                                        "amount": leaf.amount,
                                        "frequency": leaf.frequency,
                                    })
                                })
                                .collect();
                            (tertiary.clone(), serde_json::Value::Array(leaves))
                        })
                        .collect();
                    (secondary.clone(), slots)
                })
                .collect()
        };

        Self {
            income: convert(&tree.income),
            expenditure: convert(&tree.expenditure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StoredBudgetItem;
    use serde_json::json;

    #[test]
    fn test_empty_tree_is_fully_enumerated() {
        let tree = BudgetTree::empty();
        assert!(tree.is_user_data);
        assert_eq!(tree.item_count(), 0);
        assert_eq!(tree.income.len(), 3);
        assert_eq!(tree.expenditure.len(), 8);
        for entry in taxonomy::entries() {
            let slot = tree.slot(entry.primary, entry.secondary_key, entry.tertiary_key);
            assert_eq!(slot, Some(&[][..]));
        }
    }

    #[test]
    fn test_empty_tree_serializes_with_client_names() {
        let value = serde_json::to_value(BudgetTree::empty()).unwrap();
        assert_eq!(value["IsUserData"], json!(true));
        assert_eq!(value["Income"]["Standard"]["StandardIncome"], json!([]));
        assert_eq!(value["Expenditure"]["LivingCosts"]["OtherLivingCosts"], json!([]));
        assert_eq!(value["Expenditure"]["FutureNeeds"]["Investment"], json!([]));
    }

    #[test]
    fn test_decode_then_reencode_is_lossless() {
        let input: BudgetTreeInput = serde_json::from_value(json!({
            "Income": {
                "Standard": {"StandardIncome": [{"item": "Salary", "amount": 4200, "frequency": "monthly"}]},
                "Other": {"OtherIncome": [{"item": "Interest", "amount": "12.50", "frequency": "quarterly"}]}
            },
            "Expenditure": {
                "LivingCosts": {"Other": [{"item": "Haircut", "amount": 35, "frequency": "four-weekly"}]},
                "Travel": {"Other": [{"item": "Bike service", "amount": 120, "frequency": "annually"}]},
                "FutureNeeds": {"Investments": [{"item": "ETF", "amount": 250, "frequency": "fortnightly"}]}
            }
        }))
        .unwrap();

        let first = encode(Some(3), &input).unwrap();
        assert!(first.rejected.is_empty());
        let stored: Vec<StoredBudgetItem> = first.rows.iter().map(StoredBudgetItem::from).collect();
        let tree = decode(&stored);

        let again = encode(Some(3), &BudgetTreeInput::from(&tree)).unwrap();
        assert!(again.rejected.is_empty());

        let mut before = first.rows.clone();
        let mut after = again.rows.clone();
        let key = |r: &crate::models::BudgetItemRow| (r.tertiary_category.clone(), r.item_name.clone());
        before.sort_by_key(key);
        after.sort_by_key(key);
        assert_eq!(before, after);
    }
}
