//! Nested budget tree → flat rows

use serde::Deserialize;
use tracing::debug;

use super::BudgetTreeInput;
use crate::error::{Error, Result};
use crate::models::{BudgetItemRow, LeafInput};
use crate::taxonomy::{self, Primary, UnknownCategory};

/// Result of flattening a submitted tree
#[derive(Debug, Clone)]
pub struct EncodedBudget {
    /// Owner of every row
    pub user_id: i64,
    pub rows: Vec<BudgetItemRow>,
    /// Slots whose keys are not in the taxonomy
    pub rejected: Vec<UnknownCategory>,
}

impl EncodedBudget {
    pub fn is_valid(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Dotted paths of every rejected slot
    pub fn rejected_paths(&self) -> Vec<String> {
        self.rejected.iter().map(|r| r.path()).collect()
    }
}

/// Flatten a submitted budget tree into rows owned by `user_id`.
///
/// Empty lists and non-list slots produce no rows. Unknown slots are
/// collected in [`EncodedBudget::rejected`] rather than aborting, so callers
/// can report all of them at once.
pub fn encode(user_id: Option<i64>, tree: &BudgetTreeInput) -> Result<EncodedBudget> {
    let user_id = match user_id {
        Some(id) if id != 0 => id,
        _ => return Err(Error::MissingUserId),
    };

    let mut encoded = EncodedBudget {
        user_id,
        rows: Vec::new(),
        rejected: Vec::new(),
    };

    for primary in Primary::ALL {
        for (secondary, tertiaries) in tree.branch(primary) {
            if !taxonomy::has_secondary(primary, secondary) {
                encoded.rejected.push(UnknownCategory {
                    primary: Some(primary),
                    secondary: secondary.clone(),
                    tertiary: None,
                });
                continue;
            }

            for (tertiary, slot) in tertiaries {
                let entry = match taxonomy::lookup(primary, secondary, tertiary) {
                    Ok(entry) => entry,
                    Err(unknown) => {
                        encoded.rejected.push(unknown);
                        continue;
                    }
                };

                let Some(items) = slot.as_array() else {
                    debug!(primary = %primary, secondary = %secondary, tertiary = %tertiary, "Skipping non-list slot");
                    continue;
                };

                for (index, value) in items.iter().enumerate() {
                    let leaf = LeafInput::deserialize(value).map_err(|e| {
                        Error::InvalidData(format!(
                            "{}.{}.{}[{}]: {}",
                            primary, secondary, tertiary, index, e
                        ))
                    })?;
                    encoded.rows.push(BudgetItemRow::new(user_id, entry, leaf));
                }
            }
        }
    }

    debug!(
        user_id,
        rows = encoded.rows.len(),
        rejected = encoded.rejected.len(),
        "Encoded budget tree"
    );

    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> BudgetTreeInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_encode_single_income_item() {
        let input = tree(json!({
            "Income": {"Standard": {"StandardIncome": [
                {"item": "Salary", "amount": 1000, "frequency": "monthly"}
            ]}}
        }));

        let encoded = encode(Some(7), &input).unwrap();
        assert!(encoded.is_valid());
        assert_eq!(encoded.user_id, 7);
        assert_eq!(encoded.rows.len(), 1);

        let row = &encoded.rows[0];
        assert_eq!(row.user_id, 7);
        assert_eq!(row.primary_category, Primary::Income);
        assert_eq!(row.secondary_category, "Standard");
        assert_eq!(row.tertiary_category, "Standard Income");
        assert_eq!(row.item_name, "Salary");
        assert_eq!(row.current_amount, 1000.0);
        assert_eq!(row.frequency, "monthly");
        assert_eq!(row.current_four_weekly_amount, Some(923.08));
    }

    #[test]
    fn test_encode_missing_user_id() {
        let input = tree(json!({
            "Income": {"Standard": {"StandardIncome": [
                {"item": "Salary", "amount": 1000, "frequency": "monthly"}
            ]}}
        }));

        assert!(matches!(encode(None, &input), Err(Error::MissingUserId)));
        assert!(matches!(encode(Some(0), &input), Err(Error::MissingUserId)));
    }

    #[test]
    fn test_encode_skips_empty_and_non_list_slots() {
        let input = tree(json!({
            "Income": {"Standard": {"StandardIncome": []}},
            "Expenditure": {
                "Home": {"Bills": "n/a", "RentMortgage": null},
                "Giving": {"Giving": {"item": "not a list"}}
            }
        }));

        let encoded = encode(Some(1), &input).unwrap();
        assert!(encoded.is_valid());
        assert!(encoded.rows.is_empty());
    }

    #[test]
    fn test_encode_other_resolves_by_parent() {
        let input = tree(json!({
            "Expenditure": {
                "Travel": {"Other": [{"item": "Tolls", "amount": 15, "frequency": "weekly"}]},
                "Leisure": {"Other": [{"item": "Concerts", "amount": 80, "frequency": "quarterly"}]},
                "FamilyPets": {"OtherFamilyPets": [{"item": "Gifts", "amount": 40, "frequency": "monthly"}]}
            }
        }));

        let encoded = encode(Some(2), &input).unwrap();
        let mut labels: Vec<(&str, &str)> = encoded
            .rows
            .iter()
            .map(|r| (r.secondary_category.as_str(), r.tertiary_category.as_str()))
            .collect();
        labels.sort();
        assert_eq!(
            labels,
            vec![
                ("Family Pets", "Other FamilyPets"),
                ("Leisure", "Other Leisure"),
                ("Travel", "Other Travel"),
            ]
        );
    }

    #[test]
    fn test_encode_collects_unknown_slots() {
        let input = tree(json!({
            "Income": {"Lottery": {"Jackpot": []}},
            "Expenditure": {
                "Leisure": {"Bogus": [{"item": "x", "amount": 1, "frequency": "weekly"}]},
                "Home": {"Bills": [{"item": "Power", "amount": 120, "frequency": "monthly"}]}
            }
        }));

        let encoded = encode(Some(4), &input).unwrap();
        assert!(!encoded.is_valid());
        assert_eq!(
            encoded.rejected_paths(),
            vec!["Income.Lottery", "Expenditure.Leisure.Bogus"]
        );
        // Known slots are still flattened
        assert_eq!(encoded.rows.len(), 1);
        assert_eq!(encoded.rows[0].tertiary_category, "Bills");
    }

    #[test]
    fn test_encode_unknown_frequency_has_no_four_weekly() {
        let input = tree(json!({
            "Expenditure": {"DebtRepayments": {"Debts": [
                {"item": "Card", "amount": "55.10", "frequency": "whenever"}
            ]}}
        }));

        let encoded = encode(Some(5), &input).unwrap();
        assert_eq!(encoded.rows[0].current_amount, 55.1);
        assert_eq!(encoded.rows[0].current_four_weekly_amount, None);
    }

    #[test]
    fn test_encode_malformed_leaf_is_invalid_data() {
        let input = tree(json!({
            "Expenditure": {"Home": {"Bills": [{"item": "Power"}]}}
        }));

        let err = encode(Some(5), &input).unwrap_err();
        assert!(matches!(err, Error::InvalidData(ref msg) if msg.starts_with("Expenditure.Home.Bills[0]")));
    }

    #[test]
    fn test_encode_non_finite_amount_is_invalid_data() {
        let input = tree(json!({
            "Expenditure": {"Home": {"Bills": [
                {"item": "Gas", "amount": "NaN", "frequency": "monthly"}
            ]}}
        }));

        let err = encode(Some(5), &input).unwrap_err();
        assert!(matches!(err, Error::InvalidData(ref msg) if msg.starts_with("Expenditure.Home.Bills[0]")));
    }

    #[test]
    fn test_encode_null_branches_contribute_nothing() {
        let input = tree(json!({
            "Income": null,
            "Expenditure": {
                "Giving": null,
                "Travel": [],
                "Home": {"Bills": [{"item": "Power", "amount": 120, "frequency": "monthly"}]}
            }
        }));

        let encoded = encode(Some(5), &input).unwrap();
        assert!(encoded.is_valid());
        assert_eq!(encoded.rows.len(), 1);
        assert_eq!(encoded.rows[0].item_name, "Power");
    }
}
