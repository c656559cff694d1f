//! Domain models for BudgetBook

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::taxonomy::{CategoryEntry, Primary};

/// Round to whole cents
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format an amount the way storage keeps it (fixed two decimals)
pub fn format_amount(value: f64) -> String {
    format!("{:.2}", value)
}

/// How often a budget item recurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    Weekly,
    Fortnightly,
    FourWeekly,
    Monthly,
    Quarterly,
    Annually,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Fortnightly => "fortnightly",
            Self::FourWeekly => "four-weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annually => "annually",
        }
    }

    pub fn periods_per_year(&self) -> f64 {
        match self {
            Self::Weekly => 52.0,
            Self::Fortnightly => 26.0,
            Self::FourWeekly => 13.0,
            Self::Monthly => 12.0,
            Self::Quarterly => 4.0,
            Self::Annually => 1.0,
        }
    }

    /// Equivalent amount per four-week period (13 per year), rounded to cents
    pub fn four_weekly_amount(&self, amount: f64) -> f64 {
        round_cents(amount * self.periods_per_year() / 13.0)
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "fortnightly" => Ok(Self::Fortnightly),
            "four-weekly" | "4-weekly" | "four weekly" | "fourweekly" => Ok(Self::FourWeekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "annually" | "annual" | "yearly" => Ok(Self::Annually),
            _ => Err(format!("Unknown frequency: {}", s)),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A flat budget item row, ready to persist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetItemRow {
    pub user_id: i64,
    pub primary_category: Primary,
    /// Secondary display label
    pub secondary_category: String,
    /// Tertiary display label
    pub tertiary_category: String,
    pub item_name: String,
    pub current_amount: f64,
    pub frequency: String,
    pub current_four_weekly_amount: Option<f64>,
}

impl BudgetItemRow {
    /// Build a row for one leaf placed in `entry`
    pub fn new(user_id: i64, entry: &CategoryEntry, leaf: LeafInput) -> Self {
        let current_four_weekly_amount = leaf
            .frequency
            .parse::<Frequency>()
            .ok()
            .map(|f| f.four_weekly_amount(leaf.amount));

        Self {
            user_id,
            primary_category: entry.primary,
            secondary_category: entry.secondary_label.to_string(),
            tertiary_category: entry.tertiary_label.to_string(),
            item_name: leaf.item,
            current_amount: leaf.amount,
            frequency: leaf.frequency,
            current_four_weekly_amount,
        }
    }
}

/// A budget item row as read back from storage (amounts are numeric text)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredBudgetItem {
    pub primary_category: String,
    pub secondary_category: String,
    pub tertiary_category: String,
    pub item_name: String,
    pub current_amount: String,
    pub frequency: String,
    pub current_four_weekly_amount: Option<String>,
}

impl From<&BudgetItemRow> for StoredBudgetItem {
    fn from(row: &BudgetItemRow) -> Self {
        Self {
            primary_category: row.primary_category.as_str().to_string(),
            secondary_category: row.secondary_category.clone(),
            tertiary_category: row.tertiary_category.clone(),
            item_name: row.item_name.clone(),
            current_amount: format_amount(row.current_amount),
            frequency: row.frequency.clone(),
            current_four_weekly_amount: row.current_four_weekly_amount.map(format_amount),
        }
    }
}

/// A budget line item as submitted by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafInput {
    pub item: String,
    #[serde(deserialize_with = "flexible_amount")]
    pub amount: f64,
    pub frequency: String,
}

/// A budget line item as returned to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetItemLeaf {
    pub item: String,
    pub amount: f64,
    pub frequency: String,
    /// Four-weekly equivalent of `amount`
    pub total: f64,
}

/// A registered user
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: i64,
    pub email: String,
    /// Argon2 PHC string
    pub hash: String,
}

/// A Deductible Gift Recipient organisation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organisation {
    pub org_id: i64,
    pub entity_name: String,
    pub abn: Option<i64>,
}

/// A recorded gift or donation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gift {
    pub id: i64,
    pub gift_type: String,
    /// Organisation entity name, if the gift went to a listed organisation
    pub organisation: Option<String>,
    pub amount: f64,
    pub date: NaiveDate,
    pub description: Option<String>,
    /// URL path of the uploaded receipt
    pub receipt: Option<String>,
    /// Tax deductible (gift to a listed organisation)
    pub dgr: bool,
}

/// Reference to an organisation inside a new gift
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganisationRef {
    #[serde(default, deserialize_with = "optional_id")]
    pub org_id: Option<i64>,
}

/// A gift to be inserted
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGift {
    pub gift_type: String,
    #[serde(default)]
    pub organisation: Option<OrganisationRef>,
    #[serde(deserialize_with = "flexible_amount")]
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub receipt: Option<String>,
}

impl NewGift {
    pub fn organisation_id(&self) -> Option<i64> {
        self.organisation.as_ref().and_then(|o| o.org_id)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Accept an id sent either as a JSON number or a numeric string
pub fn optional_id<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Int(n)) => Ok(Some(n)),
        Some(NumberOrText::Float(f)) if f.fract() == 0.0 => Ok(Some(f as i64)),
        Some(NumberOrText::Float(f)) => Err(D::Error::custom(format!("invalid id: {}", f))),
        Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid id: {}", s))),
    }
}

/// Accept an amount sent either as a JSON number or a numeric string
pub fn flexible_amount<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let amount = match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Int(n) => n as f64,
        NumberOrText::Float(f) => f,
        NumberOrText::Text(s) => s
            .trim()
            .replace(['$', ','], "")
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid amount: {}", s)))?,
    };

    // "NaN" and "inf" parse as f64 but have no JSON representation
    if !amount.is_finite() {
        return Err(D::Error::custom(format!("invalid amount: {}", amount)));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_parse() {
        assert_eq!("Monthly".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert_eq!("4-weekly".parse::<Frequency>().unwrap(), Frequency::FourWeekly);
        assert_eq!("yearly".parse::<Frequency>().unwrap(), Frequency::Annually);
        assert!("sometimes".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_four_weekly_amount() {
        assert_eq!(Frequency::Annually.four_weekly_amount(365.0), 28.08);
        assert_eq!(Frequency::Weekly.four_weekly_amount(10.0), 40.0);
        assert_eq!(Frequency::Fortnightly.four_weekly_amount(100.0), 200.0);
        assert_eq!(Frequency::FourWeekly.four_weekly_amount(55.5), 55.5);
        assert_eq!(Frequency::Monthly.four_weekly_amount(1300.0), 1200.0);
    }

    #[test]
    fn test_leaf_input_accepts_string_amount() {
        let leaf: LeafInput =
            serde_json::from_str(r#"{"item": "Rent", "amount": "1,250.50", "frequency": "monthly"}"#)
                .unwrap();
        assert_eq!(leaf.amount, 1250.5);

        let leaf: LeafInput =
            serde_json::from_str(r#"{"item": "Rent", "amount": 900, "frequency": "monthly"}"#)
                .unwrap();
        assert_eq!(leaf.amount, 900.0);

        let bad: std::result::Result<LeafInput, _> =
            serde_json::from_str(r#"{"item": "Rent", "amount": "lots", "frequency": "monthly"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_amount_rejects_non_finite() {
        for text in ["NaN", "inf", "-inf", "infinity"] {
            let json = format!(r#"{{"item": "Gas", "amount": "{}", "frequency": "monthly"}}"#, text);
            let leaf: std::result::Result<LeafInput, _> = serde_json::from_str(&json);
            assert!(leaf.is_err(), "{} should be rejected", text);
        }

        let gift: std::result::Result<NewGift, _> = serde_json::from_str(
            r#"{"giftType": "One-off", "amount": "NaN", "date": "2025-05-23"}"#,
        );
        assert!(gift.is_err());
    }

    #[test]
    fn test_new_gift_organisation_optional() {
        let gift: NewGift = serde_json::from_str(
            r#"{"giftType": "One-off", "amount": 50, "date": "2025-05-23", "organisation": {"orgId": "3"}}"#,
        )
        .unwrap();
        assert_eq!(gift.organisation_id(), Some(3));
        assert!(gift.description.is_none());

        let gift: NewGift = serde_json::from_str(
            r#"{"giftType": "Offering", "amount": "20.00", "date": "2025-06-27", "organisation": null}"#,
        )
        .unwrap();
        assert_eq!(gift.organisation_id(), None);
        assert_eq!(gift.amount, 20.0);
    }

    #[test]
    fn test_stored_item_from_row_formats_amounts() {
        let entry = crate::taxonomy::lookup(Primary::Expenditure, "Home", "Bills").unwrap();
        let row = BudgetItemRow::new(
            1,
            entry,
            LeafInput {
                item: "Water".to_string(),
                amount: 60.0,
                frequency: "quarterly".to_string(),
            },
        );
        let stored = StoredBudgetItem::from(&row);
        assert_eq!(stored.current_amount, "60.00");
        assert_eq!(stored.current_four_weekly_amount.as_deref(), Some("18.46"));
        assert_eq!(stored.primary_category, "Expenditure");
    }
}
