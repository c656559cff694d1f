//! Fixed budget category taxonomy
//!
//! Budget items are classified three levels deep: a primary category
//! (`Income` / `Expenditure`), a secondary category and a tertiary category.
//! Clients address slots by internal keys (`LivingCosts` / `OtherLivingCosts`),
//! while storage holds display labels (`Living Costs` / `Other Living`).
//!
//! The whole tree is one static table. Tertiary keys are not unique on their
//! own (several secondaries have an `Other` slot), so every key lookup goes
//! through the `(secondary, tertiary)` pair. Tertiary labels *are* unique,
//! which is what lets stored rows be placed back into the tree.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top level of the budget tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Primary {
    Income,
    Expenditure,
}

impl Primary {
    pub const ALL: [Primary; 2] = [Primary::Income, Primary::Expenditure];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expenditure => "Expenditure",
        }
    }
}

impl std::str::FromStr for Primary {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Income" => Ok(Self::Income),
            "Expenditure" => Ok(Self::Expenditure),
            _ => Err(format!("Unknown primary category: {}", s)),
        }
    }
}

impl std::fmt::Display for Primary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One leaf slot of the taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryEntry {
    pub primary: Primary,
    pub secondary_key: &'static str,
    pub secondary_label: &'static str,
    /// Canonical key, used when building trees
    pub tertiary_key: &'static str,
    pub tertiary_label: &'static str,
    /// Older client keys that still resolve to this slot
    pub aliases: &'static [&'static str],
}

impl CategoryEntry {
    /// Whether `key` names this slot's tertiary category
    pub fn matches_tertiary(&self, key: &str) -> bool {
        self.tertiary_key == key || self.aliases.contains(&key)
    }
}

const fn entry(
    primary: Primary,
    secondary: (&'static str, &'static str),
    tertiary: (&'static str, &'static str),
    aliases: &'static [&'static str],
) -> CategoryEntry {
    CategoryEntry {
        primary,
        secondary_key: secondary.0,
        secondary_label: secondary.1,
        tertiary_key: tertiary.0,
        tertiary_label: tertiary.1,
        aliases,
    }
}

use Primary::{Expenditure, Income};

const STANDARD: (&str, &str) = ("Standard", "Standard");
const BENEFIT: (&str, &str) = ("Benefit", "Benefit");
const OTHER_INCOME: (&str, &str) = ("Other", "Other Income");
const HOME: (&str, &str) = ("Home", "Home");
const LIVING_COSTS: (&str, &str) = ("LivingCosts", "Living Costs");
const TRAVEL: (&str, &str) = ("Travel", "Travel");
const FAMILY_PETS: (&str, &str) = ("FamilyPets", "Family Pets");
const LEISURE: (&str, &str) = ("Leisure", "Leisure");
const FUTURE_NEEDS: (&str, &str) = ("FutureNeeds", "Future Needs");
const GIVING: (&str, &str) = ("Giving", "Giving");
const DEBT_REPAYMENTS: (&str, &str) = ("DebtRepayments", "Debt Repayments");

/// Every slot of the budget tree, in display order
pub static TAXONOMY: &[CategoryEntry] = &[
    entry(Income, STANDARD, ("StandardIncome", "Standard Income"), &[]),
    entry(Income, BENEFIT, ("BenefitIncome", "Benefit Income"), &[]),
    entry(Income, OTHER_INCOME, ("OtherIncome", "Other Income"), &[]),
    entry(Expenditure, HOME, ("RentMortgage", "Rent Mortgage"), &[]),
    entry(Expenditure, HOME, ("Bills", "Bills"), &[]),
    entry(Expenditure, LIVING_COSTS, ("General", "General Living Costs"), &[]),
    entry(Expenditure, LIVING_COSTS, ("Health", "Health"), &[]),
    entry(Expenditure, LIVING_COSTS, ("OtherLivingCosts", "Other Living"), &["Other"]),
    entry(Expenditure, TRAVEL, ("Vehicle", "Vehicle"), &[]),
    entry(Expenditure, TRAVEL, ("PublicTransport", "Public Transport"), &[]),
    entry(Expenditure, TRAVEL, ("OtherTravel", "Other Travel"), &["Other"]),
    entry(Expenditure, FAMILY_PETS, ("SchoolCosts", "School Costs"), &[]),
    entry(Expenditure, FAMILY_PETS, ("PetCosts", "Pet Costs"), &[]),
    entry(Expenditure, FAMILY_PETS, ("OtherFamilyPets", "Other FamilyPets"), &["Other"]),
    entry(Expenditure, LEISURE, ("Subscriptions", "Subscriptions"), &[]),
    entry(Expenditure, LEISURE, ("Memberships", "Memberships"), &[]),
    entry(Expenditure, LEISURE, ("OtherLeisure", "Other Leisure"), &["Other"]),
    entry(Expenditure, FUTURE_NEEDS, ("Savings", "Savings"), &[]),
    entry(Expenditure, FUTURE_NEEDS, ("Investment", "Investment"), &["Investments"]),
    entry(Expenditure, GIVING, ("Giving", "Giving"), &[]),
    entry(Expenditure, DEBT_REPAYMENTS, ("Debts", "Debts"), &[]),
];

/// A category key that is not part of the taxonomy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown category: {}", self.path())]
pub struct UnknownCategory {
    pub primary: Option<Primary>,
    pub secondary: String,
    pub tertiary: Option<String>,
}

impl UnknownCategory {
    /// Dotted path of the offending slot, e.g. `Expenditure.Leisure.Bogus`
    pub fn path(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if let Some(primary) = self.primary {
            parts.push(primary.as_str().to_string());
        }
        parts.push(self.secondary.clone());
        if let Some(ref tertiary) = self.tertiary {
            parts.push(tertiary.clone());
        }
        parts.join(".")
    }
}

/// All taxonomy entries
pub fn entries() -> &'static [CategoryEntry] {
    TAXONOMY
}

/// Secondary keys under a primary category, in display order
pub fn secondaries(primary: Primary) -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = Vec::new();
    for e in TAXONOMY.iter().filter(|e| e.primary == primary) {
        if !keys.contains(&e.secondary_key) {
            keys.push(e.secondary_key);
        }
    }
    keys
}

/// Display label for a secondary key
pub fn secondary_label(secondary: &str) -> Result<&'static str, UnknownCategory> {
    TAXONOMY
        .iter()
        .find(|e| e.secondary_key == secondary)
        .map(|e| e.secondary_label)
        .ok_or_else(|| UnknownCategory {
            primary: None,
            secondary: secondary.to_string(),
            tertiary: None,
        })
}

/// Display label for a tertiary key under its secondary parent
pub fn tertiary_label(secondary: &str, tertiary: &str) -> Result<&'static str, UnknownCategory> {
    TAXONOMY
        .iter()
        .find(|e| e.secondary_key == secondary && e.matches_tertiary(tertiary))
        .map(|e| e.tertiary_label)
        .ok_or_else(|| UnknownCategory {
            primary: None,
            secondary: secondary.to_string(),
            tertiary: Some(tertiary.to_string()),
        })
}

/// Resolve a full `(primary, secondary, tertiary)` key path to its slot
pub fn lookup(
    primary: Primary,
    secondary: &str,
    tertiary: &str,
) -> Result<&'static CategoryEntry, UnknownCategory> {
    TAXONOMY
        .iter()
        .find(|e| {
            e.primary == primary && e.secondary_key == secondary && e.matches_tertiary(tertiary)
        })
        .ok_or_else(|| UnknownCategory {
            primary: Some(primary),
            secondary: secondary.to_string(),
            tertiary: Some(tertiary.to_string()),
        })
}

/// Whether `secondary` is a known secondary key under `primary`
pub fn has_secondary(primary: Primary, secondary: &str) -> bool {
    TAXONOMY
        .iter()
        .any(|e| e.primary == primary && e.secondary_key == secondary)
}

/// Find the slot whose tertiary display label is exactly `label`
pub fn by_tertiary_label(label: &str) -> Option<&'static CategoryEntry> {
    TAXONOMY.iter().find(|e| e.tertiary_label == label)
}
