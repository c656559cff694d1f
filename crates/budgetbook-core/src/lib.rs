//! BudgetBook Core Library
//!
//! Shared functionality for the BudgetBook personal finance backend:
//! - Fixed three-level category taxonomy for budget items
//! - Budget tree encoder/decoder (nested client tree <-> flat rows)
//! - Bank statement CSV import
//! - Password hashing
//! - Database access (users, budget items, organisations, gifts)

pub mod budget;
pub mod db;
pub mod error;
pub mod import;
pub mod models;
pub mod password;
pub mod taxonomy;

pub use budget::{decode, encode, BudgetTree, BudgetTreeInput, EncodedBudget};
pub use db::Database;
pub use error::{Error, Result};
pub use taxonomy::{CategoryEntry, Primary, UnknownCategory};
