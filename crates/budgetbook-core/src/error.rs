//! Error types for BudgetBook

use thiserror::Error;

use crate::taxonomy::UnknownCategory;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Missing user_id in request body")]
    MissingUserId,

    #[error(transparent)]
    UnknownCategory(#[from] UnknownCategory),

    #[error("Password hashing error: {0}")]
    Password(String),
}

pub type Result<T> = std::result::Result<T, Error>;
