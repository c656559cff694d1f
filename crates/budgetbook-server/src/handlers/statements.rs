//! Bank statement upload and category summary handlers

use axum::{extract::Multipart, Json};
use serde_json::{Map, Value};
use tracing::info;

use super::read_upload;
use crate::AppError;
use budgetbook_core::{
    import::{self, StatementSummary, TransformedRow},
    Error as CoreError,
};

fn import_error(e: CoreError) -> AppError {
    match e {
        CoreError::Import(_) | CoreError::Csv(_) => AppError::bad_request(&e.to_string()),
        other => AppError::from(other),
    }
}

/// POST /api/upload - Summarize a bank statement CSV by category
///
/// Expects multipart form with a `file` field.
pub async fn upload_statement(mut multipart: Multipart) -> Result<Json<StatementSummary>, AppError> {
    let upload = read_upload(&mut multipart, "file").await?;
    let summary = import::summarize_statement(upload.bytes.as_slice()).map_err(import_error)?;

    info!(
        income = summary.income.len(),
        expenditure = summary.expenditure.len(),
        "Summarized statement"
    );
    Ok(Json(summary))
}

/// POST /api/upload_2 - Return a CSV as generic rows with positional headers
pub async fn upload_raw_csv(
    mut multipart: Multipart,
) -> Result<Json<Vec<Map<String, Value>>>, AppError> {
    let upload = read_upload(&mut multipart, "file").await?;
    let rows = import::raw_rows(upload.bytes.as_slice()).map_err(import_error)?;
    Ok(Json(rows))
}

/// POST /api/transform - Flatten a statement summary into one row per category
pub async fn transform_summary(Json(summary): Json<StatementSummary>) -> Json<Vec<TransformedRow>> {
    Json(import::transform_summary(&summary))
}
