//! Budget worksheet handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{ensure_same_user, AppError, AppState, AuthUser};
use budgetbook_core::{
    decode, encode, models::optional_id, BudgetTree, BudgetTreeInput, Error as CoreError,
};

/// Body of a worksheet save: the user id next to the budget tree
#[derive(Debug, Deserialize)]
pub struct SaveItemsRequest {
    #[serde(rename = "UserId", default, deserialize_with = "optional_id")]
    pub user_id: Option<i64>,
    #[serde(flatten)]
    pub tree: BudgetTreeInput,
}

#[derive(Serialize)]
pub struct SaveItemsResponse {
    pub message: String,
    #[serde(rename = "insertedRows")]
    pub inserted_rows: usize,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    #[serde(rename = "UserId", alias = "userId", default, deserialize_with = "optional_id")]
    pub user_id: Option<i64>,
}

/// Pick the user a read request is about: the query parameter, falling back
/// to the authenticated user.
pub(crate) fn requested_user(
    user_id: Option<i64>,
    auth: Option<&AuthUser>,
) -> Result<i64, AppError> {
    let user_id = user_id
        .or(auth.map(|a| a.user_id))
        .ok_or_else(|| AppError::bad_request("Missing required query parameter: UserId"))?;
    ensure_same_user(auth, user_id)?;
    Ok(user_id)
}

/// POST /api/worksheet/save_items - Replace the user's budget with the submitted tree
pub async fn save_items(
    State(state): State<Arc<AppState>>,
    auth: Option<Extension<AuthUser>>,
    Json(body): Json<SaveItemsRequest>,
) -> Result<Json<SaveItemsResponse>, AppError> {
    let encoded = encode(body.user_id, &body.tree).map_err(|e| match e {
        CoreError::MissingUserId | CoreError::InvalidData(_) => {
            AppError::bad_request(&e.to_string())
        }
        other => AppError::from(other),
    })?;

    if !encoded.is_valid() {
        return Err(AppError::bad_request(&format!(
            "Unknown categories: {}",
            encoded.rejected_paths().join(", ")
        )));
    }

    ensure_same_user(auth.as_deref(), encoded.user_id)?;

    let inserted_rows = state
        .db
        .replace_budget_items(encoded.user_id, &encoded.rows)?;

    info!(user_id = encoded.user_id, inserted_rows, "Saved budget worksheet");
    Ok(Json(SaveItemsResponse {
        message: "Existing records deleted, new data inserted successfully".to_string(),
        inserted_rows,
    }))
}

/// GET /api/worksheet/retrieve_items - The user's budget as a fully enumerated tree
pub async fn retrieve_items(
    State(state): State<Arc<AppState>>,
    auth: Option<Extension<AuthUser>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<BudgetTree>, AppError> {
    let user_id = requested_user(query.user_id, auth.as_deref())?;
    let rows = state.db.list_budget_items(user_id)?;
    Ok(Json(decode(&rows)))
}
