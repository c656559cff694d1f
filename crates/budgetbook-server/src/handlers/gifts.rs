//! Giving tool handlers: organisations, gifts and receipt uploads

use std::sync::Arc;

use axum::{
    extract::{Multipart, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use super::read_upload;
use super::worksheet::requested_user;
use crate::{ensure_same_user, AppError, AppState, AuthUser, SuccessResponse};
use budgetbook_core::{
    models::{optional_id, Gift, NewGift, Organisation},
    Error as CoreError,
};

/// Receipt content types accepted for upload
const RECEIPT_TYPES: &[&str] = &["image/png", "image/jpeg", "application/pdf", "image/heic"];

#[derive(Debug, Deserialize)]
pub struct GiftQuery {
    #[serde(rename = "UserId", alias = "userId", default, deserialize_with = "optional_id")]
    pub user_id: Option<i64>,
    #[serde(rename = "Year", alias = "year", default)]
    pub year: Option<String>,
}

#[derive(Serialize)]
pub struct GiftsResponse {
    #[serde(rename = "IsData")]
    pub is_data: bool,
    #[serde(rename = "userGifts")]
    pub user_gifts: Vec<Gift>,
}

#[derive(Serialize)]
pub struct OrganisationsResponse {
    #[serde(rename = "IsData")]
    pub is_data: bool,
    #[serde(rename = "Organisations")]
    pub organisations: Vec<Organisation>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGiftsRequest {
    #[serde(rename = "UserId", default, deserialize_with = "optional_id")]
    pub user_id: Option<i64>,
    #[serde(rename = "NewGift")]
    pub new_gift: NewGift,
}

#[derive(Serialize)]
pub struct ReceiptResponse {
    #[serde(rename = "fileUrl")]
    pub file_url: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteGiftQuery {
    #[serde(rename = "GiftID", alias = "giftId", default, deserialize_with = "optional_id")]
    pub gift_id: Option<i64>,
}

/// GET /api/gifts/retrieve_gift_items - The user's gifts for one calendar year
pub async fn retrieve_gift_items(
    State(state): State<Arc<AppState>>,
    auth: Option<Extension<AuthUser>>,
    Query(query): Query<GiftQuery>,
) -> Result<Json<GiftsResponse>, AppError> {
    let Some(year) = query.year.as_deref() else {
        return Err(AppError::bad_request(
            "Missing required query parameters: UserId and Year",
        ));
    };
    let year: i32 = year
        .trim()
        .parse()
        .map_err(|_| AppError::bad_request(&format!("Invalid Year: {}", year)))?;
    let user_id = requested_user(query.user_id, auth.as_deref())?;

    let gifts = state.db.list_gifts_for_year(user_id, year)?;
    Ok(Json(GiftsResponse {
        is_data: !gifts.is_empty(),
        user_gifts: gifts,
    }))
}

/// GET /api/gifts/retrieve_orgs - The DGR organisation list
pub async fn retrieve_orgs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<OrganisationsResponse>, AppError> {
    let organisations = state.db.list_organisations()?;
    Ok(Json(OrganisationsResponse {
        is_data: true,
        organisations,
    }))
}

/// POST /api/gifts/update_gift_items - Record a gift, returning all of the user's gifts
pub async fn update_gift_items(
    State(state): State<Arc<AppState>>,
    auth: Option<Extension<AuthUser>>,
    Json(body): Json<UpdateGiftsRequest>,
) -> Result<Json<Vec<Gift>>, AppError> {
    let user_id = match body.user_id {
        Some(id) if id != 0 => id,
        _ => return Err(AppError::bad_request(&CoreError::MissingUserId.to_string())),
    };
    ensure_same_user(auth.as_deref(), user_id)?;

    state
        .db
        .insert_gift(user_id, &body.new_gift)
        .map_err(|e| match e {
            CoreError::NotFound(what) => AppError::not_found(&format!("{} not found", what)),
            other => AppError::from(other),
        })?;

    Ok(Json(state.db.list_gifts(user_id)?))
}

/// POST /api/gifts/upload_receipt - Store a receipt file, returning its URL
///
/// Expects multipart form with a `receipt` field (png, jpeg, pdf or heic).
pub async fn upload_receipt(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ReceiptResponse>, AppError> {
    let upload = read_upload(&mut multipart, "receipt").await?;

    let content_type = upload.content_type.as_deref().unwrap_or("");
    if !RECEIPT_TYPES.contains(&content_type) {
        return Err(AppError::bad_request(
            "Only .png, .jpeg, .pdf, or .heic files are allowed!",
        ));
    }

    let file_name = receipt_file_name(upload.file_name.as_deref(), &upload.bytes);
    let dir = &state.config.uploads_dir;
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(dir.join(&file_name), &upload.bytes).await?;

    info!(file = %file_name, bytes = upload.bytes.len(), "Stored receipt");
    Ok(Json(ReceiptResponse {
        file_url: format!("/uploads/{}", file_name),
    }))
}

/// POST /api/gifts/delete_gift - Delete one gift
pub async fn delete_gift(
    State(state): State<Arc<AppState>>,
    auth: Option<Extension<AuthUser>>,
    Query(query): Query<DeleteGiftQuery>,
) -> Result<Json<SuccessResponse>, AppError> {
    let gift_id = query
        .gift_id
        .ok_or_else(|| AppError::bad_request("Missing required query parameter: GiftID"))?;

    let owner = state
        .db
        .gift_owner(gift_id)?
        .ok_or_else(|| AppError::not_found("Gift not found"))?;
    ensure_same_user(auth.as_deref(), owner)?;

    state.db.delete_gift(gift_id)?;
    info!(gift_id, user_id = owner, "Deleted gift");
    Ok(Json(SuccessResponse { success: true }))
}

/// Content-addressed file name: hash prefix plus the sanitized original name
fn receipt_file_name(original: Option<&str>, bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let prefix = &hex::encode(digest)[..16];

    let base = original
        .and_then(|name| name.rsplit(['/', '\\']).next())
        .unwrap_or("receipt");
    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let sanitized = sanitized.trim_start_matches('.');

    if sanitized.is_empty() {
        prefix.to_string()
    } else {
        format!("{}-{}", prefix, sanitized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_file_name() {
        let name = receipt_file_name(Some("My Receipt (1).pdf"), b"pdf-bytes");
        assert!(name.ends_with("-My_Receipt__1_.pdf"));
        assert_eq!(name.len(), 16 + 1 + "My_Receipt__1_.pdf".len());

        // Same content, same prefix
        let again = receipt_file_name(Some("other.pdf"), b"pdf-bytes");
        assert_eq!(&name[..16], &again[..16]);
    }

    #[test]
    fn test_receipt_file_name_strips_paths() {
        let name = receipt_file_name(Some("../../etc/passwd"), b"x");
        assert!(name.ends_with("-passwd"));
        assert!(!name.contains('/'));

        let name = receipt_file_name(Some("..\\..\\evil.png"), b"x");
        assert!(name.ends_with("-evil.png"));

        let name = receipt_file_name(Some(".."), b"x");
        assert_eq!(name.len(), 16);
    }
}
