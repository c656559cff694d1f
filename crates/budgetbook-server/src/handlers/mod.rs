//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod gifts;
pub mod health;
pub mod statements;
pub mod users;
pub mod worksheet;

// Re-export all handlers for use in router
pub use gifts::*;
pub use health::*;
pub use statements::*;
pub use users::*;
pub use worksheet::*;

use axum::extract::Multipart;

use crate::{AppError, MAX_UPLOAD_SIZE};

/// A file read from a multipart form
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Read the file field `field_name` from a multipart form, ignoring other fields
pub(crate) async fn read_upload(
    multipart: &mut Multipart,
    field_name: &str,
) -> Result<Upload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        if field.name() != Some(field_name) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|_| AppError::bad_request("Failed to read file data"))?;

        if bytes.len() > MAX_UPLOAD_SIZE {
            return Err(AppError::bad_request(&format!(
                "File too large. Maximum size is {} MB",
                MAX_UPLOAD_SIZE / 1024 / 1024
            )));
        }

        return Ok(Upload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(AppError::bad_request("No file uploaded"))
}
