//! Multipart form helpers.

use aerodict_common::{AppError, AppResult};
use aerodict_core::ImageUpload;
use axum::{
    extract::multipart::{Field, MultipartError},
    http::{HeaderMap, header},
};

pub fn multipart_error(e: MultipartError) -> AppError {
    AppError::BadRequest(e.to_string())
}

/// Whether the request body is `multipart/form-data`.
pub fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("multipart/form-data"))
}

/// Read a text field.
pub async fn text(field: Field<'_>) -> AppResult<String> {
    field.text().await.map_err(multipart_error)
}

/// Read a file field. Empty file inputs come back as `None`.
pub async fn file(field: Field<'_>) -> AppResult<Option<ImageUpload>> {
    let file_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let data = field.bytes().await.map_err(multipart_error)?.to_vec();

    if data.is_empty() {
        return Ok(None);
    }
    Ok(Some(ImageUpload {
        file_name,
        content_type,
        data,
    }))
}
