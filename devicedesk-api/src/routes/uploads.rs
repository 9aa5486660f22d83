/// Image attachment and retrieval endpoints
///
/// Uploads arrive as multipart form data. The handler pulls the expected
/// file field, hands the bytes to the blob store, and persists the returned
/// reference path on the owning entity. If the entity turns out not to
/// exist, the blob may already have been written; such orphans are accepted.
///
/// # Endpoints
///
/// - `POST /upload/:device_id` - attach a device image (field `deviceImage`)
/// - `POST /upload-user-image/:user_id` - attach a user image (field `userImage`)
/// - `GET /device-image/:device_id` - fetch the stored device image
/// - `GET /user-image/:user_id` - fetch the stored user image
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use devicedesk_shared::models::{device::Device, user::User};
use serde::Serialize;
use tokio_util::io::ReaderStream;

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Reference path of the stored blob
    pub path: String,
}

/// Attaches an image to a device
pub async fn attach_device_image(
    State(state): State<AppState>,
    Path(device_id): Path<i64>,
    multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let (file_name, bytes) = read_file_field(multipart, "deviceImage").await?;
    let path = state.blobs.store("deviceImage", &file_name, bytes).await?;

    let attached = Device::attach_image(&state.db, device_id, &path).await?;
    if !attached {
        return Err(ApiError::NotFound("Device not found".to_string()));
    }

    tracing::info!(device_id, path = %path, "Device image attached");
    Ok(Json(UploadResponse { path }))
}

/// Attaches an image to a user
pub async fn attach_user_image(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let (file_name, bytes) = read_file_field(multipart, "userImage").await?;
    let path = state.blobs.store("userImage", &file_name, bytes).await?;

    let attached = User::attach_image(&state.db, user_id, &path).await?;
    if !attached {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id, path = %path, "User image attached");
    Ok(Json(UploadResponse { path }))
}

/// Fetches the stored image of a device
pub async fn get_device_image(
    State(state): State<AppState>,
    Path(device_id): Path<i64>,
) -> ApiResult<Response> {
    let device = Device::find_by_id(&state.db, device_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Device not found".to_string()))?;

    let path = device
        .image_path
        .ok_or_else(|| ApiError::NotFound("Image not found".to_string()))?;

    serve_blob(&path).await
}

/// Fetches the stored image of a user
pub async fn get_user_image(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Response> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let path = user
        .image_path
        .ok_or_else(|| ApiError::NotFound("Image not found".to_string()))?;

    serve_blob(&path).await
}

/// Pulls the expected file field out of a multipart body
///
/// Rejected with a 400 before any store access when the field is absent or
/// the body is malformed.
async fn read_file_field(
    mut multipart: Multipart,
    field_name: &str,
) -> Result<(String, Bytes), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some(field_name) {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
            return Ok((file_name, bytes));
        }
    }

    Err(ApiError::BadRequest(format!(
        "Multipart field '{}' is required",
        field_name
    )))
}

/// Streams a stored blob back to the client
async fn serve_blob(path: &str) -> ApiResult<Response> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|_| ApiError::NotFound("Image not found".to_string()))?;

    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);

    Ok(([(header::CONTENT_TYPE, content_type_for(path))], body).into_response())
}

/// Maps a stored path's extension to a content type
fn content_type_for(path: &str) -> &'static str {
    let ext = std::path::Path::new(path)
        .extension()
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for_known_extensions() {
        assert_eq!(content_type_for("uploads/deviceImage-1.png"), "image/png");
        assert_eq!(content_type_for("uploads/userImage-2.JPG"), "image/jpeg");
        assert_eq!(content_type_for("uploads/a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("uploads/a.webp"), "image/webp");
    }

    #[test]
    fn test_content_type_fallback() {
        assert_eq!(content_type_for("uploads/blob"), "application/octet-stream");
        assert_eq!(content_type_for("uploads/a.bin"), "application/octet-stream");
    }
}
