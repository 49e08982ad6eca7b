use crate::domain::entities::UploadedFile;
use crate::infrastructure::http::middleware::{ApiError, ApiResult, AppState, AuthenticatedUser};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};

/// POST /api/uploads - multipart form with a single `file` field
pub async fn upload(
    State(state): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthenticatedUser>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadedFile>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;

        let uploaded = state.upload_service.upload(&filename, &content).await?;
        tracing::debug!("Upload by user {}: {}", auth.id(), uploaded.url);
        return Ok((StatusCode::CREATED, Json(uploaded)));
    }

    Err(ApiError::BadRequest("Missing 'file' field".to_string()))
}
