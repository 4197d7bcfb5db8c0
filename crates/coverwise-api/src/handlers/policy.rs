//! Policy extraction and comparison handlers.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use tracing::debug;

use coverwise_core::{ComparisonResult, ExtractedDocument};

use crate::services::UploadedDocument;
use crate::{ApiError, AppState};

/// Multipart field carrying the policy document.
pub const FILE_FIELD: &str = "file";

/// MIME type assumed when the upload does not declare one.
pub const DEFAULT_MIME_TYPE: &str = "application/pdf";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

pub async fn home() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Policy Suggester Backend is Running",
    })
}

/// Extract structured policy facts from an uploaded document.
///
/// # Returns
/// - 200 OK with the normalized document
/// - 400 Bad Request if the `file` field is missing or empty
/// - 500 Internal Server Error if every model failed
pub async fn extract_policy(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractedDocument>, ApiError> {
    let upload = read_upload(&mut multipart).await?;
    let today = chrono::Local::now().date_naive();
    let document = state.extraction.extract(upload, today).await?;
    Ok(Json(document))
}

/// Compare an extracted policy with market alternatives.
///
/// # Returns
/// - 200 OK with the comparison
/// - 429 Too Many Requests if every model failed
pub async fn compare_policy(
    State(state): State<AppState>,
    Json(document): Json<ExtractedDocument>,
) -> Result<Json<ComparisonResult>, ApiError> {
    let today = chrono::Local::now().date_naive();
    let result = state
        .comparison
        .compare(&document, today)
        .await
        .map_err(ApiError::busy_if_exhausted)?;
    Ok(Json(result))
}

async fn read_upload(multipart: &mut Multipart) -> Result<UploadedDocument, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            debug!(field = ?field.name(), "Ignoring multipart field");
            continue;
        }

        let mime_type = field
            .content_type()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
        return Ok(UploadedDocument {
            mime_type,
            data: data.to_vec(),
        });
    }

    Err(ApiError::BadRequest("No file uploaded".to_string()))
}
