//! Insurance card extraction handler

use axum::{Json, extract::{Multipart, State}, response::IntoResponse};
use serde::Serialize;

use crate::AppState;
use crate::ai::card_extract::CardFields;
use crate::error::AppError;

const ALLOWED_IMAGE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<CardFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// POST /api/extract-insurance-card
///
/// Takes a single `card` image part and asks the vision model to read the
/// visible policy fields off it. Extraction failures answer 200 with
/// `success: false` so the client can fall back to manual entry.
pub async fn card(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let extractor = state
        .extractor
        .as_ref()
        .ok_or(AppError::NotConfigured("card extraction"))?;

    let mut card: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Malformed(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some("card") {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Malformed(format!("Failed to read card image: {e}")))?;
            card = Some((content_type, bytes.to_vec()));
        }
    }

    let (content_type, bytes) =
        card.ok_or_else(|| AppError::Malformed("Missing `card` part".to_string()))?;
    if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
        return Err(AppError::Malformed(
            "Only JPEG, PNG, GIF, and WebP images are allowed".to_string(),
        ));
    }
    if bytes.len() > state.config.max_upload_bytes {
        return Err(AppError::Malformed(format!(
            "File size must be less than {} MB",
            state.config.max_upload_bytes / (1024 * 1024)
        )));
    }

    match extractor.extract(&content_type, &bytes).await {
        Ok(fields) => Ok(Json(ExtractResponse {
            success: true,
            fields: Some(fields),
            error: None,
        })),
        Err(e) => {
            tracing::warn!(error = %e, "Card extraction failed");
            Ok(Json(ExtractResponse {
                success: false,
                fields: None,
                error: Some("Could not read the card image".to_string()),
            }))
        }
    }
}
