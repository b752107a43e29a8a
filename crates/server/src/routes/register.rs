//! Registration submission handler

use axum::{
    Json,
    extract::{FromRequest, Multipart, Request, State},
    http::header,
    response::IntoResponse,
};
use serde_json::Value as JsonValue;

use intake_core::{RegistrationForm, SubmissionResponse, mask, new_submission_id, validate_form};

use crate::AppState;
use crate::error::AppError;
use crate::pdf::{self, CardImage, CardImages};

const ALLOWED_IMAGE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// POST /api/submit-registration
///
/// Accepts the aggregate payload either as `application/json` or as
/// `multipart/form-data` with a `payload` JSON part plus optional card-image
/// parts. Validates, renders the PDF transcript, emails it to the practice
/// inbox, and answers with the submission id.
pub async fn submit(
    State(state): State<AppState>,
    request: Request,
) -> Result<impl IntoResponse, AppError> {
    let (mut form, images) = parse_submission(&state, request).await?;

    validate_form(&form).map_err(AppError::Validation)?;

    form.submission_id = Some(new_submission_id());
    form.submission_timestamp = Some(chrono::Utc::now().to_rfc3339());
    let submission_id = form.submission_id.clone().unwrap_or_default();

    tracing::info!(
        target: "audit",
        submission_id = %submission_id,
        patient = %form.patient_name(),
        guardian_email = %mask::mask_email(&form.parent_guardian1.email),
        policy = %mask::mask_policy_number(&form.primary_insurance.policy_number),
        card_images = !images.is_empty(),
        "Registration received"
    );

    // PDF rendering is pure CPU work; keep it off the async workers.
    let pdf_form = form.clone();
    let pdf = tokio::task::spawn_blocking(move || pdf::render_transcript(&pdf_form, &images))
        .await
        .map_err(|e| AppError::Internal(format!("PDF task failed: {e}")))?
        .map_err(|e| AppError::PdfGeneration(e.to_string()))?;

    let mailer = state
        .mailer
        .as_ref()
        .ok_or(AppError::EmailDelivery("email service not configured".into()))?;
    let message =
        crate::email::EmailMessage::registration(&form, &state.config.practice_email, pdf);
    mailer
        .send(message)
        .await
        .map_err(|e| AppError::EmailDelivery(e.to_string()))?;

    tracing::info!(submission_id = %submission_id, "Registration delivered to practice inbox");

    Ok(Json(SubmissionResponse::accepted(submission_id)))
}

/// Pull the form (and any card images) out of the request body
async fn parse_submission(
    state: &AppState,
    request: Request,
) -> Result<(RegistrationForm, CardImages), AppError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| AppError::Malformed(format!("Invalid multipart body: {e}")))?;
        parse_multipart(state, multipart).await
    } else {
        let bytes = axum::body::to_bytes(request.into_body(), state.config.body_limit())
            .await
            .map_err(|e| AppError::Malformed(format!("Failed to read body: {e}")))?;
        let form = parse_payload(&bytes)?;
        Ok((form, CardImages::default()))
    }
}

async fn parse_multipart(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<(RegistrationForm, CardImages), AppError> {
    let mut form: Option<RegistrationForm> = None;
    let mut images = CardImages::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Malformed(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "payload" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Malformed(format!("Failed to read payload: {e}")))?;
                form = Some(parse_payload(&bytes)?);
            }
            "primaryCardFront" | "primaryCardBack" | "secondaryCardFront"
            | "secondaryCardBack" => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Malformed(format!("Failed to read {name}: {e}")))?;
                let image = check_card_image(state, &name, content_type, bytes.to_vec())?;
                match name.as_str() {
                    "primaryCardFront" => images.primary_front = Some(image),
                    "primaryCardBack" => images.primary_back = Some(image),
                    "secondaryCardFront" => images.secondary_front = Some(image),
                    _ => images.secondary_back = Some(image),
                }
            }
            other => {
                tracing::debug!(field = other, "Ignoring unexpected multipart field");
            }
        }
    }

    let form = form.ok_or_else(|| {
        AppError::Malformed("Missing `payload` part in multipart body".to_string())
    })?;
    Ok((form, images))
}

fn parse_payload(bytes: &[u8]) -> Result<RegistrationForm, AppError> {
    // Go through Value first so serde reports key-level problems with the
    // original camelCase names.
    let value: JsonValue = serde_json::from_slice(bytes)
        .map_err(|e| AppError::Malformed(format!("Body is not valid JSON: {e}")))?;
    serde_json::from_value(value).map_err(|e| AppError::Malformed(e.to_string()))
}

fn check_card_image(
    state: &AppState,
    name: &str,
    content_type: String,
    bytes: Vec<u8>,
) -> Result<CardImage, AppError> {
    if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
        return Err(AppError::Validation(vec![intake_core::FieldError::new(
            name,
            "Only JPEG, PNG, GIF, and WebP images are allowed",
        )]));
    }
    if bytes.len() > state.config.max_upload_bytes {
        return Err(AppError::Validation(vec![intake_core::FieldError::new(
            name,
            format!(
                "File size must be less than {} MB",
                state.config.max_upload_bytes / (1024 * 1024)
            ),
        )]));
    }
    Ok(CardImage {
        content_type,
        bytes,
    })
}
