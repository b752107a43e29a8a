//! Application error handling

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use intake_core::{FieldError, SubmissionResponse};

/// Message returned whenever the failure is not the caller's fault
pub const GENERIC_RETRY_MESSAGE: &str =
    "An unexpected error occurred. Please try again or contact our office at (925) 362-1861.";

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Malformed body or failed field validation
    Validation(Vec<FieldError>),
    /// Body was not parseable as a registration payload
    Malformed(String),
    /// PDF transcript could not be rendered
    PdfGeneration(String),
    /// Transactional email provider rejected or failed the send
    EmailDelivery(String),
    /// Feature is not configured on this deployment
    NotConfigured(&'static str),
    /// Anything else
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, SubmissionResponse::invalid(&errors))
            }
            AppError::Malformed(detail) => (
                StatusCode::BAD_REQUEST,
                SubmissionResponse {
                    success: false,
                    submission_id: None,
                    message: "Invalid form data".to_string(),
                    errors: Some(vec![detail]),
                },
            ),
            AppError::PdfGeneration(detail) => {
                tracing::error!(error = %detail, "PDF generation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    SubmissionResponse::failure("Failed to generate PDF document"),
                )
            }
            AppError::EmailDelivery(detail) => {
                tracing::error!(error = %detail, "Email delivery failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    SubmissionResponse::failure(
                        "Failed to send registration to practice. Please try again or \
                         contact the office directly.",
                    ),
                )
            }
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "Unexpected failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    SubmissionResponse::failure(GENERIC_RETRY_MESSAGE),
                )
            }
            AppError::NotConfigured(feature) => {
                tracing::warn!(feature, "Request for unconfigured feature");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    SubmissionResponse::failure(format!("{feature} is not configured")),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
