//! Health check endpoint

use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    email_configured: bool,
    extraction_configured: bool,
}

/// GET /health - Report service status and which integrations are live
pub async fn check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        email_configured: state.mailer.is_some(),
        extraction_configured: state.extractor.is_some(),
    })
}
