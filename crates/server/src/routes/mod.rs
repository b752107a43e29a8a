pub mod extract;
pub mod health;
pub mod metrics;
pub mod register;

use axum::{Router, routing::post};

use crate::AppState;

/// Build the registration API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/submit-registration", post(register::submit))
        .route("/api/extract-insurance-card", post(extract::card))
}
