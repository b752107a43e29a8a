//! Transactional email dispatch.
//!
//! The practice inbox receives one email per submission with the PDF
//! transcript attached. Delivery goes through the Resend HTTP API; the
//! `Mailer` trait is the seam the integration tests use to record sends
//! without touching the network.

mod template;

use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use intake_core::RegistrationForm;

pub use template::{build_html_body, build_text_body};

const RESEND_API_URL: &str = "https://api.resend.com/emails";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("email request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("email provider rejected the message ({status}): {detail}")]
    Rejected { status: u16, detail: String },
}

/// A fully rendered registration email
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
    pub attachment_name: String,
    pub attachment: Vec<u8>,
}

impl EmailMessage {
    /// Build the registration email for a validated, id-stamped form
    pub fn registration(form: &RegistrationForm, to: &str, pdf: Vec<u8>) -> Self {
        let submission_id = form.submission_id.as_deref().unwrap_or("N/A");
        Self {
            to: to.to_string(),
            subject: format!("New Patient Registration - {}", form.patient_name()),
            html: build_html_body(form, submission_id),
            text: build_text_body(form, submission_id),
            attachment_name: format!("patient-registration-{submission_id}.pdf"),
            attachment: pdf,
        }
    }
}

/// Outbound mail seam
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver the message, returning the provider's message id
    async fn send(&self, message: EmailMessage) -> Result<String, MailError>;
}

/// Request body for the Resend send-email endpoint
#[derive(Serialize)]
struct ResendRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    html: String,
    text: String,
    attachments: Vec<ResendAttachment>,
}

#[derive(Serialize)]
struct ResendAttachment {
    filename: String,
    /// Base64-encoded file content
    content: String,
}

#[derive(Deserialize)]
struct ResendResponse {
    id: String,
}

/// Mailer backed by the Resend transactional API
pub struct ResendMailer {
    http: reqwest::Client,
    api_key: String,
    from: String,
}

impl ResendMailer {
    pub fn new(api_key: String, from: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: EmailMessage) -> Result<String, MailError> {
        let request = ResendRequest {
            from: self.from.clone(),
            to: vec![message.to],
            subject: message.subject,
            html: message.html,
            text: message.text,
            attachments: vec![ResendAttachment {
                filename: message.attachment_name,
                content: base64::engine::general_purpose::STANDARD.encode(&message.attachment),
            }],
        };

        let response = self
            .http
            .post(RESEND_API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected { status, detail });
        }

        let body: ResendResponse = response.json().await?;
        tracing::info!(message_id = %body.id, "Email sent");
        Ok(body.id)
    }
}
