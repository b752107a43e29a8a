//! Submission identifiers and the HTTP response envelope.

use serde::{Deserialize, Serialize};

use crate::validate::FieldError;

/// Response body for the submission endpoint, success or failure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl SubmissionResponse {
    pub fn accepted(submission_id: String) -> Self {
        Self {
            success: true,
            submission_id: Some(submission_id),
            message: "Registration submitted successfully. You will receive a confirmation \
                      email shortly."
                .to_string(),
            errors: None,
        }
    }

    pub fn invalid(errors: &[FieldError]) -> Self {
        Self {
            success: false,
            submission_id: None,
            message: "Invalid form data".to_string(),
            errors: Some(errors.iter().map(|e| e.to_string()).collect()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            submission_id: None,
            message: message.into(),
            errors: None,
        }
    }
}

/// Generate a submission id: `SUB_<unix-millis>_<random>`.
pub fn new_submission_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let random = uuid::Uuid::new_v4().simple();
    format!("SUB_{millis}_{random}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_ids_are_prefixed_and_unique() {
        let a = new_submission_id();
        let b = new_submission_id();
        assert!(a.starts_with("SUB_"));
        assert_ne!(a, b);
    }

    #[test]
    fn invalid_response_flattens_field_paths() {
        let errors = vec![FieldError::new("patient.firstName", "First name is required")];
        let response = SubmissionResponse::invalid(&errors);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["errors"][0], "patient.firstName: First name is required");
        assert!(json.get("submissionId").is_none());
    }
}
