//! Insurance card field extraction.
//!
//! Sends a photographed insurance card to a vision-capable Claude model and
//! parses the returned JSON into the form's insurance fields. When the
//! primary model call fails, the hardcoded fallback model is tried exactly
//! once; any failure after that degrades to manual entry on the client.

use std::sync::LazyLock;

use base64::Engine as _;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::client::{ClaudeClient, ImageSource};

/// Primary vision model
pub const PRIMARY_MODEL: &str = "claude-sonnet-4-5-20250929";
/// Fallback model, tried once when the primary call errors
pub const FALLBACK_MODEL: &str = "claude-haiku-4-5-20251001";

const SYSTEM_PROMPT: &str = r#"You are an insurance card reader for a pediatric practice's registration form. You are shown a photo of a health insurance card.

Return ONLY a JSON object with these keys:
- "companyName": string (insurance company name)
- "policyNumber": string (member/policy ID)
- "groupNumber": string (group number)
- "subscriberName": string (subscriber/member name)
- "subscriberDateOfBirth": string (MM-DD-YYYY)

Use null for anything not visible on the card. Do not guess. Return ONLY the JSON object, no other text."#;

const INSTRUCTION: &str = "Extract the insurance fields from this card photo.";

// Models wrap the object in prose or markdown fences; grab the outermost braces.
static JSON_OBJECT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// Insurance fields recovered from a card photo. Every field is optional;
/// blank and `null` values are dropped before the response is built.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CardFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber_date_of_birth: Option<String>,
}

impl CardFields {
    /// Drop blank strings so the client only patches fields the model filled
    fn pruned(mut self) -> Self {
        for field in [
            &mut self.company_name,
            &mut self.policy_number,
            &mut self.group_number,
            &mut self.subscriber_name,
            &mut self.subscriber_date_of_birth,
        ] {
            if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *field = None;
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.company_name.is_none()
            && self.policy_number.is_none()
            && self.group_number.is_none()
            && self.subscriber_name.is_none()
            && self.subscriber_date_of_birth.is_none()
    }
}

/// Card extraction backed by the Claude vision models
#[derive(Clone)]
pub struct CardExtractor {
    client: ClaudeClient,
}

impl CardExtractor {
    pub fn new(api_key: String) -> Self {
        Self {
            client: ClaudeClient::new(api_key),
        }
    }

    /// Extract insurance fields from a card image. Tries the primary model,
    /// then the fallback model once.
    pub async fn extract(&self, media_type: &str, image: &[u8]) -> Result<CardFields, String> {
        let data = base64::engine::general_purpose::STANDARD.encode(image);

        let text = match self.call_model(PRIMARY_MODEL, media_type, &data).await {
            Ok(text) => text,
            Err(primary_err) => {
                tracing::warn!(
                    model = PRIMARY_MODEL,
                    error = %primary_err,
                    "Primary extraction model failed, trying fallback"
                );
                self.call_model(FALLBACK_MODEL, media_type, &data).await?
            }
        };

        parse_card_fields(&text)
    }

    async fn call_model(
        &self,
        model: &str,
        media_type: &str,
        base64_data: &str,
    ) -> Result<String, String> {
        self.client
            .message_with_image(
                model,
                Some(SYSTEM_PROMPT),
                INSTRUCTION,
                ImageSource::base64(media_type, base64_data),
            )
            .await
    }
}

/// Pull the JSON object out of the model's text response and deserialize it
fn parse_card_fields(text: &str) -> Result<CardFields, String> {
    let json = JSON_OBJECT_RE
        .find(text)
        .ok_or_else(|| format!("No JSON object in response: {text}"))?;

    let fields: CardFields = serde_json::from_str(json.as_str())
        .map_err(|e| format!("Failed to parse card fields: {e}"))?;

    Ok(fields.pruned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_bare_json_object() {
        let fields = parse_card_fields(
            r#"{"companyName": "Aetna", "policyNumber": "W123456789", "groupNumber": null,
                "subscriberName": "Dana Morgan", "subscriberDateOfBirth": "09-14-1988"}"#,
        )
        .unwrap();
        assert_eq!(fields.company_name.as_deref(), Some("Aetna"));
        assert_eq!(fields.group_number, None);
    }

    #[test]
    fn parses_json_wrapped_in_markdown_and_prose() {
        let text = "Here are the fields I can read:\n```json\n{\"companyName\": \"Cigna\"}\n```";
        let fields = parse_card_fields(text).unwrap();
        assert_eq!(fields.company_name.as_deref(), Some("Cigna"));
    }

    #[test]
    fn blank_values_are_dropped() {
        let fields = parse_card_fields(r#"{"companyName": "  ", "policyNumber": "P1"}"#).unwrap();
        assert_eq!(fields.company_name, None);
        assert_eq!(fields.policy_number.as_deref(), Some("P1"));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let fields =
            parse_card_fields(r#"{"companyName": "Kaiser", "planType": "HMO"}"#).unwrap();
        assert_eq!(fields.company_name.as_deref(), Some("Kaiser"));
    }

    #[test]
    fn rejects_responses_without_json() {
        assert!(parse_card_fields("I cannot read this card.").is_err());
    }
}
