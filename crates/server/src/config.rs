//! Server configuration

/// Upper bound for a single uploaded card image (5 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    /// Practice inbox that receives every registration transcript
    pub practice_email: String,
    /// From address for outbound mail
    pub email_from: String,
    /// Resend API key; mail delivery is disabled without it
    pub resend_api_key: Option<String>,
    /// Anthropic API key; card extraction is disabled without it
    pub anthropic_api_key: Option<String>,
    pub cors_origins: Vec<String>,
    pub rate_limit_rps: u32,
    /// Per-file limit for uploaded card images
    pub max_upload_bytes: usize,
}

impl Config {
    /// Total request body limit: four card images plus the JSON payload
    pub fn body_limit(&self) -> usize {
        self.max_upload_bytes * 4 + 1024 * 1024
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            practice_email: std::env::var("PRACTICE_EMAIL")
                .unwrap_or_else(|_| "Admin@1to1Pediatrics.com".into()),
            email_from: std::env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "registration@1to1pediatrics.com".into()),
            resend_api_key: std::env::var("RESEND_API_KEY").ok(),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        }
    }
}
