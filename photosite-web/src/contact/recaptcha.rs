//! reCAPTCHA v3 token verification
//!
//! Posts the site secret and the client token to the siteverify endpoint and
//! returns the score. Any transport problem, non-200 status or `success:
//! false` answer is an error; the caller treats every error as a failed
//! verification.

use async_trait::async_trait;
use photosite_common::config::RecaptchaSettings;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const VERIFY_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Verification service returned HTTP {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Token rejected: {0:?}")]
    Rejected(Vec<String>),
}

/// Bot-mitigation token check
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify a token and return its human-likelihood score (0.0 - 1.0)
    async fn verify(&self, token: &str) -> Result<f64, VerifyError>;
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Google reCAPTCHA siteverify client
pub struct RecaptchaClient {
    http_client: reqwest::Client,
    secret: String,
    verify_url: String,
}

impl RecaptchaClient {
    pub fn new(settings: &RecaptchaSettings) -> Result<Self, VerifyError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(VERIFY_TIMEOUT_SECS))
            .build()
            .map_err(|e| VerifyError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            secret: settings.secret.clone(),
            verify_url: settings.verify_url.clone(),
        })
    }
}

#[async_trait]
impl TokenVerifier for RecaptchaClient {
    async fn verify(&self, token: &str) -> Result<f64, VerifyError> {
        let params = [("secret", self.secret.as_str()), ("response", token)];

        let response = self
            .http_client
            .post(&self.verify_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| VerifyError::Network(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(VerifyError::Status(status.as_u16()));
        }

        let body: SiteVerifyResponse = response
            .json()
            .await
            .map_err(|e| VerifyError::Parse(e.to_string()))?;

        if !body.success {
            return Err(VerifyError::Rejected(body.error_codes));
        }

        let score = body.score.unwrap_or(0.0);
        tracing::debug!(score, "reCAPTCHA verification succeeded");
        Ok(score)
    }
}
