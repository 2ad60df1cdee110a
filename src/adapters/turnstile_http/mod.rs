// Turnstile adapter - CAPTCHA token verification over HTTP

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::errors::*;
use crate::ports::*;

/// Default verification endpoint
pub const DEFAULT_VERIFY_URL: &str = "https://challenges.cloudflare.com/api/v1/siteverify";

#[derive(Serialize)]
struct VerifyRequest<'a> {
    secret: &'a str,
    response: &'a str,
}

/// Posts `{secret, response}` and reads `{success, error-codes}`
pub struct TurnstileAdapter {
    client: reqwest::Client,
    endpoint: String,
    secret: String,
}

impl TurnstileAdapter {
    pub fn new(endpoint: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl HumanVerificationPort for TurnstileAdapter {
    async fn verify(&self, token: &str) -> Result<VerificationOutcome, DomainError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&VerifyRequest {
                secret: &self.secret,
                response: token,
            })
            .send()
            .await
            .map_err(|e| DomainError::Verification(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DomainError::Verification(format!(
                "Endpoint answered with status: {}",
                response.status()
            )));
        }

        let outcome: VerificationOutcome = response
            .json()
            .await
            .map_err(|e| DomainError::Verification(format!("Malformed response: {}", e)))?;
        if !outcome.success {
            tracing::warn!(codes = ?outcome.error_codes, "human verification rejected");
        }
        Ok(outcome)
    }
}
