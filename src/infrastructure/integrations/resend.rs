use async_trait::async_trait;
use serde::Serialize;

use super::join_url;
use crate::domain::error::{AppError, Result};

const RESEND_API_BASE: &str = "https://api.resend.com";
pub const DEFAULT_SENDER: &str = "onboarding@resend.dev";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Sends the message and returns the provider's message id.
    async fn send(&self, email: &OutgoingEmail) -> Result<String>;
}

pub struct ResendClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl ResendClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: super::http_client(super::DEFAULT_HTTP_TIMEOUT),
            api_key,
            base_url: RESEND_API_BASE.to_string(),
        }
    }
}

#[async_trait]
impl EmailSender for ResendClient {
    async fn send(&self, email: &OutgoingEmail) -> Result<String> {
        let response = self
            .client
            .post(join_url(&self.base_url, "emails"))
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        let body: serde_json::Value = response.json().await.unwrap_or_default();
        if !status.is_success() {
            tracing::error!(%status, details = %body, "Resend API error");
            return Err(AppError::Upstream(format!("Failed to send email ({}): {}", status, body)));
        }

        Ok(body["id"].as_str().unwrap_or_default().to_string())
    }
}
