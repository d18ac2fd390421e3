use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};

/// Payload for the "lead did not answer" automation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NoAnswerEvent {
    pub lead_id: String,
    pub phone: String,
    pub cold_caller_id: Option<String>,
    pub list_id: Option<String>,
}

/// Payload for the "meeting booked" automation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MeetingBookedEvent {
    pub lead_id: String,
    pub meeting_time: String,
    pub closer_id: Option<String>,
    pub cold_caller_id: Option<String>,
}

#[async_trait]
pub trait WorkflowNotifier: Send + Sync {
    async fn no_answer(&self, event: &NoAnswerEvent) -> Result<()>;
    async fn meeting_booked(&self, event: &MeetingBookedEvent) -> Result<()>;
}

/// Posts events to n8n webhook URLs.
pub struct N8nNotifier {
    client: reqwest::Client,
    no_answer_url: Option<String>,
    meeting_booked_url: Option<String>,
}

impl N8nNotifier {
    pub fn new(no_answer_url: Option<String>, meeting_booked_url: Option<String>) -> Self {
        Self {
            client: super::http_client(super::DEFAULT_HTTP_TIMEOUT),
            no_answer_url,
            meeting_booked_url,
        }
    }

    async fn post<T: Serialize + Sync>(&self, url: &str, event: &T) -> Result<()> {
        let response = self.client.post(url).json(event).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::error!(%status, body = %text, "n8n webhook failed");
            return Err(AppError::Upstream("Failed to trigger n8n workflow".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl WorkflowNotifier for N8nNotifier {
    async fn no_answer(&self, event: &NoAnswerEvent) -> Result<()> {
        let url = self.no_answer_url.as_deref().ok_or_else(|| {
            AppError::NotConfigured("N8N_NO_ANSWER_WEBHOOK_URL not configured".to_string())
        })?;
        self.post(url, event).await
    }

    async fn meeting_booked(&self, event: &MeetingBookedEvent) -> Result<()> {
        let url = self.meeting_booked_url.as_deref().ok_or_else(|| {
            AppError::NotConfigured("N8N_MEETING_BOOKED_WEBHOOK_URL not configured".to_string())
        })?;
        self.post(url, event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_camel_case_with_nulls() {
        let event = NoAnswerEvent {
            lead_id: "l1".to_string(),
            phone: "555".to_string(),
            cold_caller_id: None,
            list_id: Some("list-1".to_string()),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["leadId"], "l1");
        assert!(json["coldCallerId"].is_null());
        assert_eq!(json["listId"], "list-1");
    }

    #[tokio::test]
    async fn missing_url_is_not_configured() {
        let notifier = N8nNotifier::new(None, None);
        let err = notifier
            .meeting_booked(&MeetingBookedEvent {
                lead_id: "l1".to_string(),
                meeting_time: "2026-10-21T14:00:00".to_string(),
                closer_id: None,
                cold_caller_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotConfigured(_)));
    }
}
