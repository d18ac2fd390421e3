use crate::domain::error::{AppError, Result};
use crate::infrastructure::integrations::resend::{EmailSender, OutgoingEmail, DEFAULT_SENDER};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// `to` may be a single address or a list.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    pub fn into_vec(self) -> Vec<String> {
        let list = match self {
            Recipients::One(address) => vec![address],
            Recipients::Many(addresses) => addresses,
        };
        list.into_iter()
            .map(|address| address.trim().to_string())
            .filter(|address| !address.is_empty())
            .collect()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailRequest {
    pub to: Option<Recipients>,
    pub from: Option<String>,
    pub subject: Option<String>,
    pub html: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EmailReceipt {
    pub success: bool,
    pub id: String,
}

pub struct EmailUseCase {
    sender: Option<Arc<dyn EmailSender>>,
    default_from: Option<String>,
}

impl EmailUseCase {
    pub fn new(sender: Option<Arc<dyn EmailSender>>, default_from: Option<String>) -> Self {
        Self {
            sender,
            default_from,
        }
    }

    pub fn compose(&self, request: EmailRequest) -> Result<OutgoingEmail> {
        let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let to = request.to.map(Recipients::into_vec).unwrap_or_default();
        let subject = non_blank(request.subject);
        let (Some(subject), false) = (subject, to.is_empty()) else {
            return Err(AppError::ValidationError(
                "Missing required fields: to, subject".to_string(),
            ));
        };

        let html = non_blank(request.html);
        let text = non_blank(request.text);
        if html.is_none() && text.is_none() {
            return Err(AppError::ValidationError(
                "Either html or text content is required".to_string(),
            ));
        }

        let from = non_blank(request.from)
            .or_else(|| non_blank(self.default_from.clone()))
            .unwrap_or_else(|| DEFAULT_SENDER.to_string());

        Ok(OutgoingEmail {
            from,
            to,
            subject,
            html,
            text,
        })
    }

    pub async fn send(&self, request: EmailRequest) -> Result<EmailReceipt> {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| AppError::NotConfigured("RESEND_API_KEY not configured".to_string()))?;
        let email = self.compose(request)?;

        let id = sender.send(&email).await?;
        tracing::info!(%id, recipients = email.to.len(), "Email sent");
        Ok(EmailReceipt { success: true, id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Outbox {
        sent: Mutex<Vec<OutgoingEmail>>,
    }

    #[async_trait]
    impl EmailSender for Outbox {
        async fn send(&self, email: &OutgoingEmail) -> Result<String> {
            self.sent.lock().unwrap().push(email.clone());
            Ok("msg_1".to_string())
        }
    }

    fn request(value: serde_json::Value) -> EmailRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn single_recipient_becomes_list() {
        let use_case = EmailUseCase::new(None, Some("team@agency.test".to_string()));
        let email = use_case
            .compose(request(json!({"to": "a@b.test", "subject": "Hi", "text": "Hello"})))
            .unwrap();
        assert_eq!(email.to, vec!["a@b.test"]);
        assert_eq!(email.from, "team@agency.test");
    }

    #[test]
    fn body_is_required() {
        let use_case = EmailUseCase::new(None, None);
        let err = use_case
            .compose(request(json!({"to": ["a@b.test"], "subject": "Hi"})))
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let err = use_case
            .compose(request(json!({"to": [], "subject": "Hi", "html": "<p>x</p>"})))
            .unwrap_err();
        assert_eq!(err.message(), "Missing required fields: to, subject");
    }

    #[tokio::test]
    async fn sends_with_default_sender() {
        let outbox = Arc::new(Outbox::default());
        let use_case = EmailUseCase::new(Some(outbox.clone() as Arc<dyn EmailSender>), None);
        let receipt = use_case
            .send(request(json!({"to": ["a@b.test", "c@d.test"], "subject": "Report", "html": "<b>ok</b>"})))
            .await
            .unwrap();

        assert_eq!(receipt.id, "msg_1");
        let sent = outbox.sent.lock().unwrap();
        assert_eq!(sent[0].from, DEFAULT_SENDER);
        assert_eq!(sent[0].to.len(), 2);
    }
}
