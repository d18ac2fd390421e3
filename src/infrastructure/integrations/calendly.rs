use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;

use super::{join_url, read_json};
use crate::domain::error::{AppError, Result};
use crate::domain::scheduling::ScheduledEvent;

const CALENDLY_API_BASE: &str = "https://api.calendly.com";

#[derive(Debug, Clone, PartialEq)]
pub struct EventType {
    pub uri: String,
    pub name: Option<String>,
    pub scheduling_url: Option<String>,
}

#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn event_types(&self) -> Result<Vec<EventType>>;

    /// Upcoming events with their invitee names. Events whose details
    /// cannot be loaded are left out.
    async fn upcoming_events(&self) -> Result<Vec<ScheduledEvent>>;

    async fn upcoming_event_count(&self) -> Result<usize>;
}

pub struct CalendlyClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl CalendlyClient {
    pub fn new(token: String) -> Self {
        Self {
            client: super::http_client(super::DEFAULT_HTTP_TIMEOUT),
            token,
            base_url: CALENDLY_API_BASE.to_string(),
        }
    }

    fn absolute(&self, uri: &str) -> String {
        if uri.starts_with("http") {
            uri.to_string()
        } else {
            join_url(&self.base_url, uri)
        }
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;

        read_json("Calendly", response).await
    }

    async fn user_uri(&self) -> Result<String> {
        let body = self.get(&join_url(&self.base_url, "users/me"), &[]).await?;
        body["resource"]["uri"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AppError::Upstream("Invalid Calendly user data".to_string()))
    }

    async fn scheduled_event_uris(&self) -> Result<Vec<String>> {
        let user = self.user_uri().await?;
        let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let body = self
            .get(
                &join_url(&self.base_url, "scheduled_events"),
                &[("user", user.as_str()), ("min_start_time", now.as_str())],
            )
            .await?;

        Ok(body["collection"]
            .as_array()
            .map(|events| {
                events
                    .iter()
                    .filter_map(|event| event["uri"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn event_details(&self, uri: &str) -> Result<ScheduledEvent> {
        let url = self.absolute(uri);
        let detail = self.get(&url, &[]).await?;

        // Invitees are optional; a failed lookup leaves the list empty.
        let invitees = match self.get(&format!("{}/invitees", url), &[]).await {
            Ok(body) => invitee_names(&body),
            Err(e) => {
                tracing::warn!(event = %uri, error = %e, "Failed to fetch Calendly invitees");
                Vec::new()
            }
        };

        scheduled_event_from(uri, &detail["resource"], invitees)
            .ok_or_else(|| AppError::Upstream(format!("No resource in event detail for {}", uri)))
    }
}

pub(crate) fn invitee_names(body: &Value) -> Vec<String> {
    body["collection"]
        .as_array()
        .map(|invitees| {
            invitees
                .iter()
                .map(|invitee| {
                    invitee["name"]
                        .as_str()
                        .or_else(|| invitee["email"].as_str())
                        .unwrap_or("Unknown")
                        .to_string()
                })
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn scheduled_event_from(uri: &str, resource: &Value, invitees: Vec<String>) -> Option<ScheduledEvent> {
    if !resource.is_object() {
        return None;
    }
    Some(ScheduledEvent {
        id: uri.rsplit('/').next().unwrap_or(uri).to_string(),
        uri: uri.to_string(),
        name: resource["name"]
            .as_str()
            .unwrap_or("Scheduled Event")
            .to_string(),
        start_time: resource["start_time"].as_str().map(str::to_string),
        end_time: resource["end_time"].as_str().map(str::to_string),
        location: resource.get("location").filter(|v| !v.is_null()).cloned(),
        invitee_count: invitees.len(),
        invitees,
        status: resource["status"].as_str().unwrap_or("active").to_string(),
        event_type: resource["event_type"].as_str().map(str::to_string),
    })
}

#[async_trait]
impl Scheduler for CalendlyClient {
    async fn event_types(&self) -> Result<Vec<EventType>> {
        let user = self.user_uri().await?;
        let body = self
            .get(&join_url(&self.base_url, "event_types"), &[("user", user.as_str())])
            .await?;

        Ok(body["collection"]
            .as_array()
            .map(|types| {
                types
                    .iter()
                    .filter_map(|et| {
                        Some(EventType {
                            uri: et["uri"].as_str()?.to_string(),
                            name: et["name"].as_str().map(str::to_string),
                            scheduling_url: et["scheduling_url"]
                                .as_str()
                                .or_else(|| et["booking_url"].as_str())
                                .map(str::to_string),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn upcoming_events(&self) -> Result<Vec<ScheduledEvent>> {
        let uris = self.scheduled_event_uris().await?;
        let results = join_all(uris.iter().map(|uri| self.event_details(uri))).await;

        Ok(results
            .into_iter()
            .filter_map(|result| match result {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!(error = %e, "Dropping Calendly event");
                    None
                }
            })
            .collect())
    }

    async fn upcoming_event_count(&self) -> Result<usize> {
        Ok(self.scheduled_event_uris().await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invitees_fall_back_to_email_then_unknown() {
        let body = json!({"collection": [
            {"name": "Dana", "email": "dana@example.com"},
            {"email": "lee@example.com"},
            {}
        ]});
        assert_eq!(invitee_names(&body), vec!["Dana", "lee@example.com", "Unknown"]);
    }

    #[test]
    fn event_id_is_last_uri_segment() {
        let resource = json!({"start_time": "2026-10-21T14:00:00Z", "status": "active"});
        let event = scheduled_event_from(
            "https://api.calendly.com/scheduled_events/ABC123",
            &resource,
            vec!["Dana".to_string()],
        )
        .unwrap();
        assert_eq!(event.id, "ABC123");
        assert_eq!(event.name, "Scheduled Event");
        assert_eq!(event.invitee_count, 1);
        assert!(event.location.is_none());
    }

    #[test]
    fn missing_resource_is_dropped() {
        assert!(scheduled_event_from("x", &Value::Null, Vec::new()).is_none());
    }
}
