use crate::domain::ads::{FacebookLeadAd, NewFacebookLeadAd};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::{non_empty, require};
use crate::infrastructure::db::CrmRepository;
use crate::infrastructure::integrations::meta_graph::AdsPlatform;
use crate::infrastructure::integrations::workflows::{
    MeetingBookedEvent, NoAnswerEvent, WorkflowNotifier,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

const NAME_FIELDS: [&str; 3] = ["full_name", "first_name", "name"];
const PHONE_FIELDS: [&str; 2] = ["phone_number", "phone"];
const FORM_STANDARD_FIELDS: [&str; 6] = ["full_name", "first_name", "name", "email", "phone_number", "phone"];
const RELAY_STANDARD_FIELDS: [&str; 10] = [
    "id", "leadgen_id", "page_id", "ad_id", "form_id", "full_name", "name", "email", "phone_number", "phone",
];

#[derive(Debug, Deserialize, Default)]
pub struct LeadgenNotification {
    #[serde(default)]
    pub entry: Vec<LeadgenEntry>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LeadgenEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub changes: Vec<LeadgenChange>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LeadgenChange {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub value: LeadgenValue,
}

#[derive(Debug, Deserialize, Default)]
pub struct LeadgenValue {
    pub leadgen_id: Option<String>,
    pub ad_id: Option<String>,
    pub form_id: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct LeadgenError {
    pub leadgen_id: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct LeadgenReport {
    pub success: bool,
    pub processed: usize,
    pub errors: usize,
    pub details: Vec<LeadgenError>,
}

#[derive(Debug, Serialize)]
pub struct RelayReceipt {
    pub success: bool,
    pub message: String,
    pub lead_id: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct NoAnswerRequest {
    #[serde(alias = "leadId")]
    pub lead_id: Option<String>,
    pub phone: Option<String>,
    #[serde(alias = "coldCallerId")]
    pub cold_caller_id: Option<String>,
    #[serde(alias = "listId")]
    pub list_id: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct MeetingBookedRequest {
    #[serde(alias = "leadId")]
    pub lead_id: Option<String>,
    #[serde(alias = "meetingTime")]
    pub meeting_time: Option<String>,
    #[serde(alias = "closerId")]
    pub closer_id: Option<String>,
    #[serde(alias = "coldCallerId")]
    pub cold_caller_id: Option<String>,
}

/// Lead-form `field_data` flattened to `name -> first value`.
pub fn flatten_field_data(lead: &Value) -> Map<String, Value> {
    let mut fields = Map::new();
    for field in lead["field_data"].as_array().into_iter().flatten() {
        let Some(name) = field["name"].as_str() else {
            continue;
        };
        let value = field["values"][0].as_str().unwrap_or_default();
        fields.insert(name.to_string(), Value::String(value.to_string()));
    }
    fields
}

/// First non-empty string among `keys`. Numbers are accepted as ids.
fn first_present(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match fields.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// String fields outside `standard`. `None` when nothing is left.
fn custom_fields(fields: &Map<String, Value>, standard: &[&str]) -> Option<Map<String, Value>> {
    let custom: Map<String, Value> = fields
        .iter()
        .filter(|(key, value)| !standard.contains(&key.as_str()) && value.is_string())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    (!custom.is_empty()).then_some(custom)
}

/// Maps a relay (Zapier) payload. Without an id one is made from the clock.
pub fn map_relay_lead(body: &Map<String, Value>, now_millis: i64) -> NewFacebookLeadAd {
    NewFacebookLeadAd {
        leadgen_id: first_present(body, &["id", "leadgen_id"])
            .unwrap_or_else(|| format!("zapier_{}", now_millis)),
        page_id: first_present(body, &["page_id"]),
        ad_id: first_present(body, &["ad_id"]),
        form_id: first_present(body, &["form_id"]),
        name: first_present(body, &["full_name", "name"]),
        email: first_present(body, &["email"]),
        phone: first_present(body, &PHONE_FIELDS),
        custom_fields: custom_fields(body, &RELAY_STANDARD_FIELDS),
        raw_data: Value::Object(body.clone()),
    }
}

/// Inbound lead sources (ad-platform lead forms and relays) and the outbound
/// workflow automation hooks.
pub struct LeadWebhooksUseCase {
    repository: Arc<CrmRepository>,
    platform: Arc<dyn AdsPlatform>,
    notifier: Arc<dyn WorkflowNotifier>,
    verify_token: Option<String>,
    graph_token: Option<String>,
}

impl LeadWebhooksUseCase {
    pub fn new(
        repository: Arc<CrmRepository>,
        platform: Arc<dyn AdsPlatform>,
        notifier: Arc<dyn WorkflowNotifier>,
        verify_token: Option<String>,
        graph_token: Option<String>,
    ) -> Self {
        Self {
            repository,
            platform,
            notifier,
            verify_token,
            graph_token,
        }
    }

    /// Subscription handshake. Returns the challenge to echo back.
    pub fn verify_subscription(
        &self,
        mode: Option<&str>,
        token: Option<&str>,
        challenge: Option<&str>,
    ) -> Result<String> {
        let expected = non_empty(&self.verify_token);
        let verified = mode == Some("subscribe") && expected.is_some() && token == expected.as_deref();
        if !verified {
            tracing::warn!(mode = ?mode, "Webhook verification failed");
            return Err(AppError::Forbidden("Verification failed".to_string()));
        }
        tracing::info!("Webhook verified");
        Ok(challenge.unwrap_or_default().to_string())
    }

    /// Processes every `leadgen` change. Failures are counted per lead and
    /// never fail the whole delivery.
    pub async fn receive_leadgen(&self, payload: Value) -> LeadgenReport {
        let notification: LeadgenNotification = serde_json::from_value(payload).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Unreadable leadgen payload");
            LeadgenNotification::default()
        });
        let token = require(&self.graph_token, "FACEBOOK_GRAPH_ACCESS_TOKEN");

        let mut processed = 0;
        let mut details = Vec::new();
        for entry in &notification.entry {
            for change in entry.changes.iter().filter(|c| c.field == "leadgen") {
                let Some(leadgen_id) = change.value.leadgen_id.clone() else {
                    continue;
                };
                let outcome = match &token {
                    Ok(token) => self.store_leadgen(token, entry.id.clone(), &leadgen_id, &change.value).await,
                    Err(e) => Err(AppError::NotConfigured(e.message().to_string())),
                };
                match outcome {
                    Ok(_) => processed += 1,
                    Err(e) => {
                        tracing::error!(%leadgen_id, error = %e, "Lead-form submission not stored");
                        details.push(LeadgenError {
                            leadgen_id,
                            error: e.message().to_string(),
                        });
                    }
                }
            }
        }

        tracing::info!(processed, errors = details.len(), "Leadgen webhook processed");
        LeadgenReport {
            success: details.is_empty(),
            processed,
            errors: details.len(),
            details,
        }
    }

    async fn store_leadgen(
        &self,
        token: &str,
        page_id: Option<String>,
        leadgen_id: &str,
        value: &LeadgenValue,
    ) -> Result<FacebookLeadAd> {
        let lead = self.platform.lead_details(token, leadgen_id).await?;
        let fields = flatten_field_data(&lead);

        self.repository
            .upsert_facebook_lead(&NewFacebookLeadAd {
                leadgen_id: leadgen_id.to_string(),
                page_id,
                ad_id: value.ad_id.clone(),
                form_id: value.form_id.clone(),
                name: first_present(&fields, &NAME_FIELDS),
                email: first_present(&fields, &["email"]),
                phone: first_present(&fields, &PHONE_FIELDS),
                custom_fields: custom_fields(&fields, &FORM_STANDARD_FIELDS),
                raw_data: lead,
            })
            .await
    }

    pub async fn receive_relay(&self, payload: Value) -> Result<RelayReceipt> {
        let Value::Object(body) = payload else {
            return Err(AppError::ValidationError("Expected a JSON object".to_string()));
        };
        let lead = map_relay_lead(&body, chrono::Utc::now().timestamp_millis());
        let stored = self.repository.upsert_facebook_lead(&lead).await?;
        tracing::info!(id = %stored.id, leadgen_id = %stored.leadgen_id, "Relay lead stored");

        Ok(RelayReceipt {
            success: true,
            message: "Lead received and stored".to_string(),
            lead_id: stored.id,
        })
    }

    pub async fn forward_no_answer(&self, request: NoAnswerRequest) -> Result<()> {
        let (Some(lead_id), Some(phone)) = (
            request.lead_id.filter(|v| !v.is_empty()),
            request.phone.filter(|v| !v.is_empty()),
        ) else {
            return Err(AppError::ValidationError("leadId and phone are required".to_string()));
        };

        self.notifier
            .no_answer(&NoAnswerEvent {
                lead_id,
                phone,
                cold_caller_id: request.cold_caller_id,
                list_id: request.list_id,
            })
            .await
    }

    pub async fn forward_meeting_booked(&self, request: MeetingBookedRequest) -> Result<()> {
        let (Some(lead_id), Some(meeting_time)) = (
            request.lead_id.filter(|v| !v.is_empty()),
            request.meeting_time.filter(|v| !v.is_empty()),
        ) else {
            return Err(AppError::ValidationError(
                "leadId and meetingTime are required".to_string(),
            ));
        };

        self.notifier
            .meeting_booked(&MeetingBookedEvent {
                lead_id,
                meeting_time,
                closer_id: request.closer_id,
                cold_caller_id: request.cold_caller_id,
            })
            .await
    }
}
