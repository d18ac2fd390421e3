use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct ClientInput {
    #[validate(length(min = 1, message = "Client name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProjectUpdate {
    pub text: String,
    pub at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Project {
    pub id: String,
    pub client_id: String,
    pub name: String,
    pub status: String,
    #[serde(rename = "type")]
    pub project_type: String,
    pub progress: i64,
    pub owner_id: Option<String>,
    pub updates: Vec<ProjectUpdate>,
    pub created_at: String,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct ProjectInput {
    #[validate(length(min = 1, message = "client_id is required"))]
    pub client_id: String,
    #[validate(length(min = 1, message = "Project name is required"))]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "type")]
    pub project_type: Option<String>,
    #[validate(range(min = 0, max = 100, message = "Progress must be between 0 and 100"))]
    #[serde(default)]
    pub progress: Option<i64>,
    #[serde(default)]
    pub owner_id: Option<String>,
    /// Free-text progress note appended to the project's update history on edit.
    #[serde(default)]
    pub update_text: Option<String>,
}

/// Funnels and sites share one shape and live in sibling tables.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WebAssetKind {
    Funnel,
    Site,
}

impl WebAssetKind {
    pub fn table(&self) -> &'static str {
        match self {
            WebAssetKind::Funnel => "funnels",
            WebAssetKind::Site => "sites",
        }
    }

    pub fn entity_type(&self) -> &'static str {
        match self {
            WebAssetKind::Funnel => "funnel",
            WebAssetKind::Site => "site",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WebAsset {
    pub id: String,
    pub client_id: Option<String>,
    pub name: String,
    pub url: Option<String>,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct WebAssetInput {
    #[serde(default)]
    pub client_id: Option<String>,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(url(message = "Invalid URL"))]
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

pub const DEFAULT_CREATIVE_PLATFORM: &str = "meta";

/// Ad copy and media kept per project. Media are stored as public URLs.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdCreative {
    pub id: String,
    pub project_id: String,
    /// Filled on the library listing only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    pub name: String,
    pub platform: String,
    pub primary_text: Option<String>,
    pub headline: Option<String>,
    pub cta: Option<String>,
    pub image_urls: Vec<String>,
    pub video_urls: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct AdCreativeInput {
    #[validate(length(min = 1, message = "Creative name is required"))]
    pub name: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub primary_text: Option<String>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub cta: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub video_urls: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Meeting {
    pub id: String,
    pub lead_id: Option<String>,
    pub client_id: Option<String>,
    pub scheduled_at: String,
    pub booked_by: String,
    pub closer_id: Option<String>,
    pub source: String,
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct MeetingInput {
    #[serde(default)]
    pub lead_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[validate(length(min = 1, message = "scheduled_at is required"))]
    pub scheduled_at: String,
    #[serde(default)]
    pub closer_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClientAd {
    pub id: String,
    pub client_id: Option<String>,
    pub name: String,
    pub platform: Option<String>,
    pub spend: f64,
    pub revenue: f64,
    pub status: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct ClientAdInput {
    #[serde(default)]
    pub client_id: Option<String>,
    #[validate(length(min = 1, message = "Ad name is required"))]
    pub name: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[validate(range(min = 0.0, message = "Spend cannot be negative"))]
    #[serde(default)]
    pub spend: Option<f64>,
    #[validate(range(min = 0.0, message = "Revenue cannot be negative"))]
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_input_rejects_bad_email() {
        let input = ClientInput {
            name: "Acme".to_string(),
            email: Some("not-an-email".to_string()),
            phone: None,
            company: None,
            notes: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn project_input_reads_type_field() {
        let input: ProjectInput = serde_json::from_str(
            r#"{"client_id":"c1","name":"Landing","type":"funnel","progress":40}"#,
        )
        .unwrap();
        assert_eq!(input.project_type.as_deref(), Some("funnel"));
        assert!(input.validate().is_ok());
    }

    #[test]
    fn project_progress_out_of_range_fails() {
        let input: ProjectInput =
            serde_json::from_str(r#"{"client_id":"c1","name":"Landing","progress":140}"#).unwrap();
        assert!(input.validate().is_err());
    }
}
