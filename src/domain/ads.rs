use serde::{Deserialize, Serialize};

/// Cached snapshot of one campaign's performance on an external ad platform.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AgencyAd {
    pub id: String,
    pub platform: String,
    pub campaign_id: Option<String>,
    pub campaign_name: Option<String>,
    pub spend: f64,
    pub impressions: i64,
    pub clicks: i64,
    pub conversions: f64,
    pub lead_count: i64,
    pub synced_at: String,
}

/// Campaign metrics as pulled from the platform, before they are stored.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CampaignMetrics {
    pub platform: String,
    pub campaign_id: Option<String>,
    pub campaign_name: Option<String>,
    pub spend: f64,
    pub impressions: i64,
    pub clicks: i64,
    pub conversions: f64,
}

/// A lead-form submission received from the ad platform or a relay.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FacebookLeadAd {
    pub id: String,
    pub leadgen_id: String,
    pub page_id: Option<String>,
    pub ad_id: Option<String>,
    pub form_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub custom_fields: Option<serde_json::Map<String, serde_json::Value>>,
    pub raw_data: serde_json::Value,
    pub synced_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFacebookLeadAd {
    pub leadgen_id: String,
    pub page_id: Option<String>,
    pub ad_id: Option<String>,
    pub form_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub custom_fields: Option<serde_json::Map<String, serde_json::Value>>,
    pub raw_data: serde_json::Value,
}
