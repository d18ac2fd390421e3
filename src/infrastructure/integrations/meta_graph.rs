use async_trait::async_trait;
use serde_json::Value;

use super::{join_url, read_json};
use crate::domain::ads::CampaignMetrics;
use crate::domain::error::Result;

const GRAPH_API_BASE: &str = "https://graph.facebook.com/v21.0";
pub const META_PLATFORM: &str = "meta";

#[derive(Debug, Clone, PartialEq)]
pub struct AdAccount {
    pub id: String,
    pub name: Option<String>,
}

impl AdAccount {
    /// Numeric account id without the `act_` prefix.
    pub fn numeric_id(&self) -> &str {
        self.id.trim_start_matches("act_")
    }
}

/// A campaign and its insights row, when the platform returned one.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignReport {
    pub id: String,
    pub name: String,
    pub metrics: Option<CampaignMetrics>,
}

#[async_trait]
pub trait AdsPlatform: Send + Sync {
    async fn ad_accounts(&self, token: &str) -> Result<Vec<AdAccount>>;

    /// Lifetime spend/impressions/clicks for each campaign of an account.
    async fn lifetime_campaigns(&self, token: &str, account_id: &str) -> Result<Vec<CampaignMetrics>>;

    /// Account-level lifetime insights, for accounts without campaigns.
    async fn account_insights(&self, token: &str, account: &AdAccount) -> Result<Option<CampaignMetrics>>;

    /// Campaigns with insights over the last 30 days, conversions included.
    async fn recent_campaigns(&self, token: &str, account_id: &str) -> Result<Vec<CampaignReport>>;

    /// Raw lead-form submission (`field_data` etc.) for one leadgen id.
    async fn lead_details(&self, token: &str, leadgen_id: &str) -> Result<Value>;
}

pub struct MetaGraphClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for MetaGraphClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaGraphClient {
    pub fn new() -> Self {
        Self {
            client: super::http_client(super::DEFAULT_HTTP_TIMEOUT),
            base_url: GRAPH_API_BASE.to_string(),
        }
    }

    async fn get(&self, path: &str, token: &str, query: &[(&str, &str)]) -> Result<Value> {
        let mut params: Vec<(&str, &str)> = query.to_vec();
        params.push(("access_token", token));

        let response = self
            .client
            .get(join_url(&self.base_url, path))
            .query(&params)
            .send()
            .await?;

        read_json("Meta Graph", response).await
    }
}

fn number_field(value: &Value, key: &str) -> f64 {
    match &value[key] {
        Value::String(s) => s.parse().unwrap_or(0.0),
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn count_field(value: &Value, key: &str) -> i64 {
    number_field(value, key) as i64
}

/// Purchases reported in an insights `actions` array.
pub(crate) fn purchase_conversions(insights: &Value) -> f64 {
    insights["actions"]
        .as_array()
        .and_then(|actions| {
            actions.iter().find(|action| {
                matches!(
                    action["action_type"].as_str(),
                    Some("purchase") | Some("offsite_conversion.fb_pixel_purchase")
                )
            })
        })
        .map(|action| number_field(action, "value"))
        .unwrap_or(0.0)
}

pub(crate) fn metrics_from_insights(
    insights: &Value,
    campaign_id: Option<String>,
    campaign_name: Option<String>,
) -> CampaignMetrics {
    CampaignMetrics {
        platform: META_PLATFORM.to_string(),
        campaign_id,
        campaign_name,
        spend: number_field(insights, "spend"),
        impressions: count_field(insights, "impressions"),
        clicks: count_field(insights, "clicks"),
        conversions: purchase_conversions(insights),
    }
}

fn first_insights(campaign: &Value) -> Option<&Value> {
    campaign["insights"]["data"].as_array().and_then(|rows| rows.first())
}

fn data_rows(value: &Value) -> Vec<Value> {
    value["data"].as_array().cloned().unwrap_or_default()
}

#[async_trait]
impl AdsPlatform for MetaGraphClient {
    async fn ad_accounts(&self, token: &str) -> Result<Vec<AdAccount>> {
        let body = self
            .get("me/adaccounts", token, &[("fields", "id,account_id,name")])
            .await?;

        Ok(data_rows(&body)
            .iter()
            .filter_map(|account| {
                Some(AdAccount {
                    id: account["id"].as_str()?.to_string(),
                    name: account["name"].as_str().map(str::to_string),
                })
            })
            .collect())
    }

    async fn lifetime_campaigns(&self, token: &str, account_id: &str) -> Result<Vec<CampaignMetrics>> {
        let body = self
            .get(
                &format!("act_{}/campaigns", account_id),
                token,
                &[("fields", "id,name,insights.time_preset(maximum){spend,impressions,clicks}")],
            )
            .await?;

        let empty = Value::Null;
        Ok(data_rows(&body)
            .iter()
            .map(|campaign| {
                let mut metrics = metrics_from_insights(
                    first_insights(campaign).unwrap_or(&empty),
                    campaign["id"].as_str().map(str::to_string),
                    campaign["name"].as_str().map(str::to_string),
                );
                metrics.conversions = 0.0;
                metrics
            })
            .collect())
    }

    async fn account_insights(&self, token: &str, account: &AdAccount) -> Result<Option<CampaignMetrics>> {
        let numeric_id = account.numeric_id();
        let body = self
            .get(
                &format!("act_{}/insights", numeric_id),
                token,
                &[("fields", "spend,impressions,clicks"), ("date_preset", "maximum")],
            )
            .await?;

        let rows = data_rows(&body);
        let insights = rows.first().cloned().unwrap_or(Value::Null);
        let name = account
            .name
            .clone()
            .unwrap_or_else(|| format!("Account {}", numeric_id));

        let mut metrics = metrics_from_insights(&insights, Some(account.id.clone()), Some(name));
        metrics.conversions = 0.0;
        Ok(Some(metrics))
    }

    async fn recent_campaigns(&self, token: &str, account_id: &str) -> Result<Vec<CampaignReport>> {
        let body = self
            .get(
                &format!("act_{}/campaigns", account_id),
                token,
                &[(
                    "fields",
                    "id,name,status,insights.date_preset(last_30d){spend,impressions,clicks,actions}",
                )],
            )
            .await?;

        Ok(data_rows(&body)
            .iter()
            .filter_map(|campaign| {
                let id = campaign["id"].as_str()?.to_string();
                let name = campaign["name"].as_str().unwrap_or_default().to_string();
                let metrics = first_insights(campaign).map(|insights| {
                    metrics_from_insights(insights, Some(id.clone()), Some(name.clone()))
                });
                Some(CampaignReport { id, name, metrics })
            })
            .collect())
    }

    async fn lead_details(&self, token: &str, leadgen_id: &str) -> Result<Value> {
        self.get(leadgen_id, token, &[]).await
    }
}
