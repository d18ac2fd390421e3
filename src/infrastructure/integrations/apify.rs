use async_trait::async_trait;
use serde_json::Value;

use super::{join_url, read_json};
use crate::domain::error::{AppError, Result};
use crate::domain::scraper::ScrapedPlace;

const APIFY_API_BASE: &str = "https://api.apify.com/v2";
pub const MAPS_ACTOR: &str = "lukaskrivka~google-maps-with-contact-details";

#[async_trait]
pub trait PlaceScraper: Send + Sync {
    /// Starts an actor run and returns its id.
    async fn start_run(&self, input: &Value) -> Result<String>;

    /// Current run status, e.g. `RUNNING`, `SUCCEEDED`, `FAILED`.
    async fn run_status(&self, run_id: &str) -> Result<String>;

    async fn dataset_items(&self, run_id: &str) -> Result<Vec<ScrapedPlace>>;
}

pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl ApifyClient {
    pub fn new(token: String) -> Self {
        Self {
            client: super::http_client(super::DEFAULT_HTTP_TIMEOUT),
            token,
            base_url: APIFY_API_BASE.to_string(),
        }
    }
}

#[async_trait]
impl PlaceScraper for ApifyClient {
    async fn start_run(&self, input: &Value) -> Result<String> {
        let response = self
            .client
            .post(join_url(&self.base_url, &format!("acts/{}/runs", MAPS_ACTOR)))
            .query(&[("token", self.token.as_str())])
            .json(input)
            .send()
            .await?;
        let body = read_json("Apify", response).await?;

        body["data"]["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AppError::Upstream("No run ID from Apify".to_string()))
    }

    async fn run_status(&self, run_id: &str) -> Result<String> {
        let response = self
            .client
            .get(join_url(&self.base_url, &format!("actor-runs/{}", run_id)))
            .query(&[("token", self.token.as_str())])
            .send()
            .await?;
        let body = read_json("Apify", response).await?;

        Ok(body["data"]["status"]
            .as_str()
            .unwrap_or("UNKNOWN")
            .to_string())
    }

    async fn dataset_items(&self, run_id: &str) -> Result<Vec<ScrapedPlace>> {
        let response = self
            .client
            .get(join_url(&self.base_url, &format!("actor-runs/{}/dataset/items", run_id)))
            .query(&[("token", self.token.as_str()), ("format", "json")])
            .send()
            .await?;
        let body = read_json("Apify", response).await?;

        serde_json::from_value(body)
            .map_err(|e| AppError::Upstream(format!("Unexpected Apify dataset format: {}", e)))
    }
}
