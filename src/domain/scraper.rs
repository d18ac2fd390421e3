use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ScrapeRequest {
    #[serde(default)]
    pub search_term: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub max_results: Option<i64>,
    #[serde(default)]
    pub niche: Option<String>,
}

/// One place returned by the maps scraper actor.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedPlace {
    pub title: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub emails: Vec<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub total_score: Option<f64>,
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScrapedLead {
    pub business_name: String,
    pub website: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub niche: Option<String>,
    pub rating: Option<f64>,
    pub google_maps_url: String,
    pub status: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct ScrapeSummary {
    pub total: usize,
    pub with_website: usize,
    pub with_email: usize,
    pub leads: Vec<ScrapedLead>,
}
