use crate::domain::error::{AppError, Result};
use crate::domain::scraper::{ScrapeRequest, ScrapeSummary, ScrapedLead, ScrapedPlace};
use crate::infrastructure::integrations::apify::PlaceScraper;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_SEARCH_TERM: &str = "restaurants";
pub const DEFAULT_CITY: &str = "Hamilton";
pub const DEFAULT_MAX_RESULTS: i64 = 100;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(8);
/// 75 polls at the default interval is ten minutes.
pub const DEFAULT_MAX_POLLS: u32 = 75;
const NEW_LEAD_STATUS: &str = "New";

/// Search parameters after defaults and clamping.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeQuery {
    pub search: String,
    pub city: String,
    pub max_results: i64,
    pub niche: Option<String>,
}

impl ScrapeQuery {
    pub fn from_request(request: &ScrapeRequest) -> Self {
        let trimmed = |value: &Option<String>, default: &str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
                .to_string()
        };
        let max_results = request
            .max_results
            .filter(|max| *max != 0)
            .unwrap_or(DEFAULT_MAX_RESULTS)
            .clamp(10, 200);

        Self {
            search: trimmed(&request.search_term, DEFAULT_SEARCH_TERM),
            city: trimmed(&request.city, DEFAULT_CITY),
            max_results,
            niche: request.niche.clone(),
        }
    }

    pub fn actor_input(&self) -> Value {
        json!({
            "searchStringsArray": [format!("{} {}", self.search, self.city)],
            "locationQuery": format!("{}, Ontario, Canada", self.city),
            "maxCrawledPlacesPerSearch": self.max_results,
            "language": "en",
            "skipClosedPlaces": true,
        })
    }
}

pub fn to_scraped_lead(place: ScrapedPlace, query: &ScrapeQuery) -> ScrapedLead {
    let email = place
        .emails
        .into_iter()
        .next()
        .or(place.email)
        .unwrap_or_default();

    ScrapedLead {
        business_name: place.title.unwrap_or_default(),
        website: place.website.unwrap_or_default(),
        phone: place.phone.unwrap_or_default(),
        email,
        address: place.address.unwrap_or_default(),
        city: query.city.clone(),
        niche: query.niche.clone(),
        rating: place.total_score,
        google_maps_url: place.url.unwrap_or_default(),
        status: NEW_LEAD_STATUS.to_string(),
    }
}

/// Totals cover every place. Only places with a website are returned.
pub fn summarize(leads: Vec<ScrapedLead>) -> ScrapeSummary {
    let total = leads.len();
    let with_email = leads.iter().filter(|lead| !lead.email.is_empty()).count();
    let leads: Vec<ScrapedLead> = leads
        .into_iter()
        .filter(|lead| !lead.website.is_empty())
        .collect();

    ScrapeSummary {
        total,
        with_website: leads.len(),
        with_email,
        leads,
    }
}

pub struct LeadScraperUseCase {
    scraper: Option<Arc<dyn PlaceScraper>>,
    poll_interval: Duration,
    max_polls: u32,
}

impl LeadScraperUseCase {
    pub fn new(scraper: Option<Arc<dyn PlaceScraper>>) -> Self {
        Self {
            scraper,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls;
        self
    }

    pub async fn execute(&self, request: &ScrapeRequest) -> Result<ScrapeSummary> {
        let scraper = self
            .scraper
            .as_ref()
            .ok_or_else(|| AppError::NotConfigured("APIFY_TOKEN not configured".to_string()))?;
        let query = ScrapeQuery::from_request(request);

        let run_id = scraper.start_run(&query.actor_input()).await?;
        tracing::info!(%run_id, search = %query.search, city = %query.city, max = query.max_results, "Scraper run started");

        let mut status = "RUNNING".to_string();
        let mut polls = 0;
        while status == "RUNNING" || status == "READY" {
            if polls == self.max_polls {
                tracing::error!(%run_id, %status, polls, "Scraper run did not finish");
                return Err(AppError::Upstream(format!(
                    "Apify run {} still {} after {} polls",
                    run_id, status, polls
                )));
            }
            polls += 1;
            tokio::time::sleep(self.poll_interval).await;
            status = scraper.run_status(&run_id).await?;
            tracing::debug!(%run_id, %status, "Scraper run polled");
        }

        if status != "SUCCEEDED" {
            tracing::error!(%run_id, %status, "Scraper run failed");
            return Err(AppError::Internal(format!("Apify run failed with status {}", status)));
        }

        let places = scraper.dataset_items(&run_id).await?;
        let leads = places
            .into_iter()
            .map(|place| to_scraped_lead(place, &query))
            .collect();
        let summary = summarize(leads);
        tracing::info!(%run_id, total = summary.total, with_website = summary.with_website, "Scraper run finished");

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Answers the scripted statuses in order, then repeats the last one.
    struct ScriptedScraper {
        statuses: Vec<&'static str>,
        polls: Mutex<usize>,
        inputs: Mutex<Vec<Value>>,
    }

    impl ScriptedScraper {
        fn new(statuses: Vec<&'static str>) -> Self {
            Self {
                statuses,
                polls: Mutex::new(0),
                inputs: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PlaceScraper for ScriptedScraper {
        async fn start_run(&self, input: &Value) -> Result<String> {
            self.inputs.lock().unwrap().push(input.clone());
            Ok("run-1".to_string())
        }

        async fn run_status(&self, _run_id: &str) -> Result<String> {
            let mut polls = self.polls.lock().unwrap();
            let status = self.statuses[(*polls).min(self.statuses.len() - 1)];
            *polls += 1;
            Ok(status.to_string())
        }

        async fn dataset_items(&self, _run_id: &str) -> Result<Vec<ScrapedPlace>> {
            Ok(vec![
                ScrapedPlace {
                    title: Some("Joe's Diner".to_string()),
                    phone: Some("905-555-0100".to_string()),
                    emails: vec!["joe@diner.test".to_string()],
                    email: Some("other@diner.test".to_string()),
                    website: Some("https://diner.test".to_string()),
                    total_score: Some(4.5),
                    ..Default::default()
                },
                ScrapedPlace {
                    title: Some("No Site Pizza".to_string()),
                    email: Some("pizza@test".to_string()),
                    ..Default::default()
                },
            ])
        }
    }

    #[test]
    fn request_defaults_and_clamps() {
        let query = ScrapeQuery::from_request(&ScrapeRequest::default());
        assert_eq!(query.search, "restaurants");
        assert_eq!(query.city, "Hamilton");
        assert_eq!(query.max_results, 100);

        let big = ScrapeQuery::from_request(&ScrapeRequest {
            max_results: Some(5000),
            city: Some("  Toronto ".to_string()),
            ..Default::default()
        });
        assert_eq!(big.max_results, 200);
        assert_eq!(big.actor_input()["locationQuery"], "Toronto, Ontario, Canada");

        let small = ScrapeQuery::from_request(&ScrapeRequest {
            max_results: Some(3),
            ..Default::default()
        });
        assert_eq!(small.max_results, 10);
    }

    #[tokio::test]
    async fn polls_until_succeeded_and_keeps_sites_only() {
        let scraper = Arc::new(ScriptedScraper::new(vec!["READY", "RUNNING", "SUCCEEDED"]));
        let use_case = LeadScraperUseCase::new(Some(scraper.clone() as Arc<dyn PlaceScraper>)).with_poll_interval(Duration::ZERO);

        let summary = use_case
            .execute(&ScrapeRequest {
                search_term: Some("dentists".to_string()),
                niche: Some("dental".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!((summary.total, summary.with_website, summary.with_email), (2, 1, 2));
        assert_eq!(summary.leads[0].email, "joe@diner.test");
        assert_eq!(summary.leads[0].status, "New");
        assert_eq!(summary.leads[0].niche.as_deref(), Some("dental"));
        assert_eq!(*scraper.polls.lock().unwrap(), 3);
        assert_eq!(
            scraper.inputs.lock().unwrap()[0]["searchStringsArray"][0],
            "dentists Hamilton"
        );
    }

    #[tokio::test]
    async fn failed_run_is_an_error() {
        let scraper = Arc::new(ScriptedScraper::new(vec!["RUNNING", "FAILED"]));
        let use_case = LeadScraperUseCase::new(Some(scraper as Arc<dyn PlaceScraper>)).with_poll_interval(Duration::ZERO);
        let err = use_case.execute(&ScrapeRequest::default()).await.unwrap_err();
        assert!(err.message().contains("FAILED"));
    }

    #[tokio::test]
    async fn run_stuck_in_running_gives_up() {
        let scraper = Arc::new(ScriptedScraper::new(vec!["RUNNING"]));
        let use_case = LeadScraperUseCase::new(Some(scraper.clone() as Arc<dyn PlaceScraper>))
            .with_poll_interval(Duration::ZERO)
            .with_max_polls(5);

        let err = use_case.execute(&ScrapeRequest::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
        assert!(err.message().contains("still RUNNING"));
        assert_eq!(*scraper.polls.lock().unwrap(), 5);
    }

    #[tokio::test]
    async fn missing_token_is_not_configured() {
        let err = LeadScraperUseCase::new(None)
            .execute(&ScrapeRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotConfigured(_)));
    }
}
