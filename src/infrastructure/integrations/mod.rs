pub mod apify;
pub mod calendly;
pub mod meta_graph;
pub mod resend;
pub mod stripe;
pub mod workflows;

use crate::domain::error::{AppError, Result};
use std::time::Duration;

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Client with a request timeout, so a stalled upstream cannot hold a
/// handler open.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Reads a JSON body from a response, turning non-2xx statuses into
/// `Upstream` errors that carry the service name and body text.
pub(crate) async fn read_json(service: &str, response: reqwest::Response) -> Result<serde_json::Value> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(AppError::Upstream(format!(
            "{} API error ({}): {}",
            service, status, text
        )));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Upstream(format!("Failed to parse {} response: {}", service, e)))
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
