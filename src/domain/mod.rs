pub mod activity;
pub mod ads;
pub mod calling;
pub mod deal;
pub mod error;
pub mod insight;
pub mod invoice;
pub mod lead;
pub mod llm_config;
pub mod profile;
pub mod records;
pub mod role;
pub mod scheduling;
pub mod scraper;

/// RFC 3339 UTC timestamp with millisecond precision. Fixed width, so
/// string order matches chronological order.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
