use crate::domain::error::Result;
use sqlx::sqlite::SqlitePool;

use super::connection;

mod activity;
mod ad_creatives;
mod ads;
mod agency_ads;
mod call_logs;
mod clients;
mod counts;
mod deals;
mod entities;
mod facebook_leads;
mod insights;
mod invoices;
mod lead_lists;
mod leads;
mod meetings;
mod profiles;
mod projects;
mod web_assets;

pub use counts::CountFilter;
pub use invoices::NewInvoice;
pub use leads::LeadFilter;
pub use meetings::NewMeeting;

#[derive(Clone)]
pub struct CrmRepository {
    pool: SqlitePool,
}

impl CrmRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(db_url: &str, max_connections: u32) -> Result<Self> {
        let pool = connection::connect_pool(db_url, max_connections).await?;
        Ok(Self { pool })
    }

    pub async fn in_memory() -> Result<Self> {
        let pool = connection::memory_pool().await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// `?, ?, ?` for an `IN (...)` clause of `count` binds.
pub(super) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// JSON text columns that failed to parse fall back to the type's default.
pub(super) fn parse_json_column<T: serde::de::DeserializeOwned + Default>(raw: &str) -> T {
    serde_json::from_str(raw).unwrap_or_default()
}
