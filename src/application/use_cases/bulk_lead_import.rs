use crate::domain::error::{AppError, Result};
use crate::domain::lead::{phone_key, NewLead};
use crate::infrastructure::db::CrmRepository;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

pub const SCRAPER_SOURCE: &str = "scraper";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BulkLeadInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub niche: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BulkImportRequest {
    #[serde(default, alias = "listId")]
    pub list_id: String,
    #[serde(default)]
    pub leads: Vec<BulkLeadInput>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct BulkImportResult {
    pub ok: bool,
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Saves scraped leads into a list. Phones are unique across every list.
pub struct BulkLeadImportUseCase {
    repository: Arc<CrmRepository>,
}

impl BulkLeadImportUseCase {
    pub fn new(repository: Arc<CrmRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, request: BulkImportRequest) -> Result<BulkImportResult> {
        let list_id = request.list_id.trim();
        if list_id.is_empty() {
            return Err(AppError::ValidationError("list_id is required".to_string()));
        }
        if request.leads.is_empty() {
            return Err(AppError::ValidationError(
                "leads array is required and must not be empty".to_string(),
            ));
        }

        let candidates: Vec<NewLead> = request
            .leads
            .iter()
            .filter_map(|lead| {
                Some(NewLead {
                    list_id: list_id.to_string(),
                    name: trimmed(&lead.name)?,
                    phone: trimmed(&lead.phone)?,
                    email: trimmed(&lead.email),
                    city: trimmed(&lead.city),
                    website: trimmed(&lead.website),
                    niche: trimmed(&lead.niche),
                    source: Some(SCRAPER_SOURCE.to_string()),
                })
            })
            .collect();
        if candidates.is_empty() {
            return Err(AppError::ValidationError(
                "No valid leads (each must have name and phone)".to_string(),
            ));
        }

        self.repository.get_lead_list(list_id).await?;

        // First occurrence of a phone wins within the batch.
        let mut seen = HashSet::new();
        let deduped: Vec<NewLead> = candidates
            .into_iter()
            .filter(|lead| seen.insert(phone_key(&lead.phone)))
            .collect();

        let phones: Vec<String> = deduped.iter().map(|lead| lead.phone.clone()).collect();
        let existing = self.repository.existing_phones(&phones).await?;
        let to_insert: Vec<NewLead> = deduped
            .iter()
            .filter(|lead| !existing.contains(&lead.phone))
            .cloned()
            .collect();

        if to_insert.is_empty() {
            return Ok(BulkImportResult {
                ok: true,
                count: 0,
                skipped: Some(deduped.len()),
                message: Some("All leads already exist (duplicate phone numbers).".to_string()),
            });
        }

        let count = self.repository.insert_leads(&to_insert).await?;
        self.repository.record_list_import(list_id, count, None).await?;

        let skipped = deduped.len() - to_insert.len();
        tracing::info!(list_id, count, skipped, "Bulk imported scraped leads");

        Ok(BulkImportResult {
            ok: true,
            count,
            skipped: (skipped > 0).then_some(skipped),
            message: (skipped > 0).then(|| format!("{} duplicate(s) skipped.", skipped)),
        })
    }
}
