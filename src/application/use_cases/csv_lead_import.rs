use crate::domain::error::{AppError, Result};
use crate::domain::lead::{LeadColumnMap, NewLead};
use crate::infrastructure::csv::{CsvParser, CsvTable};
use crate::infrastructure::db::CrmRepository;
use serde::Serialize;
use std::sync::Arc;

const UNKNOWN_NAME: &str = "Unknown";
const SECOND_EMAIL_COLUMN: &str = "emails/1";

#[derive(Debug, Serialize)]
pub struct CsvImportResult {
    pub ok: bool,
    pub count: u64,
    pub column_map: LeadColumnMap,
}

/// Picks the columns that hold each lead field. The first header matching a
/// rule wins. `url` is never treated as the website: in maps exports it is
/// the listing link.
pub fn detect_columns(headers: &[String]) -> LeadColumnMap {
    let name = find_header(headers, |h| {
        h == "title" || h == "name" || h == "business_name" || h.starts_with("name") || h.contains("business")
    })
    .or_else(|| headers.first().cloned())
    .unwrap_or_else(|| "name".to_string());

    let city = find_header(headers, |h| h == "city" || h == "location");

    let phone = find_header(headers, |h| h == "phone" || h.contains("mobile") || h.contains("tel"))
        .or_else(|| headers.get(1).cloned())
        .unwrap_or_else(|| "phone".to_string());

    let email = find_header(headers, |h| {
        h == "emails/0" || h == "email" || h.starts_with("emails/") || h.starts_with("email")
    });

    let website = find_header(headers, |h| h == "website");

    LeadColumnMap {
        name,
        city,
        phone,
        email,
        website,
    }
}

fn find_header(headers: &[String], rule: impl Fn(&str) -> bool) -> Option<String> {
    headers.iter().find(|h| rule(h.as_str())).cloned()
}

/// Turns parsed rows into leads for `list_id`. Rows without a phone are skipped.
pub fn map_rows(table: &CsvTable, map: &LeadColumnMap, list_id: &str) -> Vec<NewLead> {
    let second_email = table.header_index(SECOND_EMAIL_COLUMN);

    table
        .rows
        .iter()
        .filter_map(|row| {
            let get = |column: Option<&str>| -> Option<String> {
                let index = table.header_index(column?)?;
                cell(row, index)
            };

            let phone = get(Some(map.phone.as_str()))?;
            let name = get(Some(map.name.as_str())).unwrap_or_else(|| UNKNOWN_NAME.to_string());

            let mut email = get(map.email.as_deref());
            let is_emails_column = map
                .email
                .as_deref()
                .is_some_and(|column| column.starts_with("emails/"));
            if email.is_none() && is_emails_column {
                email = second_email.and_then(|index| cell(row, index));
            }

            Some(NewLead {
                list_id: list_id.to_string(),
                name,
                phone,
                email,
                city: get(map.city.as_deref()),
                website: get(map.website.as_deref()),
                niche: None,
                source: None,
            })
        })
        .collect()
}

fn cell(row: &[String], index: usize) -> Option<String> {
    row.get(index)
        .map(|value| value.trim_matches('"').trim())
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string())
}

pub struct CsvLeadImportUseCase {
    repository: Arc<CrmRepository>,
    parser: CsvParser,
}

impl CsvLeadImportUseCase {
    pub fn new(repository: Arc<CrmRepository>) -> Self {
        Self {
            repository,
            parser: CsvParser::new().with_delimiter(b','),
        }
    }

    pub async fn execute(&self, list_id: &str, bytes: &[u8]) -> Result<CsvImportResult> {
        if list_id.trim().is_empty() {
            return Err(AppError::ValidationError("list_id is required".to_string()));
        }
        self.repository.get_lead_list(list_id).await?;

        let table = self.parser.parse_bytes(bytes)?;
        let column_map = detect_columns(&table.headers);
        tracing::debug!(headers = ?table.headers, rows = table.rows.len(), ?column_map, "CSV columns detected");

        let leads = map_rows(&table, &column_map, list_id);
        if leads.is_empty() {
            return Err(AppError::ValidationError(
                "No valid leads found. Make sure CSV has phone numbers.".to_string(),
            ));
        }

        let count = self.repository.insert_leads(&leads).await?;
        self.repository
            .record_list_import(list_id, count, Some(&column_map))
            .await?;
        tracing::info!(list_id, count, "Imported leads from CSV");

        Ok(CsvImportResult {
            ok: true,
            count,
            column_map,
        })
    }
}
