use std::collections::HashSet;

use crate::domain::error::{AppError, Result};
use crate::domain::lead::{Lead, LeadInput, LeadStatus, NewLead};
use crate::domain::{new_id, now_timestamp};
use serde::Deserialize;

use super::entities::LeadEntity;
use super::{placeholders, CrmRepository};

#[derive(Debug, Default, Clone, Deserialize)]
pub struct LeadFilter {
    #[serde(default)]
    pub list_id: Option<String>,
    #[serde(default)]
    pub status: Option<LeadStatus>,
    #[serde(default)]
    pub cold_caller_id: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl CrmRepository {
    pub async fn create_lead(&self, input: &LeadInput) -> Result<Lead> {
        let lead = sqlx::query_as::<_, LeadEntity>(
            "INSERT INTO leads (id, client_id, name, email, phone, niche, city, website, list_id, status, cold_caller_id, source, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'manual', ?) RETURNING *",
        )
        .bind(new_id())
        .bind(&input.client_id)
        .bind(input.name.trim())
        .bind(&input.email)
        .bind(input.phone.trim())
        .bind(&input.niche)
        .bind(&input.city)
        .bind(&input.website)
        .bind(&input.list_id)
        .bind(input.status.unwrap_or(LeadStatus::New).as_str())
        .bind(&input.cold_caller_id)
        .bind(now_timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create lead: {}", e)))?;

        Ok(lead.into())
    }

    pub async fn get_lead(&self, id: &str) -> Result<Lead> {
        let lead = sqlx::query_as::<_, LeadEntity>("SELECT * FROM leads WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch lead: {}", e)))?;

        match lead {
            Some(lead) => Ok(lead.into()),
            None => Err(AppError::NotFound(format!("Lead not found: {}", id))),
        }
    }

    pub async fn list_leads(&self, filter: &LeadFilter) -> Result<Vec<Lead>> {
        let leads = sqlx::query_as::<_, LeadEntity>(
            "SELECT * FROM leads \
             WHERE (?1 IS NULL OR list_id = ?1) \
               AND (?2 IS NULL OR status = ?2) \
               AND (?3 IS NULL OR cold_caller_id = ?3) \
             ORDER BY created_at DESC, rowid DESC LIMIT ?4",
        )
        .bind(&filter.list_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(&filter.cold_caller_id)
        .bind(filter.limit.unwrap_or(-1))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list leads: {}", e)))?;

        Ok(leads.into_iter().map(Into::into).collect())
    }

    pub async fn update_lead(&self, id: &str, input: &LeadInput) -> Result<Lead> {
        let lead = sqlx::query_as::<_, LeadEntity>(
            "UPDATE leads SET client_id = ?, name = ?, email = ?, phone = ?, niche = ?, city = ?, website = ?, \
             list_id = ?, status = COALESCE(?, status), cold_caller_id = ? WHERE id = ? RETURNING *",
        )
        .bind(&input.client_id)
        .bind(input.name.trim())
        .bind(&input.email)
        .bind(input.phone.trim())
        .bind(&input.niche)
        .bind(&input.city)
        .bind(&input.website)
        .bind(&input.list_id)
        .bind(input.status.map(|s| s.as_str()))
        .bind(&input.cold_caller_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update lead: {}", e)))?;

        match lead {
            Some(lead) => Ok(lead.into()),
            None => Err(AppError::NotFound(format!("Lead not found: {}", id))),
        }
    }

    pub async fn update_lead_status(&self, id: &str, status: LeadStatus) -> Result<Lead> {
        let lead = sqlx::query_as::<_, LeadEntity>(
            "UPDATE leads SET status = ? WHERE id = ? RETURNING *",
        )
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update lead status: {}", e)))?;

        match lead {
            Some(lead) => Ok(lead.into()),
            None => Err(AppError::NotFound(format!("Lead not found: {}", id))),
        }
    }

    pub async fn delete_lead(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM leads WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete lead: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Lead not found: {}", id)));
        }
        Ok(())
    }

    /// Inserts an import batch in one transaction. Every row starts as `new`.
    pub async fn insert_leads(&self, leads: &[NewLead]) -> Result<u64> {
        if leads.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to start lead import tx: {}", e)))?;

        let now = now_timestamp();
        let mut inserted = 0u64;
        for lead in leads {
            let result = sqlx::query(
                "INSERT INTO leads (id, name, email, phone, niche, city, website, list_id, status, source, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'new', ?, ?)",
            )
            .bind(new_id())
            .bind(&lead.name)
            .bind(&lead.email)
            .bind(&lead.phone)
            .bind(&lead.niche)
            .bind(&lead.city)
            .bind(&lead.website)
            .bind(&lead.list_id)
            .bind(&lead.source)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to insert lead: {}", e)))?;
            inserted += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit lead import: {}", e)))?;

        Ok(inserted)
    }

    /// Which of `phones` already exist on some lead, in any list.
    pub async fn existing_phones(&self, phones: &[String]) -> Result<HashSet<String>> {
        if phones.is_empty() {
            return Ok(HashSet::new());
        }

        let sql = format!(
            "SELECT DISTINCT phone FROM leads WHERE phone IN ({})",
            placeholders(phones.len())
        );
        let mut query = sqlx::query_scalar::<_, String>(&sql);
        for phone in phones {
            query = query.bind(phone);
        }
        let found = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to check existing phones: {}", e)))?;

        Ok(found.into_iter().collect())
    }

    /// Oldest lead in the list that can still be dialed and is not in `exclude`.
    pub async fn next_callable_lead(&self, list_id: &str, exclude: &[String]) -> Result<Option<Lead>> {
        let callable: Vec<&str> = LeadStatus::CALLABLE.iter().map(|s| s.as_str()).collect();
        let mut sql = format!(
            "SELECT * FROM leads WHERE list_id = ? AND status IN ({})",
            placeholders(callable.len())
        );
        if !exclude.is_empty() {
            sql.push_str(&format!(" AND id NOT IN ({})", placeholders(exclude.len())));
        }
        sql.push_str(" ORDER BY created_at ASC, rowid ASC LIMIT 1");

        let mut query = sqlx::query_as::<_, LeadEntity>(&sql).bind(list_id);
        for status in callable {
            query = query.bind(status);
        }
        for id in exclude {
            query = query.bind(id);
        }

        let lead = query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch next lead: {}", e)))?;

        Ok(lead.map(Into::into))
    }
}
