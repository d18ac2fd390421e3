use crate::domain::ads::{FacebookLeadAd, NewFacebookLeadAd};
use crate::domain::error::{AppError, Result};
use crate::domain::{new_id, now_timestamp};

use super::entities::FacebookLeadAdEntity;
use super::CrmRepository;

impl CrmRepository {
    /// Stores a lead-form submission. A repeated `leadgen_id` refreshes the row.
    pub async fn upsert_facebook_lead(&self, lead: &NewFacebookLeadAd) -> Result<FacebookLeadAd> {
        let custom_fields = lead
            .custom_fields
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| AppError::Internal(format!("Failed to encode custom fields: {}", e)))?;
        let raw_data = serde_json::to_string(&lead.raw_data)
            .map_err(|e| AppError::Internal(format!("Failed to encode raw lead data: {}", e)))?;

        let stored = sqlx::query_as::<_, FacebookLeadAdEntity>(
            "INSERT INTO facebook_lead_ads (id, leadgen_id, page_id, ad_id, form_id, name, email, phone, custom_fields, raw_data, synced_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(leadgen_id) DO UPDATE SET \
               page_id = excluded.page_id, ad_id = excluded.ad_id, form_id = excluded.form_id, \
               name = excluded.name, email = excluded.email, phone = excluded.phone, \
               custom_fields = excluded.custom_fields, raw_data = excluded.raw_data, synced_at = excluded.synced_at \
             RETURNING *",
        )
        .bind(new_id())
        .bind(&lead.leadgen_id)
        .bind(&lead.page_id)
        .bind(&lead.ad_id)
        .bind(&lead.form_id)
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(custom_fields)
        .bind(raw_data)
        .bind(now_timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to store lead-form submission: {}", e)))?;

        Ok(stored.into())
    }

    pub async fn list_facebook_leads(&self, limit: Option<i64>) -> Result<Vec<FacebookLeadAd>> {
        let leads = sqlx::query_as::<_, FacebookLeadAdEntity>(
            "SELECT * FROM facebook_lead_ads ORDER BY synced_at DESC, rowid DESC LIMIT ?",
        )
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list lead-form submissions: {}", e)))?;

        Ok(leads.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn repeated_leadgen_id_updates_in_place() {
        let repo = CrmRepository::in_memory().await.unwrap();
        let mut lead = NewFacebookLeadAd {
            leadgen_id: "lg-1".to_string(),
            page_id: None,
            ad_id: None,
            form_id: None,
            name: Some("Jo".to_string()),
            email: None,
            phone: None,
            custom_fields: None,
            raw_data: json!({"id": "lg-1"}),
        };
        repo.upsert_facebook_lead(&lead).await.unwrap();
        lead.email = Some("jo@example.com".to_string());
        repo.upsert_facebook_lead(&lead).await.unwrap();

        let stored = repo.list_facebook_leads(None).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].email.as_deref(), Some("jo@example.com"));
        assert_eq!(stored[0].raw_data, json!({"id": "lg-1"}));
    }
}
