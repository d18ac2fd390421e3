use crate::domain::ads::{AgencyAd, CampaignMetrics};
use crate::domain::error::{AppError, Result};
use crate::domain::{new_id, now_timestamp};

use super::entities::AgencyAdEntity;
use super::CrmRepository;

impl CrmRepository {
    pub async fn list_agency_ads(&self, limit: Option<i64>) -> Result<Vec<AgencyAd>> {
        let ads = sqlx::query_as::<_, AgencyAdEntity>(
            "SELECT * FROM agency_ads ORDER BY synced_at DESC, rowid ASC LIMIT ?",
        )
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list agency ads: {}", e)))?;

        Ok(ads.into_iter().map(Into::into).collect())
    }

    /// Drops every row for `platform` and writes `rows` in its place.
    pub async fn replace_platform_ads(&self, platform: &str, rows: &[CampaignMetrics]) -> Result<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to start ad sync tx: {}", e)))?;

        sqlx::query("DELETE FROM agency_ads WHERE platform = ?")
            .bind(platform)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to clear agency ads: {}", e)))?;

        let now = now_timestamp();
        let mut inserted = 0u64;
        for row in rows {
            let result = sqlx::query(
                "INSERT INTO agency_ads (id, platform, campaign_id, campaign_name, spend, impressions, clicks, conversions, lead_count, synced_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?)",
            )
            .bind(new_id())
            .bind(platform)
            .bind(&row.campaign_id)
            .bind(&row.campaign_name)
            .bind(row.spend)
            .bind(row.impressions)
            .bind(row.clicks)
            .bind(row.conversions)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to insert agency ad: {}", e)))?;
            inserted += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit ad sync: {}", e)))?;

        Ok(inserted)
    }

    /// Insert or refresh one campaign keyed by `campaign_id`.
    pub async fn upsert_agency_ad(&self, row: &CampaignMetrics) -> Result<AgencyAd> {
        let ad = sqlx::query_as::<_, AgencyAdEntity>(
            "INSERT INTO agency_ads (id, platform, campaign_id, campaign_name, spend, impressions, clicks, conversions, lead_count, synced_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?) \
             ON CONFLICT(campaign_id) DO UPDATE SET \
               platform = excluded.platform, campaign_name = excluded.campaign_name, spend = excluded.spend, \
               impressions = excluded.impressions, clicks = excluded.clicks, conversions = excluded.conversions, \
               synced_at = excluded.synced_at \
             RETURNING *",
        )
        .bind(new_id())
        .bind(&row.platform)
        .bind(&row.campaign_id)
        .bind(&row.campaign_name)
        .bind(row.spend)
        .bind(row.impressions)
        .bind(row.clicks)
        .bind(row.conversions)
        .bind(now_timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to upsert agency ad: {}", e)))?;

        Ok(ad.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(campaign_id: &str, spend: f64) -> CampaignMetrics {
        CampaignMetrics {
            platform: "meta".to_string(),
            campaign_id: Some(campaign_id.to_string()),
            campaign_name: Some(format!("Campaign {campaign_id}")),
            spend,
            impressions: 1000,
            clicks: 40,
            conversions: 2.0,
        }
    }

    #[tokio::test]
    async fn replace_drops_stale_rows() {
        let repo = CrmRepository::in_memory().await.unwrap();
        repo.replace_platform_ads("meta", &[metrics("a", 10.0), metrics("b", 20.0)])
            .await
            .unwrap();
        repo.replace_platform_ads("meta", &[metrics("c", 5.0)]).await.unwrap();

        let ads = repo.list_agency_ads(None).await.unwrap();
        assert_eq!(ads.len(), 1);
        assert_eq!(ads[0].campaign_id.as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn upsert_refreshes_existing_campaign() {
        let repo = CrmRepository::in_memory().await.unwrap();
        let first = repo.upsert_agency_ad(&metrics("a", 10.0)).await.unwrap();
        let second = repo.upsert_agency_ad(&metrics("a", 55.5)).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.spend, 55.5);
        assert_eq!(repo.list_agency_ads(None).await.unwrap().len(), 1);
    }
}
