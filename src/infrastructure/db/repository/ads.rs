use crate::domain::error::{AppError, Result};
use crate::domain::records::{ClientAd, ClientAdInput};
use crate::domain::{new_id, now_timestamp};

use super::entities::ClientAdEntity;
use super::CrmRepository;

impl CrmRepository {
    pub async fn create_client_ad(&self, input: &ClientAdInput) -> Result<ClientAd> {
        let ad = sqlx::query_as::<_, ClientAdEntity>(
            "INSERT INTO ads (id, client_id, name, platform, spend, revenue, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(new_id())
        .bind(&input.client_id)
        .bind(input.name.trim())
        .bind(&input.platform)
        .bind(input.spend.unwrap_or(0.0))
        .bind(input.revenue.unwrap_or(0.0))
        .bind(&input.status)
        .bind(now_timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create ad: {}", e)))?;

        Ok(ad.into())
    }

    pub async fn list_client_ads(&self, limit: Option<i64>) -> Result<Vec<ClientAd>> {
        let ads = sqlx::query_as::<_, ClientAdEntity>(
            "SELECT * FROM ads ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list ads: {}", e)))?;

        Ok(ads.into_iter().map(Into::into).collect())
    }

    pub async fn update_client_ad(&self, id: &str, input: &ClientAdInput) -> Result<ClientAd> {
        let ad = sqlx::query_as::<_, ClientAdEntity>(
            "UPDATE ads SET client_id = ?, name = ?, platform = ?, spend = COALESCE(?, spend), \
             revenue = COALESCE(?, revenue), status = ? WHERE id = ? RETURNING *",
        )
        .bind(&input.client_id)
        .bind(input.name.trim())
        .bind(&input.platform)
        .bind(input.spend)
        .bind(input.revenue)
        .bind(&input.status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update ad: {}", e)))?;

        match ad {
            Some(ad) => Ok(ad.into()),
            None => Err(AppError::NotFound(format!("Ad not found: {}", id))),
        }
    }

    pub async fn delete_client_ad(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM ads WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete ad: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Ad not found: {}", id)));
        }
        Ok(())
    }

    /// (Σ spend, Σ revenue) across client ads.
    pub async fn client_ad_totals(&self) -> Result<(f64, f64)> {
        let row: (Option<f64>, Option<f64>) =
            sqlx::query_as("SELECT SUM(spend), SUM(revenue) FROM ads")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to total ads: {}", e)))?;

        Ok((row.0.unwrap_or(0.0), row.1.unwrap_or(0.0)))
    }
}
