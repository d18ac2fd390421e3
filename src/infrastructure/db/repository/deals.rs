use crate::domain::deal::{Deal, DealInput, DealStage, NewDeal};
use crate::domain::error::{AppError, Result};
use crate::domain::{new_id, now_timestamp};

use super::entities::DealEntity;
use super::CrmRepository;

impl CrmRepository {
    pub async fn create_deal(&self, deal: &NewDeal) -> Result<Deal> {
        let now = now_timestamp();
        let created = sqlx::query_as::<_, DealEntity>(
            "INSERT INTO deals (id, client_id, lead_id, meeting_id, name, value, min_value, max_value, stage, closer_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(new_id())
        .bind(&deal.client_id)
        .bind(&deal.lead_id)
        .bind(&deal.meeting_id)
        .bind(deal.name.trim())
        .bind(deal.value)
        .bind(deal.min_value)
        .bind(deal.max_value)
        .bind(deal.stage.as_str())
        .bind(&deal.closer_id)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create deal: {}", e)))?;

        Ok(created.into())
    }

    pub async fn get_deal(&self, id: &str) -> Result<Deal> {
        let deal = sqlx::query_as::<_, DealEntity>("SELECT * FROM deals WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch deal: {}", e)))?;

        match deal {
            Some(deal) => Ok(deal.into()),
            None => Err(AppError::NotFound(format!("Deal not found: {}", id))),
        }
    }

    pub async fn list_deals(&self, limit: Option<i64>) -> Result<Vec<Deal>> {
        let deals = sqlx::query_as::<_, DealEntity>(
            "SELECT * FROM deals ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list deals: {}", e)))?;

        Ok(deals.into_iter().map(Into::into).collect())
    }

    pub async fn update_deal(&self, id: &str, input: &DealInput) -> Result<Deal> {
        let deal = sqlx::query_as::<_, DealEntity>(
            "UPDATE deals SET client_id = ?, lead_id = ?, name = ?, value = ?, min_value = ?, max_value = ?, \
             stage = COALESCE(?, stage), closer_id = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(&input.client_id)
        .bind(&input.lead_id)
        .bind(input.name.trim())
        .bind(input.value)
        .bind(input.min_value)
        .bind(input.max_value)
        .bind(input.stage.map(|s| s.as_str()))
        .bind(&input.closer_id)
        .bind(now_timestamp())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update deal: {}", e)))?;

        match deal {
            Some(deal) => Ok(deal.into()),
            None => Err(AppError::NotFound(format!("Deal not found: {}", id))),
        }
    }

    pub async fn update_deal_stage(&self, id: &str, stage: DealStage) -> Result<Deal> {
        let deal = sqlx::query_as::<_, DealEntity>(
            "UPDATE deals SET stage = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(stage.as_str())
        .bind(now_timestamp())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update deal stage: {}", e)))?;

        match deal {
            Some(deal) => Ok(deal.into()),
            None => Err(AppError::NotFound(format!("Deal not found: {}", id))),
        }
    }

    pub async fn delete_deal(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM deals WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete deal: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Deal not found: {}", id)));
        }
        Ok(())
    }

    /// Σ value over `closed_won` deals, and how many there are.
    pub async fn closed_won_totals(&self) -> Result<(f64, i64)> {
        let row: (Option<f64>, i64) = sqlx::query_as(
            "SELECT SUM(value), COUNT(*) FROM deals WHERE stage = 'closed_won'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to total won deals: {}", e)))?;

        Ok((row.0.unwrap_or(0.0), row.1))
    }
}
