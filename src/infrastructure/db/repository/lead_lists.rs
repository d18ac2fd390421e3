use crate::domain::error::{AppError, Result};
use crate::domain::lead::{LeadColumnMap, LeadList, LeadListInput};
use crate::domain::{new_id, now_timestamp};

use super::entities::LeadListEntity;
use super::CrmRepository;

impl CrmRepository {
    pub async fn create_lead_list(&self, input: &LeadListInput) -> Result<LeadList> {
        let callers = serde_json::to_string(&input.assigned_cold_callers)
            .map_err(|e| AppError::Internal(format!("Failed to encode cold callers: {}", e)))?;

        let list = sqlx::query_as::<_, LeadListEntity>(
            "INSERT INTO lead_lists (id, name, niche, total_count, assigned_cold_callers, created_at) \
             VALUES (?, ?, ?, 0, ?, ?) RETURNING *",
        )
        .bind(new_id())
        .bind(input.name.trim())
        .bind(&input.niche)
        .bind(callers)
        .bind(now_timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create lead list: {}", e)))?;

        Ok(list.into())
    }

    pub async fn get_lead_list(&self, id: &str) -> Result<LeadList> {
        let list = sqlx::query_as::<_, LeadListEntity>("SELECT * FROM lead_lists WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch lead list: {}", e)))?;

        match list {
            Some(list) => Ok(list.into()),
            None => Err(AppError::NotFound(format!("Lead list not found: {}", id))),
        }
    }

    pub async fn list_lead_lists(&self) -> Result<Vec<LeadList>> {
        let lists = sqlx::query_as::<_, LeadListEntity>(
            "SELECT * FROM lead_lists ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list lead lists: {}", e)))?;

        Ok(lists.into_iter().map(Into::into).collect())
    }

    pub async fn update_lead_list(&self, id: &str, input: &LeadListInput) -> Result<LeadList> {
        let callers = serde_json::to_string(&input.assigned_cold_callers)
            .map_err(|e| AppError::Internal(format!("Failed to encode cold callers: {}", e)))?;

        let list = sqlx::query_as::<_, LeadListEntity>(
            "UPDATE lead_lists SET name = ?, niche = ?, assigned_cold_callers = ? WHERE id = ? RETURNING *",
        )
        .bind(input.name.trim())
        .bind(&input.niche)
        .bind(callers)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update lead list: {}", e)))?;

        match list {
            Some(list) => Ok(list.into()),
            None => Err(AppError::NotFound(format!("Lead list not found: {}", id))),
        }
    }

    pub async fn delete_lead_list(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM lead_lists WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete lead list: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Lead list not found: {}", id)));
        }
        Ok(())
    }

    /// Grows `total_count` by `added` and, when given, records the CSV mapping used.
    pub async fn record_list_import(
        &self,
        id: &str,
        added: u64,
        column_map: Option<&LeadColumnMap>,
    ) -> Result<()> {
        let map_json = column_map
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| AppError::Internal(format!("Failed to encode column map: {}", e)))?;

        sqlx::query(
            "UPDATE lead_lists SET total_count = total_count + ?, \
             csv_column_map = COALESCE(?, csv_column_map) WHERE id = ?",
        )
        .bind(added as i64)
        .bind(map_json)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update lead list totals: {}", e)))?;

        Ok(())
    }
}
