use crate::domain::calling::{CallLog, CallOutcome};
use crate::domain::error::{AppError, Result};
use crate::domain::{new_id, now_timestamp};

use super::entities::CallLogEntity;
use super::CrmRepository;

impl CrmRepository {
    pub async fn create_call_log(
        &self,
        lead_id: &str,
        cold_caller_id: &str,
        outcome: CallOutcome,
    ) -> Result<CallLog> {
        let log = sqlx::query_as::<_, CallLogEntity>(
            "INSERT INTO call_logs (id, lead_id, cold_caller_id, outcome, created_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(new_id())
        .bind(lead_id)
        .bind(cold_caller_id)
        .bind(outcome.as_str())
        .bind(now_timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to log call: {}", e)))?;

        Ok(log.into())
    }

    pub async fn list_call_logs(&self, limit: Option<i64>) -> Result<Vec<CallLog>> {
        let logs = sqlx::query_as::<_, CallLogEntity>(
            "SELECT * FROM call_logs ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list call logs: {}", e)))?;

        Ok(logs.into_iter().map(Into::into).collect())
    }
}
