use crate::domain::error::{AppError, Result};
use crate::domain::insight::{AiInsight, InsightPayload};
use crate::domain::now_timestamp;

use super::entities::AiInsightEntity;
use super::CrmRepository;

impl CrmRepository {
    /// One insight per day. Regenerating on the same date replaces it.
    pub async fn upsert_insight(&self, date: &str, payload: &InsightPayload) -> Result<AiInsight> {
        let items = serde_json::to_string(&payload.actionable_items)
            .map_err(|e| AppError::Internal(format!("Failed to encode actionable items: {}", e)))?;

        let insight = sqlx::query_as::<_, AiInsightEntity>(
            "INSERT INTO ai_insights (date, summary, actionable_items, created_at) VALUES (?, ?, ?, ?) \
             ON CONFLICT(date) DO UPDATE SET summary = excluded.summary, \
               actionable_items = excluded.actionable_items, created_at = excluded.created_at \
             RETURNING *",
        )
        .bind(date)
        .bind(&payload.summary)
        .bind(items)
        .bind(now_timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to save insight: {}", e)))?;

        Ok(insight.into())
    }

    pub async fn list_insights(&self, limit: i64) -> Result<Vec<AiInsight>> {
        let insights = sqlx::query_as::<_, AiInsightEntity>(
            "SELECT * FROM ai_insights ORDER BY date DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list insights: {}", e)))?;

        Ok(insights.into_iter().map(Into::into).collect())
    }
}
