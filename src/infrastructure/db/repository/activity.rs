use crate::domain::activity::{ActivityAction, ActivityEntry};
use crate::domain::error::{AppError, Result};
use crate::domain::{new_id, now_timestamp};

use super::entities::ActivityEntity;
use super::CrmRepository;

impl CrmRepository {
    pub async fn log_activity(
        &self,
        actor_id: Option<&str>,
        entity_type: &str,
        entity_id: &str,
        action: ActivityAction,
        details: serde_json::Value,
    ) -> Result<ActivityEntry> {
        let entry = sqlx::query_as::<_, ActivityEntity>(
            "INSERT INTO activity_log (id, actor_id, entity_type, entity_id, action, details, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(new_id())
        .bind(actor_id)
        .bind(entity_type)
        .bind(entity_id)
        .bind(action.as_str())
        .bind(details.to_string())
        .bind(now_timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to write activity log: {}", e)))?;

        Ok(entry.into())
    }

    pub async fn recent_activity(&self, limit: i64) -> Result<Vec<ActivityEntry>> {
        let entries = sqlx::query_as::<_, ActivityEntity>(
            "SELECT * FROM activity_log ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to read activity log: {}", e)))?;

        Ok(entries.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn newest_activity_comes_first() {
        let repo = CrmRepository::in_memory().await.unwrap();
        repo.log_activity(Some("u1"), "client", "c1", ActivityAction::Created, json!({}))
            .await
            .unwrap();
        repo.log_activity(
            Some("u1"),
            "deal",
            "d1",
            ActivityAction::StatusChanged,
            json!({"old_stage": "proposal", "new_stage": "closed_won"}),
        )
        .await
        .unwrap();

        let entries = repo.recent_activity(500).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].entity_type, "deal");
        assert_eq!(entries[0].details["new_stage"], "closed_won");
        assert_eq!(repo.recent_activity(1).await.unwrap().len(), 1);
    }
}
