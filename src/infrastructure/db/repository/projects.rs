use crate::domain::error::{AppError, Result};
use crate::domain::records::{Project, ProjectInput, ProjectUpdate};
use crate::domain::{new_id, now_timestamp};

use super::entities::ProjectEntity;
use super::CrmRepository;

impl CrmRepository {
    pub async fn create_project(&self, input: &ProjectInput) -> Result<Project> {
        let now = now_timestamp();
        let updates = match non_blank(&input.update_text) {
            Some(text) => vec![ProjectUpdate { text, at: now.clone() }],
            None => Vec::new(),
        };
        let updates_json = serde_json::to_string(&updates)
            .map_err(|e| AppError::Internal(format!("Failed to encode project updates: {}", e)))?;

        let project = sqlx::query_as::<_, ProjectEntity>(
            "INSERT INTO projects (id, client_id, name, status, project_type, progress, owner_id, updates, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(new_id())
        .bind(&input.client_id)
        .bind(input.name.trim())
        .bind(input.status.as_deref().unwrap_or("active"))
        .bind(input.project_type.as_deref().unwrap_or("website"))
        .bind(input.progress.unwrap_or(0))
        .bind(&input.owner_id)
        .bind(updates_json)
        .bind(&now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create project: {}", e)))?;

        Ok(project.into())
    }

    pub async fn get_project(&self, id: &str) -> Result<Project> {
        let project = sqlx::query_as::<_, ProjectEntity>("SELECT * FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch project: {}", e)))?;

        match project {
            Some(project) => Ok(project.into()),
            None => Err(AppError::NotFound(format!("Project not found: {}", id))),
        }
    }

    pub async fn list_projects(&self, limit: Option<i64>) -> Result<Vec<Project>> {
        let projects = sqlx::query_as::<_, ProjectEntity>(
            "SELECT * FROM projects ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list projects: {}", e)))?;

        Ok(projects.into_iter().map(Into::into).collect())
    }

    /// Overwrites the editable fields. A non-blank `update_text` is appended
    /// to the update history inside the same statement, so concurrent edits
    /// never drop an entry.
    pub async fn update_project(&self, id: &str, input: &ProjectInput) -> Result<Project> {
        let entry = non_blank(&input.update_text)
            .map(|text| {
                serde_json::to_string(&ProjectUpdate {
                    text,
                    at: now_timestamp(),
                })
            })
            .transpose()
            .map_err(|e| AppError::Internal(format!("Failed to encode project update: {}", e)))?;

        let project = sqlx::query_as::<_, ProjectEntity>(
            "UPDATE projects SET client_id = ?, name = ?, status = COALESCE(?, status), \
             project_type = COALESCE(?, project_type), progress = COALESCE(?, progress), \
             owner_id = COALESCE(?, owner_id), \
             updates = CASE WHEN ? IS NULL THEN updates ELSE json_insert(updates, '$[#]', json(?)) END \
             WHERE id = ? RETURNING *",
        )
        .bind(&input.client_id)
        .bind(input.name.trim())
        .bind(&input.status)
        .bind(&input.project_type)
        .bind(input.progress)
        .bind(&input.owner_id)
        .bind(&entry)
        .bind(&entry)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update project: {}", e)))?;

        match project {
            Some(project) => Ok(project.into()),
            None => Err(AppError::NotFound(format!("Project not found: {}", id))),
        }
    }

    /// Deletes the project together with its ad creatives.
    pub async fn delete_project(&self, id: &str) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {}", e)))?;

        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete project: {}", e)))?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Project not found: {}", id)));
        }

        sqlx::query("DELETE FROM ad_creatives WHERE project_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete ad creatives: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit project delete: {}", e)))?;
        Ok(())
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
