use crate::domain::error::{AppError, Result};
use crate::domain::records::{WebAsset, WebAssetInput, WebAssetKind};
use crate::domain::{new_id, now_timestamp};

use super::entities::WebAssetEntity;
use super::CrmRepository;

impl CrmRepository {
    pub async fn create_web_asset(&self, kind: WebAssetKind, input: &WebAssetInput) -> Result<WebAsset> {
        let asset = sqlx::query_as::<_, WebAssetEntity>(&format!(
            "INSERT INTO {} (id, client_id, name, url, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
            kind.table()
        ))
        .bind(new_id())
        .bind(&input.client_id)
        .bind(input.name.trim())
        .bind(&input.url)
        .bind(input.status.as_deref().unwrap_or("active"))
        .bind(now_timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create {}: {}", kind.entity_type(), e)))?;

        Ok(asset.into())
    }

    pub async fn list_web_assets(&self, kind: WebAssetKind) -> Result<Vec<WebAsset>> {
        let assets = sqlx::query_as::<_, WebAssetEntity>(&format!(
            "SELECT * FROM {} ORDER BY created_at DESC, rowid DESC",
            kind.table()
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list {}: {}", kind.table(), e)))?;

        Ok(assets.into_iter().map(Into::into).collect())
    }

    pub async fn update_web_asset(
        &self,
        kind: WebAssetKind,
        id: &str,
        input: &WebAssetInput,
    ) -> Result<WebAsset> {
        let asset = sqlx::query_as::<_, WebAssetEntity>(&format!(
            "UPDATE {} SET client_id = ?, name = ?, url = ?, status = COALESCE(?, status) \
             WHERE id = ? RETURNING *",
            kind.table()
        ))
        .bind(&input.client_id)
        .bind(input.name.trim())
        .bind(&input.url)
        .bind(&input.status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update {}: {}", kind.entity_type(), e)))?;

        match asset {
            Some(asset) => Ok(asset.into()),
            None => Err(AppError::NotFound(format!("{} not found: {}", kind.entity_type(), id))),
        }
    }

    pub async fn delete_web_asset(&self, kind: WebAssetKind, id: &str) -> Result<()> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", kind.table()))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete {}: {}", kind.entity_type(), e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{} not found: {}", kind.entity_type(), id)));
        }
        Ok(())
    }
}
