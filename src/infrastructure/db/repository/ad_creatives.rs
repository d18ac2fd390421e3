use crate::domain::error::{AppError, Result};
use crate::domain::records::{AdCreative, AdCreativeInput, DEFAULT_CREATIVE_PLATFORM};
use crate::domain::{new_id, now_timestamp};

use super::entities::AdCreativeEntity;
use super::CrmRepository;

fn encode_urls(urls: &[String]) -> Result<String> {
    serde_json::to_string(urls)
        .map_err(|e| AppError::Internal(format!("Failed to encode media URLs: {}", e)))
}

impl CrmRepository {
    pub async fn create_ad_creative(
        &self,
        project_id: &str,
        input: &AdCreativeInput,
    ) -> Result<AdCreative> {
        let creative = sqlx::query_as::<_, AdCreativeEntity>(
            "INSERT INTO ad_creatives (id, project_id, name, platform, primary_text, headline, cta, \
             image_urls, video_urls, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(new_id())
        .bind(project_id)
        .bind(input.name.trim())
        .bind(input.platform.as_deref().unwrap_or(DEFAULT_CREATIVE_PLATFORM))
        .bind(&input.primary_text)
        .bind(&input.headline)
        .bind(&input.cta)
        .bind(encode_urls(&input.image_urls)?)
        .bind(encode_urls(&input.video_urls)?)
        .bind(now_timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create ad creative: {}", e)))?;

        Ok(creative.into())
    }

    pub async fn list_project_creatives(&self, project_id: &str) -> Result<Vec<AdCreative>> {
        let creatives = sqlx::query_as::<_, AdCreativeEntity>(
            "SELECT * FROM ad_creatives WHERE project_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list ad creatives: {}", e)))?;

        Ok(creatives.into_iter().map(Into::into).collect())
    }

    /// Every project's creatives, newest first, with the project name.
    pub async fn list_ad_creatives(&self) -> Result<Vec<AdCreative>> {
        let creatives = sqlx::query_as::<_, AdCreativeEntity>(
            "SELECT c.*, p.name AS project_name FROM ad_creatives c \
             LEFT JOIN projects p ON p.id = c.project_id \
             ORDER BY c.created_at DESC, c.rowid DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list ad creatives: {}", e)))?;

        Ok(creatives.into_iter().map(Into::into).collect())
    }

    pub async fn update_ad_creative(&self, id: &str, input: &AdCreativeInput) -> Result<AdCreative> {
        let creative = sqlx::query_as::<_, AdCreativeEntity>(
            "UPDATE ad_creatives SET name = ?, platform = COALESCE(?, platform), primary_text = ?, \
             headline = ?, cta = ?, image_urls = ?, video_urls = ? WHERE id = ? RETURNING *",
        )
        .bind(input.name.trim())
        .bind(&input.platform)
        .bind(&input.primary_text)
        .bind(&input.headline)
        .bind(&input.cta)
        .bind(encode_urls(&input.image_urls)?)
        .bind(encode_urls(&input.video_urls)?)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update ad creative: {}", e)))?;

        match creative {
            Some(creative) => Ok(creative.into()),
            None => Err(AppError::NotFound(format!("Ad creative not found: {}", id))),
        }
    }

    pub async fn delete_ad_creative(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM ad_creatives WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete ad creative: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Ad creative not found: {}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::ProjectInput;

    fn creative(name: &str) -> AdCreativeInput {
        AdCreativeInput {
            name: name.to_string(),
            platform: None,
            primary_text: Some("Fresh bread daily".to_string()),
            headline: Some("Bakery near you".to_string()),
            cta: Some("Order now".to_string()),
            image_urls: vec!["https://cdn.test/a.png".to_string()],
            video_urls: Vec::new(),
        }
    }

    async fn project(repo: &CrmRepository) -> String {
        repo.create_project(&ProjectInput {
            client_id: "client-1".to_string(),
            name: "Bakery launch".to_string(),
            status: None,
            project_type: None,
            progress: None,
            owner_id: None,
            update_text: None,
        })
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn creatives_keep_media_and_default_platform() {
        let repo = CrmRepository::in_memory().await.unwrap();
        let project_id = project(&repo).await;

        let created = repo.create_ad_creative(&project_id, &creative("Spring")).await.unwrap();
        assert_eq!(created.platform, "meta");
        assert_eq!(created.image_urls, vec!["https://cdn.test/a.png"]);
        assert!(created.project_name.is_none());

        let mut edit = creative("Spring v2");
        edit.video_urls = vec!["https://cdn.test/b.mp4".to_string()];
        let updated = repo.update_ad_creative(&created.id, &edit).await.unwrap();
        assert_eq!(updated.name, "Spring v2");
        assert_eq!(updated.video_urls.len(), 1);

        let library = repo.list_ad_creatives().await.unwrap();
        assert_eq!(library[0].project_name.as_deref(), Some("Bakery launch"));
    }

    #[tokio::test]
    async fn project_listing_is_scoped_and_newest_first() {
        let repo = CrmRepository::in_memory().await.unwrap();
        let project_id = project(&repo).await;
        let other = project(&repo).await;
        repo.create_ad_creative(&project_id, &creative("First")).await.unwrap();
        repo.create_ad_creative(&project_id, &creative("Second")).await.unwrap();
        repo.create_ad_creative(&other, &creative("Elsewhere")).await.unwrap();

        let names: Vec<String> = repo
            .list_project_creatives(&project_id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Second", "First"]);

        assert!(matches!(
            repo.delete_ad_creative("missing").await,
            Err(AppError::NotFound(_))
        ));
    }
}
