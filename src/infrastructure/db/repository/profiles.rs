use crate::domain::error::{AppError, Result};
use crate::domain::profile::Profile;
use crate::domain::role::UserRole;
use crate::domain::{new_id, now_timestamp};

use super::entities::ProfileEntity;
use super::CrmRepository;

const PROFILE_COLUMNS: &str = "id, role, display_name, avatar_url, created_at, updated_at";

impl CrmRepository {
    pub async fn create_profile(
        &self,
        display_name: Option<&str>,
        role: UserRole,
        token_hash: &str,
    ) -> Result<Profile> {
        let now = now_timestamp();
        let profile = sqlx::query_as::<_, ProfileEntity>(&format!(
            "INSERT INTO profiles (id, role, display_name, token_hash, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(new_id())
        .bind(role.as_str())
        .bind(display_name)
        .bind(token_hash)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create profile: {}", e)))?;

        Ok(profile.into())
    }

    pub async fn find_profile_by_token_hash(&self, token_hash: &str) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, ProfileEntity>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE token_hash = ?"
        ))
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to look up profile: {}", e)))?;

        Ok(profile.map(Into::into))
    }

    pub async fn list_profiles(&self) -> Result<Vec<Profile>> {
        let profiles = sqlx::query_as::<_, ProfileEntity>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list profiles: {}", e)))?;

        Ok(profiles.into_iter().map(Into::into).collect())
    }

    pub async fn update_profile_role(&self, id: &str, role: UserRole) -> Result<Profile> {
        let profile = sqlx::query_as::<_, ProfileEntity>(&format!(
            "UPDATE profiles SET role = ?, updated_at = ? WHERE id = ? RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(role.as_str())
        .bind(now_timestamp())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update profile role: {}", e)))?;

        match profile {
            Some(profile) => Ok(profile.into()),
            None => Err(AppError::NotFound(format!("Profile not found: {}", id))),
        }
    }
}
