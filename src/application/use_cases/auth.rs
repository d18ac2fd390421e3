use crate::domain::error::{AppError, Result};
use crate::domain::profile::Profile;
use crate::domain::role::UserRole;
use crate::infrastructure::db::CrmRepository;
use crate::infrastructure::security::{generate_token, hash_token};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct SignupResult {
    pub profile: Profile,
    /// Plain token. Only its hash is stored, so this is the one chance to read it.
    pub token: String,
}

pub struct AuthUseCase {
    repository: Arc<CrmRepository>,
}

impl AuthUseCase {
    pub fn new(repository: Arc<CrmRepository>) -> Self {
        Self { repository }
    }

    pub async fn signup(&self, display_name: Option<String>) -> Result<SignupResult> {
        let display_name = display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        let token = generate_token();
        let profile = self
            .repository
            .create_profile(display_name.as_deref(), UserRole::Pending, &hash_token(&token))
            .await?;

        tracing::info!(profile_id = %profile.id, "New profile signed up");
        Ok(SignupResult { profile, token })
    }

    pub async fn authenticate(&self, token: &str) -> Result<Profile> {
        self.repository
            .find_profile_by_token_hash(&hash_token(token))
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))
    }

    pub async fn team(&self) -> Result<Vec<Profile>> {
        self.repository.list_profiles().await
    }

    pub async fn change_role(&self, actor: &Profile, profile_id: &str, role: UserRole) -> Result<Profile> {
        if actor.id == profile_id && role != actor.role {
            return Err(AppError::ValidationError(
                "You cannot change your own role".to_string(),
            ));
        }
        let profile = self.repository.update_profile_role(profile_id, role).await?;
        tracing::info!(profile_id, role = %role, actor = %actor.id, "Profile role changed");
        Ok(profile)
    }
}
