use crate::domain::error::AppError;
use crate::domain::profile::Profile;
use crate::domain::role::{Area, UserRole};
use crate::infrastructure::security::bearer_token;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;

use super::AppState;

/// The caller behind `Authorization: Bearer <token>`.
pub struct CurrentUser(pub Profile);

impl CurrentUser {
    pub fn profile(&self) -> &Profile {
        &self.0
    }

    /// Passes when the caller's role may open `area`.
    pub fn require(&self, area: Area) -> Result<&Profile, AppError> {
        if area.allows(self.0.role) {
            Ok(&self.0)
        } else {
            Err(AppError::Forbidden(format!(
                "Role {} cannot access {}",
                self.0.role,
                area.label()
            )))
        }
    }

    pub fn require_role(&self, roles: &[UserRole]) -> Result<&Profile, AppError> {
        if roles.contains(&self.0.role) {
            Ok(&self.0)
        } else {
            Err(AppError::Forbidden("Forbidden".to_string()))
        }
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Box::pin(async move {
            let state =
                state.ok_or_else(|| AppError::Internal("Application state missing".to_string()))?;
            let token = header
                .as_deref()
                .and_then(bearer_token)
                .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;
            state.auth.authenticate(token).await.map(CurrentUser)
        })
    }
}
