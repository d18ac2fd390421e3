use crate::domain::error::AppError;
use crate::domain::role::{nav_items_for_role, Area, UserRole};
use crate::interfaces::http::auth::CurrentUser;
use crate::interfaces::http::AppState;
use actix_web::{get, post, put, web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct SignupRequest {
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoleChange {
    pub role: UserRole,
}

#[post("/auth/signup")]
async fn signup(
    data: web::Data<AppState>,
    req: Option<web::Json<SignupRequest>>,
) -> Result<HttpResponse, AppError> {
    let display_name = req.and_then(|r| r.into_inner().display_name);
    let result = data.auth.signup(display_name).await?;
    data.log("INFO", "Auth", &format!("New profile {} signed up", result.profile.id));
    Ok(HttpResponse::Created().json(result))
}

#[get("/me")]
async fn me(user: CurrentUser) -> HttpResponse {
    HttpResponse::Ok().json(user.profile())
}

#[get("/me/nav")]
async fn my_nav(user: CurrentUser) -> HttpResponse {
    HttpResponse::Ok().json(nav_items_for_role(user.profile().role))
}

#[get("/team")]
async fn team(data: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    user.require(Area::Team)?;
    Ok(HttpResponse::Ok().json(data.auth.team().await?))
}

#[put("/team/{id}/role")]
async fn change_role(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
    req: web::Json<RoleChange>,
) -> Result<HttpResponse, AppError> {
    let actor = user.require_role(&[UserRole::Owner])?;
    let profile = data.auth.change_role(actor, &path, req.role).await?;
    data.log(
        "INFO",
        "Team",
        &format!("Role of {} changed to {}", profile.id, profile.role),
    );
    Ok(HttpResponse::Ok().json(profile))
}

#[get("/settings")]
async fn settings(data: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    user.require(Area::Settings)?;
    Ok(HttpResponse::Ok().json(&data.integrations))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(signup)
        .service(me)
        .service(my_nav)
        .service(team)
        .service(change_role)
        .service(settings);
}

#[cfg(test)]
mod tests {
    use crate::domain::profile::Profile;
    use crate::domain::role::UserRole;
    use crate::interfaces::http::test_support::{init_app, TestApp};
    use actix_web::http::StatusCode;
    use actix_web::test::{call_and_read_body_json, call_service, TestRequest};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn signup_token_authenticates() {
        let app = TestApp::new().await;
        let service = init_app!(app);

        let req = TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(json!({"display_name": "Riley"}))
            .to_request();
        let body: Value = call_and_read_body_json(&service, req).await;
        assert_eq!(body["profile"]["role"], "pending");
        let token = body["token"].as_str().unwrap().to_string();

        let req = TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let me: Profile = call_and_read_body_json(&service, req).await;
        assert_eq!(me.display_name.as_deref(), Some("Riley"));

        let req = TestRequest::get()
            .uri("/api/me/nav")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let nav: Value = call_and_read_body_json(&service, req).await;
        assert_eq!(nav.as_array().unwrap().len(), 1);
        assert_eq!(nav[0]["href"], "/dashboard");
    }

    #[actix_web::test]
    async fn only_owner_changes_roles() {
        let app = TestApp::new().await;
        let (_, owner) = app.user(UserRole::Owner).await;
        let (_, demo) = app.user(UserRole::Demo).await;
        let (pending, _) = app.user(UserRole::Pending).await;
        let service = init_app!(app);

        let req = TestRequest::put()
            .uri(&format!("/api/team/{}/role", pending.id))
            .insert_header(("Authorization", demo))
            .set_json(json!({"role": "closer"}))
            .to_request();
        assert_eq!(call_service(&service, req).await.status(), StatusCode::FORBIDDEN);

        let req = TestRequest::put()
            .uri(&format!("/api/team/{}/role", pending.id))
            .insert_header(("Authorization", owner))
            .set_json(json!({"role": "closer"}))
            .to_request();
        let updated: Profile = call_and_read_body_json(&service, req).await;
        assert_eq!(updated.role, UserRole::Closer);
    }

    #[actix_web::test]
    async fn settings_report_missing_integrations() {
        let app = TestApp::new().await;
        let (_, owner) = app.user(UserRole::Owner).await;
        let service = init_app!(app);

        let req = TestRequest::get()
            .uri("/api/settings")
            .insert_header(("Authorization", owner))
            .to_request();
        let body: Value = call_and_read_body_json(&service, req).await;
        assert_eq!(body["stripe"], false);
        assert_eq!(body["calendly"], false);
    }
}
