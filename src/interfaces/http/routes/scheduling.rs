use crate::domain::error::AppError;
use crate::domain::role::Area;
use crate::domain::scheduling::BookingRequest;
use crate::interfaces::http::auth::CurrentUser;
use crate::interfaces::http::AppState;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{get, post, web, HttpRequest, HttpResponse};

#[post("/calendly/create-event")]
async fn create_event(
    data: web::Data<AppState>,
    user: CurrentUser,
    req: web::Json<BookingRequest>,
) -> Result<HttpResponse, AppError> {
    user.require(Area::Meetings)?;
    Ok(HttpResponse::Ok().json(data.scheduling.booking_link(&req).await?))
}

#[get("/calendly/events")]
async fn upcoming_events(data: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    user.require(Area::Meetings)?;
    Ok(HttpResponse::Ok().json(data.scheduling.upcoming_events().await?))
}

/// Cron entry point. Authenticated by the cron secret, not a user token.
#[get("/calendly/refresh")]
async fn refresh(data: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, AppError> {
    let authorization = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    data.scheduling.authorize_cron(authorization)?;

    let summary = data.scheduling.refresh().await?;
    data.log("INFO", "Calendly", &summary.message);
    Ok(HttpResponse::Ok().json(summary))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_event)
        .service(upcoming_events)
        .service(refresh);
}

#[cfg(test)]
mod tests {
    use crate::application::use_cases::scheduling::tests::FakeScheduler;
    use crate::domain::role::UserRole;
    use crate::infrastructure::bootstrap::Integrations;
    use crate::infrastructure::config::Settings;
    use crate::interfaces::http::test_support::{init_app, TestApp};
    use actix_web::http::StatusCode;
    use actix_web::test::{call_and_read_body_json, call_service, read_body_json, TestRequest};
    use serde_json::{json, Value};
    use std::sync::Arc;

    async fn scheduled_app(cron_secret: Option<&str>) -> TestApp {
        let mut settings = Settings::default();
        settings.cron.secret = cron_secret.map(str::to_string);
        let integrations = Integrations {
            scheduler: Some(Arc::new(FakeScheduler::with_default_type())),
            ..Integrations::offline()
        };
        TestApp::with_integrations(integrations, settings).await
    }

    #[actix_web::test]
    async fn booking_link_is_prefilled() {
        let app = scheduled_app(None).await;
        let (_, closer) = app.user(UserRole::Closer).await;
        let service = init_app!(app);

        let req = TestRequest::post()
            .uri("/api/calendly/create-event")
            .insert_header(("Authorization", closer))
            .set_json(json!({
                "invitee_name": "Jo Baker",
                "invitee_email": "jo@bakery.test",
                "start_time": "2026-11-02T10:30:00Z"
            }))
            .to_request();
        let link: Value = call_and_read_body_json(&service, req).await;
        let url = link["booking_link"].as_str().unwrap();
        assert!(url.starts_with("https://calendly.com/agency/intro?"));
        assert!(url.contains("email=jo%40bakery.test"));
    }

    #[actix_web::test]
    async fn missing_calendly_token_is_bad_request() {
        let app = TestApp::new().await;
        let (_, owner) = app.user(UserRole::Owner).await;
        let service = init_app!(app);

        let req = TestRequest::get()
            .uri("/api/calendly/events")
            .insert_header(("Authorization", owner))
            .to_request();
        let resp = call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["error"], "Calendly API token not configured");
    }

    #[actix_web::test]
    async fn refresh_checks_cron_secret() {
        let app = scheduled_app(Some("s3cret")).await;
        let service = init_app!(app);

        let req = TestRequest::get().uri("/api/calendly/refresh").to_request();
        assert_eq!(call_service(&service, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = TestRequest::get()
            .uri("/api/calendly/refresh")
            .insert_header(("Authorization", "Bearer s3cret"))
            .to_request();
        let summary: Value = call_and_read_body_json(&service, req).await;
        assert_eq!(summary["ok"], true);
    }
}
