use crate::domain::error::AppError;
use crate::domain::records::ClientAdInput;
use crate::domain::role::{Area, UserRole};
use crate::interfaces::http::auth::CurrentUser;
use crate::interfaces::http::AppState;
use actix_web::{delete, get, post, put, web, HttpResponse};

use super::ok;

const SYNC_ROLES: [UserRole; 2] = [UserRole::Owner, UserRole::MediaBuyer];

#[get("/ads")]
async fn list_client_ads(data: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    user.require(Area::Ads)?;
    Ok(HttpResponse::Ok().json(data.records.list_client_ads().await?))
}

#[post("/ads")]
async fn create_client_ad(
    data: web::Data<AppState>,
    user: CurrentUser,
    req: web::Json<ClientAdInput>,
) -> Result<HttpResponse, AppError> {
    let actor = user.require(Area::Ads)?;
    let ad = data.records.create_client_ad(actor, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(ad))
}

#[get("/ads/agency")]
async fn agency_ads(data: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    user.require(Area::Ads)?;
    Ok(HttpResponse::Ok().json(data.ads.agency_ads().await?))
}

/// Creatives from every project, for launching campaigns.
#[get("/ads/creatives")]
async fn creatives_library(data: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    user.require(Area::Ads)?;
    Ok(HttpResponse::Ok().json(data.records.list_ad_creatives().await?))
}

#[get("/ads/facebook-leads")]
async fn facebook_leads(data: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    user.require(Area::Ads)?;
    Ok(HttpResponse::Ok().json(data.ads.facebook_leads().await?))
}

#[post("/ads/sync")]
async fn sync_all_accounts(data: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    user.require_role(&SYNC_ROLES)?;
    match data.ads.sync_all_accounts().await {
        Ok(result) => {
            data.log("INFO", "Ads", &result.message);
            Ok(HttpResponse::Ok().json(result))
        }
        Err(e) => {
            data.log("ERROR", "Ads", &e.message());
            Err(e)
        }
    }
}

#[post("/meta/sync-ads")]
async fn sync_recent_campaigns(
    data: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    user.require_role(&SYNC_ROLES)?;
    let report = data.ads.sync_recent_campaigns().await?;
    data.log(
        if report.errors > 0 { "WARN" } else { "INFO" },
        "Ads",
        &format!(
            "Campaign sync: {} synced, {} skipped, {} failed",
            report.synced, report.skipped, report.errors
        ),
    );
    Ok(HttpResponse::Ok().json(report))
}

#[put("/ads/{id}")]
async fn update_client_ad(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
    req: web::Json<ClientAdInput>,
) -> Result<HttpResponse, AppError> {
    user.require(Area::Ads)?;
    Ok(HttpResponse::Ok().json(data.records.update_client_ad(&path, req.into_inner()).await?))
}

#[delete("/ads/{id}")]
async fn delete_client_ad(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let actor = user.require(Area::Ads)?;
    data.records.delete_client_ad(actor, &path).await?;
    Ok(ok())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_client_ads)
        .service(create_client_ad)
        .service(agency_ads)
        .service(creatives_library)
        .service(facebook_leads)
        .service(sync_all_accounts)
        .service(sync_recent_campaigns)
        .service(update_client_ad)
        .service(delete_client_ad);
}

#[cfg(test)]
mod tests {
    use crate::application::use_cases::ads_sync::tests::FakeAdsPlatform;
    use crate::domain::role::UserRole;
    use crate::infrastructure::bootstrap::Integrations;
    use crate::infrastructure::config::Settings;
    use crate::interfaces::http::test_support::{init_app, TestApp};
    use actix_web::http::StatusCode;
    use actix_web::test::{call_and_read_body_json, call_service, read_body_json, TestRequest};
    use serde_json::{json, Value};
    use std::sync::Arc;

    #[actix_web::test]
    async fn sync_without_token_is_bad_request() {
        let app = TestApp::new().await;
        let (_, buyer) = app.user(UserRole::MediaBuyer).await;
        let service = init_app!(app);

        let req = TestRequest::post()
            .uri("/api/ads/sync")
            .insert_header(("Authorization", buyer))
            .to_request();
        let resp = call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(resp).await;
        assert_eq!(
            body["error"],
            "Meta Ads not configured. Set CRM_META__ACCESS_TOKEN in the environment."
        );
    }

    #[actix_web::test]
    async fn sync_replaces_agency_rows() {
        let mut settings = Settings::default();
        settings.meta.access_token = Some("token".to_string());
        let integrations = Integrations {
            ads: Arc::new(FakeAdsPlatform::default()),
            ..Integrations::offline()
        };
        let app = TestApp::with_integrations(integrations, settings).await;
        let (_, owner) = app.user(UserRole::Owner).await;
        let service = init_app!(app);

        let req = TestRequest::post()
            .uri("/api/ads/sync")
            .insert_header(("Authorization", owner.clone()))
            .to_request();
        let result: Value = call_and_read_body_json(&service, req).await;
        assert_eq!(result["ok"], true);
        let synced = result["synced"].as_u64().unwrap();
        assert!(synced > 0);

        let req = TestRequest::get()
            .uri("/api/ads/agency")
            .insert_header(("Authorization", owner))
            .to_request();
        let ads: Value = call_and_read_body_json(&service, req).await;
        assert_eq!(ads.as_array().unwrap().len() as u64, synced);
    }

    #[actix_web::test]
    async fn campaign_sync_needs_graph_token() {
        let app = TestApp::new().await;
        let (_, owner) = app.user(UserRole::Owner).await;
        let service = init_app!(app);

        let req = TestRequest::post()
            .uri("/api/meta/sync-ads")
            .insert_header(("Authorization", owner))
            .to_request();
        let resp = call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["error"], "FACEBOOK_GRAPH_ACCESS_TOKEN not configured");
    }

    #[actix_web::test]
    async fn creatives_flow_from_project_to_library() {
        let app = TestApp::new().await;
        let (_, owner) = app.user(UserRole::Owner).await;
        let (_, buyer) = app.user(UserRole::MediaBuyer).await;
        let (_, manager) = app.user(UserRole::AccountManager).await;
        let service = init_app!(app);

        let req = TestRequest::post()
            .uri("/api/projects")
            .insert_header(("Authorization", owner.clone()))
            .set_json(json!({"client_id": "client-1", "name": "Bakery launch"}))
            .to_request();
        let project: Value = call_and_read_body_json(&service, req).await;
        let project_id = project["id"].as_str().unwrap().to_string();

        let req = TestRequest::post()
            .uri(&format!("/api/projects/{}/creatives", project_id))
            .insert_header(("Authorization", buyer.clone()))
            .set_json(json!({
                "name": "Spring",
                "headline": "Fresh bread daily",
                "image_urls": ["https://cdn.test/bread.png"]
            }))
            .to_request();
        let resp = call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let creative: Value = read_body_json(resp).await;
        assert_eq!(creative["platform"], "meta");

        let req = TestRequest::get()
            .uri("/api/ads/creatives")
            .insert_header(("Authorization", buyer))
            .to_request();
        let library: Value = call_and_read_body_json(&service, req).await;
        assert_eq!(library[0]["project_name"], "Bakery launch");
        assert_eq!(library[0]["image_urls"][0], "https://cdn.test/bread.png");

        let req = TestRequest::delete()
            .uri(&format!("/api/creatives/{}", creative["id"].as_str().unwrap()))
            .insert_header(("Authorization", manager))
            .to_request();
        assert_eq!(call_service(&service, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn closer_cannot_sync() {
        let app = TestApp::new().await;
        let (_, closer) = app.user(UserRole::Closer).await;
        let service = init_app!(app);

        let req = TestRequest::post()
            .uri("/api/ads/sync")
            .insert_header(("Authorization", closer))
            .to_request();
        assert_eq!(call_service(&service, req).await.status(), StatusCode::FORBIDDEN);
    }
}
