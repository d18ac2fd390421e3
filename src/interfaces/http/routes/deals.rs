use crate::domain::deal::{DealInput, DealStage};
use crate::domain::error::AppError;
use crate::domain::role::Area;
use crate::interfaces::http::auth::CurrentUser;
use crate::interfaces::http::AppState;
use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;

use super::ok;

#[derive(Debug, Deserialize)]
pub struct StageChange {
    pub stage: DealStage,
}

#[get("/deals")]
async fn list_deals(data: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    user.require(Area::Deals)?;
    Ok(HttpResponse::Ok().json(data.deals.list().await?))
}

#[get("/deals/{id}")]
async fn get_deal(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    user.require(Area::Deals)?;
    Ok(HttpResponse::Ok().json(data.deals.get(&path).await?))
}

#[post("/deals")]
async fn create_deal(
    data: web::Data<AppState>,
    user: CurrentUser,
    req: web::Json<DealInput>,
) -> Result<HttpResponse, AppError> {
    let actor = user.require(Area::Deals)?;
    let deal = data.deals.create(actor, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(deal))
}

#[put("/deals/{id}")]
async fn update_deal(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
    req: web::Json<DealInput>,
) -> Result<HttpResponse, AppError> {
    user.require(Area::Deals)?;
    Ok(HttpResponse::Ok().json(data.deals.update(&path, req.into_inner()).await?))
}

#[put("/deals/{id}/stage")]
async fn change_stage(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
    req: web::Json<StageChange>,
) -> Result<HttpResponse, AppError> {
    let actor = user.require(Area::Deals)?;
    Ok(HttpResponse::Ok().json(data.deals.change_stage(actor, &path, req.stage).await?))
}

#[delete("/deals/{id}")]
async fn delete_deal(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let actor = user.require(Area::Deals)?;
    data.deals.delete(actor, &path).await?;
    Ok(ok())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_deals)
        .service(get_deal)
        .service(create_deal)
        .service(update_deal)
        .service(change_stage)
        .service(delete_deal);
}

#[cfg(test)]
mod tests {
    use crate::domain::role::UserRole;
    use crate::interfaces::http::test_support::{init_app, TestApp};
    use actix_web::http::StatusCode;
    use actix_web::test::{call_and_read_body_json, call_service, read_body_json, TestRequest};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn stage_change_is_logged_once() {
        let app = TestApp::new().await;
        let (_, closer) = app.user(UserRole::Closer).await;
        let service = init_app!(app);

        let req = TestRequest::post()
            .uri("/api/deals")
            .insert_header(("Authorization", closer.clone()))
            .set_json(json!({"name": "Retainer", "value": 2500.0}))
            .to_request();
        let resp = call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let deal: Value = read_body_json(resp).await;
        assert_eq!(deal["stage"], "qualification");
        let id = deal["id"].as_str().unwrap().to_string();

        for _ in 0..2 {
            let req = TestRequest::put()
                .uri(&format!("/api/deals/{}/stage", id))
                .insert_header(("Authorization", closer.clone()))
                .set_json(json!({"stage": "proposal"}))
                .to_request();
            let moved: Value = call_and_read_body_json(&service, req).await;
            assert_eq!(moved["stage"], "proposal");
        }

        let changes = app
            .repository
            .recent_activity(100)
            .await
            .unwrap()
            .into_iter()
            .filter(|entry| entry.action == "status_changed")
            .count();
        assert_eq!(changes, 1);
    }

    #[actix_web::test]
    async fn unknown_stage_is_bad_request() {
        let app = TestApp::new().await;
        let (_, owner) = app.user(UserRole::Owner).await;
        let service = init_app!(app);

        let req = TestRequest::put()
            .uri("/api/deals/missing/stage")
            .insert_header(("Authorization", owner))
            .set_json(json!({"stage": "won"}))
            .to_request();
        assert_eq!(call_service(&service, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn inverted_value_range_is_rejected() {
        let app = TestApp::new().await;
        let (_, owner) = app.user(UserRole::Owner).await;
        let service = init_app!(app);

        let req = TestRequest::post()
            .uri("/api/deals")
            .insert_header(("Authorization", owner))
            .set_json(json!({"name": "Odd", "min_value": 10.0, "max_value": 5.0}))
            .to_request();
        assert_eq!(call_service(&service, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
