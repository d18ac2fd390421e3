use crate::domain::error::AppError;
use crate::domain::role::{Area, UserRole};
use crate::interfaces::http::auth::CurrentUser;
use crate::interfaces::http::AppState;
use actix_web::{get, post, web, HttpResponse};

#[get("/dashboard")]
async fn dashboard(data: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    let profile = user.require(Area::Dashboard)?;
    Ok(HttpResponse::Ok().json(data.dashboard.execute(profile).await?))
}

#[get("/analytics")]
async fn analytics(data: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    user.require(Area::Analytics)?;
    Ok(HttpResponse::Ok().json(data.analytics.execute().await?))
}

#[get("/insights")]
async fn list_insights(data: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    user.require(Area::Insights)?;
    Ok(HttpResponse::Ok().json(data.insights.list().await?))
}

#[post("/insights/generate")]
async fn generate_insight(data: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    user.require_role(&[UserRole::Owner])?;
    data.log("INFO", "Insights", "Generating daily insight");
    match data.insights.generate().await {
        Ok(insight) => {
            data.log("INFO", "Insights", &format!("Insight saved for {}", insight.date));
            Ok(HttpResponse::Ok().json(insight))
        }
        Err(e) => {
            data.log("ERROR", "Insights", &e.message());
            Err(e)
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(dashboard)
        .service(analytics)
        .service(list_insights)
        .service(generate_insight);
}
