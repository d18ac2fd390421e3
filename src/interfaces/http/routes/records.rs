use crate::domain::error::AppError;
use crate::domain::records::{
    AdCreativeInput, ClientInput, MeetingInput, ProjectInput, WebAssetInput, WebAssetKind,
};
use crate::domain::role::Area;
use crate::interfaces::http::auth::CurrentUser;
use crate::interfaces::http::AppState;
use actix_web::{delete, get, post, put, web, HttpResponse};

use super::ok;

#[get("/clients")]
async fn list_clients(data: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    user.require(Area::Clients)?;
    Ok(HttpResponse::Ok().json(data.records.list_clients().await?))
}

#[get("/clients/{id}")]
async fn get_client(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    user.require(Area::Clients)?;
    Ok(HttpResponse::Ok().json(data.records.get_client(&path).await?))
}

#[post("/clients")]
async fn create_client(
    data: web::Data<AppState>,
    user: CurrentUser,
    req: web::Json<ClientInput>,
) -> Result<HttpResponse, AppError> {
    let actor = user.require(Area::Clients)?;
    let client = data.records.create_client(actor, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(client))
}

#[put("/clients/{id}")]
async fn update_client(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
    req: web::Json<ClientInput>,
) -> Result<HttpResponse, AppError> {
    user.require(Area::Clients)?;
    Ok(HttpResponse::Ok().json(data.records.update_client(&path, req.into_inner()).await?))
}

#[delete("/clients/{id}")]
async fn delete_client(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let actor = user.require(Area::Clients)?;
    data.records.delete_client(actor, &path).await?;
    Ok(ok())
}

#[get("/projects")]
async fn list_projects(data: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    user.require(Area::Projects)?;
    Ok(HttpResponse::Ok().json(data.records.list_projects().await?))
}

#[post("/projects")]
async fn create_project(
    data: web::Data<AppState>,
    user: CurrentUser,
    req: web::Json<ProjectInput>,
) -> Result<HttpResponse, AppError> {
    let actor = user.require(Area::Projects)?;
    let project = data.records.create_project(actor, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(project))
}

#[put("/projects/{id}")]
async fn update_project(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
    req: web::Json<ProjectInput>,
) -> Result<HttpResponse, AppError> {
    user.require(Area::Projects)?;
    Ok(HttpResponse::Ok().json(data.records.update_project(&path, req.into_inner()).await?))
}

#[delete("/projects/{id}")]
async fn delete_project(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let actor = user.require(Area::Projects)?;
    data.records.delete_project(actor, &path).await?;
    Ok(ok())
}

#[get("/projects/{id}/creatives")]
async fn list_project_creatives(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    user.require(Area::Projects)?;
    Ok(HttpResponse::Ok().json(data.records.list_project_creatives(&path).await?))
}

#[post("/projects/{id}/creatives")]
async fn create_creative(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
    req: web::Json<AdCreativeInput>,
) -> Result<HttpResponse, AppError> {
    let actor = user.require(Area::Projects)?;
    let creative = data
        .records
        .create_ad_creative(actor, &path, req.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(creative))
}

#[put("/creatives/{id}")]
async fn update_creative(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
    req: web::Json<AdCreativeInput>,
) -> Result<HttpResponse, AppError> {
    user.require(Area::Projects)?;
    Ok(HttpResponse::Ok().json(data.records.update_ad_creative(&path, req.into_inner()).await?))
}

#[delete("/creatives/{id}")]
async fn delete_creative(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let actor = user.require(Area::Projects)?;
    data.records.delete_ad_creative(actor, &path).await?;
    Ok(ok())
}

// Funnels and sites share handlers; the scope carries the kind.

async fn list_assets(
    data: web::Data<AppState>,
    kind: web::Data<WebAssetKind>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    user.require(Area::Projects)?;
    Ok(HttpResponse::Ok().json(data.records.list_web_assets(**kind).await?))
}

async fn create_asset(
    data: web::Data<AppState>,
    kind: web::Data<WebAssetKind>,
    user: CurrentUser,
    req: web::Json<WebAssetInput>,
) -> Result<HttpResponse, AppError> {
    let actor = user.require(Area::Projects)?;
    let asset = data.records.create_web_asset(actor, **kind, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(asset))
}

async fn update_asset(
    data: web::Data<AppState>,
    kind: web::Data<WebAssetKind>,
    user: CurrentUser,
    path: web::Path<String>,
    req: web::Json<WebAssetInput>,
) -> Result<HttpResponse, AppError> {
    user.require(Area::Projects)?;
    let asset = data.records.update_web_asset(**kind, &path, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(asset))
}

async fn delete_asset(
    data: web::Data<AppState>,
    kind: web::Data<WebAssetKind>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let actor = user.require(Area::Projects)?;
    data.records.delete_web_asset(actor, **kind, &path).await?;
    Ok(ok())
}

fn asset_scope(kind: WebAssetKind) -> actix_web::Scope {
    web::scope(&format!("/{}", kind.table()))
        .app_data(web::Data::new(kind))
        .route("", web::get().to(list_assets))
        .route("", web::post().to(create_asset))
        .route("/{id}", web::put().to(update_asset))
        .route("/{id}", web::delete().to(delete_asset))
}

#[get("/meetings")]
async fn list_meetings(data: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    user.require(Area::Meetings)?;
    Ok(HttpResponse::Ok().json(data.records.list_meetings().await?))
}

#[post("/meetings")]
async fn book_meeting(
    data: web::Data<AppState>,
    user: CurrentUser,
    req: web::Json<MeetingInput>,
) -> Result<HttpResponse, AppError> {
    let actor = user.require(Area::Meetings)?;
    let meeting = data.records.book_meeting(actor, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(meeting))
}

#[get("/updates")]
async fn activity_feed(data: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    user.require(Area::Updates)?;
    Ok(HttpResponse::Ok().json(data.records.activity_feed().await?))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_clients)
        .service(get_client)
        .service(create_client)
        .service(update_client)
        .service(delete_client)
        .service(list_projects)
        .service(create_project)
        .service(update_project)
        .service(delete_project)
        .service(list_project_creatives)
        .service(create_creative)
        .service(update_creative)
        .service(delete_creative)
        .service(asset_scope(WebAssetKind::Funnel))
        .service(asset_scope(WebAssetKind::Site))
        .service(list_meetings)
        .service(book_meeting)
        .service(activity_feed);
}
