use crate::application::use_cases::bulk_lead_import::BulkImportRequest;
use crate::domain::error::AppError;
use crate::domain::lead::{LeadInput, LeadListInput, LeadStatus};
use crate::domain::role::Area;
use crate::domain::scraper::ScrapeRequest;
use crate::infrastructure::db::repository::LeadFilter;
use crate::interfaces::http::auth::CurrentUser;
use crate::interfaces::http::AppState;
use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;

use super::ok;

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: LeadStatus,
}

#[derive(Debug, Deserialize, Default)]
pub struct CsvUploadQuery {
    #[serde(default)]
    pub list_id: Option<String>,
}

#[get("/leads")]
async fn list_leads(
    data: web::Data<AppState>,
    user: CurrentUser,
    filter: web::Query<LeadFilter>,
) -> Result<HttpResponse, AppError> {
    user.require(Area::Leads)?;
    Ok(HttpResponse::Ok().json(data.leads.list(&filter).await?))
}

#[post("/leads")]
async fn create_lead(
    data: web::Data<AppState>,
    user: CurrentUser,
    req: web::Json<LeadInput>,
) -> Result<HttpResponse, AppError> {
    let actor = user.require(Area::Leads)?;
    let lead = data.leads.create(actor, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(lead))
}

/// Raw CSV body; the target list comes from `?list_id=`.
#[post("/leads/upload-csv")]
async fn upload_csv(
    data: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<CsvUploadQuery>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    user.require(Area::Leads)?;
    let list_id = query.list_id.as_deref().unwrap_or_default();
    let result = data.csv_import.execute(list_id, &body).await?;
    data.log(
        "INFO",
        "Leads",
        &format!("Imported {} leads from CSV into list {}", result.count, list_id),
    );
    Ok(HttpResponse::Ok().json(result))
}

#[post("/leads/bulk")]
async fn bulk_import(
    data: web::Data<AppState>,
    user: CurrentUser,
    req: web::Json<BulkImportRequest>,
) -> Result<HttpResponse, AppError> {
    user.require(Area::Leads)?;
    let result = data.bulk_import.execute(req.into_inner()).await?;
    data.log("INFO", "Leads", &format!("Bulk import saved {} leads", result.count));
    Ok(HttpResponse::Ok().json(result))
}

#[get("/leads/{id}")]
async fn get_lead(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    user.require(Area::Leads)?;
    Ok(HttpResponse::Ok().json(data.leads.get(&path).await?))
}

#[put("/leads/{id}")]
async fn update_lead(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
    req: web::Json<LeadInput>,
) -> Result<HttpResponse, AppError> {
    user.require(Area::Leads)?;
    Ok(HttpResponse::Ok().json(data.leads.update(&path, req.into_inner()).await?))
}

#[put("/leads/{id}/status")]
async fn change_status(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
    req: web::Json<StatusChange>,
) -> Result<HttpResponse, AppError> {
    let actor = user.require(Area::Leads)?;
    Ok(HttpResponse::Ok().json(data.leads.change_status(actor, &path, req.status).await?))
}

#[delete("/leads/{id}")]
async fn delete_lead(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let actor = user.require(Area::Leads)?;
    data.leads.delete(actor, &path).await?;
    Ok(ok())
}

#[get("/lead-lists")]
async fn list_lists(data: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    user.require(Area::Leads)?;
    Ok(HttpResponse::Ok().json(data.leads.lists().await?))
}

#[get("/lead-lists/{id}")]
async fn get_list(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    user.require(Area::Leads)?;
    Ok(HttpResponse::Ok().json(data.leads.get_list(&path).await?))
}

#[post("/lead-lists")]
async fn create_list(
    data: web::Data<AppState>,
    user: CurrentUser,
    req: web::Json<LeadListInput>,
) -> Result<HttpResponse, AppError> {
    let actor = user.require(Area::Leads)?;
    let list = data.leads.create_list(actor, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(list))
}

#[put("/lead-lists/{id}")]
async fn update_list(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
    req: web::Json<LeadListInput>,
) -> Result<HttpResponse, AppError> {
    user.require(Area::Leads)?;
    Ok(HttpResponse::Ok().json(data.leads.update_list(&path, req.into_inner()).await?))
}

#[delete("/lead-lists/{id}")]
async fn delete_list(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let actor = user.require(Area::Leads)?;
    data.leads.delete_list(actor, &path).await?;
    Ok(ok())
}

#[post("/scraper/run")]
async fn run_scraper(
    data: web::Data<AppState>,
    user: CurrentUser,
    req: Option<web::Json<ScrapeRequest>>,
) -> Result<HttpResponse, AppError> {
    user.require(Area::Leads)?;
    let request = req.map(|r| r.into_inner()).unwrap_or_default();
    match data.scraper.execute(&request).await {
        Ok(summary) => {
            data.log(
                "INFO",
                "Scraper",
                &format!("Scrape finished: {} leads with a website", summary.with_website),
            );
            Ok(HttpResponse::Ok().json(summary))
        }
        Err(e) => {
            data.log("ERROR", "Scraper", &e.message());
            Err(e)
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_leads)
        .service(create_lead)
        .service(upload_csv)
        .service(bulk_import)
        .service(get_lead)
        .service(update_lead)
        .service(change_status)
        .service(delete_lead)
        .service(list_lists)
        .service(get_list)
        .service(create_list)
        .service(update_list)
        .service(delete_list)
        .service(run_scraper);
}

#[cfg(test)]
mod tests {
    use crate::domain::lead::LeadListInput;
    use crate::domain::role::UserRole;
    use crate::interfaces::http::test_support::{init_app, TestApp};
    use actix_web::http::StatusCode;
    use actix_web::test::{call_and_read_body_json, call_service, read_body_json, TestRequest};
    use serde_json::{json, Value};

    async fn create_list(app: &TestApp) -> String {
        let input = LeadListInput {
            name: "Dentists".to_string(),
            niche: Some("dental".to_string()),
            assigned_cold_callers: Vec::new(),
        };
        app.repository.create_lead_list(&input).await.unwrap().id
    }

    #[actix_web::test]
    async fn csv_upload_fills_the_list() {
        let app = TestApp::new().await;
        let (_, owner) = app.user(UserRole::Owner).await;
        let list_id = create_list(&app).await;
        let service = init_app!(app);

        let csv = "title,phone,city,website\nBright Smiles,555-0100,Hamilton,https://smiles.test\nNo Phone,,Hamilton,\n";
        let req = TestRequest::post()
            .uri(&format!("/api/leads/upload-csv?list_id={}", list_id))
            .insert_header(("Authorization", owner.clone()))
            .insert_header(("Content-Type", "text/csv"))
            .set_payload(csv)
            .to_request();
        let result: Value = call_and_read_body_json(&service, req).await;
        assert_eq!(result["count"], 1);
        assert_eq!(result["column_map"]["name"], "title");

        let req = TestRequest::get()
            .uri(&format!("/api/leads?list_id={}", list_id))
            .insert_header(("Authorization", owner))
            .to_request();
        let leads: Value = call_and_read_body_json(&service, req).await;
        assert_eq!(leads[0]["name"], "Bright Smiles");
        assert_eq!(leads[0]["status"], "new");
    }

    #[actix_web::test]
    async fn csv_upload_requires_list() {
        let app = TestApp::new().await;
        let (_, owner) = app.user(UserRole::Owner).await;
        let service = init_app!(app);

        let req = TestRequest::post()
            .uri("/api/leads/upload-csv")
            .insert_header(("Authorization", owner))
            .set_payload("title,phone\nA,1\n")
            .to_request();
        let resp = call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["error"], "list_id is required");
    }

    #[actix_web::test]
    async fn bulk_import_skips_known_phones() {
        let app = TestApp::new().await;
        let (_, caller) = app.user(UserRole::ColdCaller).await;
        let list_id = create_list(&app).await;
        let service = init_app!(app);

        let body = json!({
            "listId": list_id,
            "leads": [
                {"name": "Alpha", "phone": "555-0101"},
                {"name": "Alpha again", "phone": "555-0101"},
                {"name": "No phone"}
            ]
        });
        let req = TestRequest::post()
            .uri("/api/leads/bulk")
            .insert_header(("Authorization", caller.clone()))
            .set_json(&body)
            .to_request();
        let first: Value = call_and_read_body_json(&service, req).await;
        assert_eq!(first["count"], 1);

        let req = TestRequest::post()
            .uri("/api/leads/bulk")
            .insert_header(("Authorization", caller))
            .set_json(&body)
            .to_request();
        let second: Value = call_and_read_body_json(&service, req).await;
        assert_eq!(second["count"], 0);
        assert_eq!(second["skipped"], 1);
    }

    #[actix_web::test]
    async fn scraper_without_token_is_server_error() {
        let app = TestApp::new().await;
        let (_, owner) = app.user(UserRole::Owner).await;
        let service = init_app!(app);

        let req = TestRequest::post()
            .uri("/api/scraper/run")
            .insert_header(("Authorization", owner))
            .set_json(json!({"search_term": "plumbers"}))
            .to_request();
        let resp = call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["error"], "APIFY_TOKEN not configured");
    }
}
