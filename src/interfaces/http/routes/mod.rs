pub mod ads;
pub mod auth;
pub mod calling;
pub mod deals;
pub mod invoices;
pub mod leads;
pub mod outreach;
pub mod records;
pub mod reports;
pub mod scheduling;
pub mod webhooks;

use actix_web::HttpResponse;
use serde_json::json;

pub(crate) fn ok() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "ok": true }))
}
