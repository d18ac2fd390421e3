use crate::domain::error::AppError;
use crate::domain::invoice::SendInvoiceRequest;
use crate::domain::role::Area;
use crate::interfaces::http::auth::CurrentUser;
use crate::interfaces::http::AppState;
use actix_web::{get, post, web, HttpResponse};

#[get("/invoices")]
async fn list_invoices(data: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    user.require(Area::Invoices)?;
    Ok(HttpResponse::Ok().json(data.invoicing.list().await?))
}

#[post("/invoices/send")]
async fn send_invoice(
    data: web::Data<AppState>,
    user: CurrentUser,
    req: web::Json<SendInvoiceRequest>,
) -> Result<HttpResponse, AppError> {
    let actor = user.require(Area::Invoices)?;
    let result = data.invoicing.send(actor, req.into_inner()).await?;
    data.log(
        "INFO",
        "Invoices",
        &format!("Invoice {}: {}", result.invoice.id, result.message),
    );
    Ok(HttpResponse::Ok().json(result))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_invoices).service(send_invoice);
}
