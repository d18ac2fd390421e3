use crate::application::use_cases::lead_webhooks::{MeetingBookedRequest, NoAnswerRequest};
use crate::domain::error::AppError;
use crate::interfaces::http::AppState;
use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Value};

use super::ok;

#[derive(Debug, Deserialize, Default)]
pub struct SubscriptionQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

#[get("/webhooks/facebook-leadgen")]
async fn verify_leadgen(
    data: web::Data<AppState>,
    query: web::Query<SubscriptionQuery>,
) -> Result<HttpResponse, AppError> {
    let challenge = data.webhooks.verify_subscription(
        query.mode.as_deref(),
        query.verify_token.as_deref(),
        query.challenge.as_deref(),
    )?;
    Ok(HttpResponse::Ok().content_type("text/plain").body(challenge))
}

/// Always answers 200 so the platform does not retry the delivery.
#[post("/webhooks/facebook-leadgen")]
async fn receive_leadgen(data: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let report = data.webhooks.receive_leadgen(payload).await;
    data.log(
        if report.errors > 0 { "WARN" } else { "INFO" },
        "Webhooks",
        &format!("Leadgen delivery: {} stored, {} failed", report.processed, report.errors),
    );
    HttpResponse::Ok().json(report)
}

#[get("/webhooks/zapier-leads")]
async fn relay_ready() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Zapier webhook endpoint is ready",
        "instructions": "Send POST requests with lead data",
    }))
}

#[post("/webhooks/zapier-leads")]
async fn receive_relay(data: web::Data<AppState>, req: web::Json<Value>) -> Result<HttpResponse, AppError> {
    let receipt = data.webhooks.receive_relay(req.into_inner()).await?;
    data.log("INFO", "Webhooks", &format!("Relay lead {} stored", receipt.lead_id));
    Ok(HttpResponse::Ok().json(receipt))
}

#[post("/webhooks/no-answer")]
async fn no_answer(
    data: web::Data<AppState>,
    req: web::Json<NoAnswerRequest>,
) -> Result<HttpResponse, AppError> {
    data.webhooks.forward_no_answer(req.into_inner()).await?;
    Ok(ok())
}

#[post("/webhooks/meeting-booked")]
async fn meeting_booked(
    data: web::Data<AppState>,
    req: web::Json<MeetingBookedRequest>,
) -> Result<HttpResponse, AppError> {
    data.webhooks.forward_meeting_booked(req.into_inner()).await?;
    Ok(ok())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(verify_leadgen)
        .service(receive_leadgen)
        .service(relay_ready)
        .service(receive_relay)
        .service(no_answer)
        .service(meeting_booked);
}

#[cfg(test)]
mod tests {
    use crate::application::use_cases::lead_webhooks::tests::CapturingNotifier;
    use crate::infrastructure::bootstrap::Integrations;
    use crate::infrastructure::config::Settings;
    use crate::interfaces::http::test_support::{init_app, TestApp};
    use actix_web::http::StatusCode;
    use actix_web::test::{call_and_read_body, call_and_read_body_json, call_service, read_body_json, TestRequest};
    use serde_json::{json, Value};
    use std::sync::Arc;

    #[actix_web::test]
    async fn subscription_handshake_echoes_challenge() {
        let mut settings = Settings::default();
        settings.facebook.verify_token = Some("verify-me".to_string());
        let app = TestApp::with_integrations(Integrations::offline(), settings).await;
        let service = init_app!(app);

        let req = TestRequest::get()
            .uri("/api/webhooks/facebook-leadgen?hub.mode=subscribe&hub.verify_token=verify-me&hub.challenge=12345")
            .to_request();
        let body = call_and_read_body(&service, req).await;
        assert_eq!(&body[..], b"12345");

        let req = TestRequest::get()
            .uri("/api/webhooks/facebook-leadgen?hub.mode=subscribe&hub.verify_token=wrong&hub.challenge=12345")
            .to_request();
        assert_eq!(call_service(&service, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn leadgen_delivery_never_fails() {
        let app = TestApp::new().await;
        let service = init_app!(app);

        let req = TestRequest::post()
            .uri("/api/webhooks/facebook-leadgen")
            .set_payload("not json")
            .to_request();
        let report: Value = call_and_read_body_json(&service, req).await;
        assert_eq!(report["processed"], 0);

        let req = TestRequest::post()
            .uri("/api/webhooks/facebook-leadgen")
            .set_json(json!({
                "entry": [{"changes": [{"field": "leadgen", "value": {"leadgen_id": "L1", "page_id": "P1"}}]}]
            }))
            .to_request();
        let report: Value = call_and_read_body_json(&service, req).await;
        assert_eq!(report["errors"], 1);
        assert_eq!(report["details"][0]["leadgen_id"], "L1");
    }

    #[actix_web::test]
    async fn relay_leads_are_stored() {
        let app = TestApp::new().await;
        let service = init_app!(app);

        let req = TestRequest::get().uri("/api/webhooks/zapier-leads").to_request();
        let ready: Value = call_and_read_body_json(&service, req).await;
        assert_eq!(ready["message"], "Zapier webhook endpoint is ready");

        let req = TestRequest::post()
            .uri("/api/webhooks/zapier-leads")
            .set_json(json!({"full_name": "Sam Lee", "email": "sam@lee.test", "budget": "5k"}))
            .to_request();
        let receipt: Value = call_and_read_body_json(&service, req).await;
        assert_eq!(receipt["success"], true);

        let req = TestRequest::post()
            .uri("/api/webhooks/zapier-leads")
            .set_json(json!(["not", "an", "object"]))
            .to_request();
        assert_eq!(call_service(&service, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn workflow_hooks_validate_before_forwarding() {
        let notifier = Arc::new(CapturingNotifier::default());
        let integrations = Integrations {
            notifier: notifier.clone(),
            ..Integrations::offline()
        };
        let app = TestApp::with_integrations(integrations, Settings::default()).await;
        let service = init_app!(app);

        let req = TestRequest::post()
            .uri("/api/webhooks/no-answer")
            .set_json(json!({"leadId": "L1"}))
            .to_request();
        let resp = call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["error"], "leadId and phone are required");

        let req = TestRequest::post()
            .uri("/api/webhooks/meeting-booked")
            .set_json(json!({"leadId": "L1", "meetingTime": "2026-11-02T10:30:00"}))
            .to_request();
        let body: Value = call_and_read_body_json(&service, req).await;
        assert_eq!(body["ok"], true);
        assert_eq!(notifier.bookings.lock().unwrap()[0].lead_id, "L1");
    }

    #[actix_web::test]
    async fn unconfigured_workflow_is_server_error() {
        let app = TestApp::new().await;
        let service = init_app!(app);

        let req = TestRequest::post()
            .uri("/api/webhooks/no-answer")
            .set_json(json!({"leadId": "L1", "phone": "555-0100"}))
            .to_request();
        let resp = call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["error"], "N8N_NO_ANSWER_WEBHOOK_URL not configured");
    }
}
