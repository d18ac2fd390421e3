use crate::application::use_cases::calling_queue::OutcomeRequest;
use crate::domain::error::AppError;
use crate::domain::role::Area;
use crate::interfaces::http::auth::CurrentUser;
use crate::interfaces::http::AppState;
use actix_web::{delete, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use super::ok;

#[derive(Debug, Deserialize)]
pub struct StartSession {
    #[serde(alias = "listId")]
    pub list_id: String,
}

#[post("/calling/sessions")]
async fn start_session(
    data: web::Data<AppState>,
    user: CurrentUser,
    req: web::Json<StartSession>,
) -> Result<HttpResponse, AppError> {
    let actor = user.require(Area::Calling)?;
    let session = data.calling.start(actor, &req.list_id).await?;
    Ok(HttpResponse::Created().json(session))
}

/// `{"lead": null}` once the list is exhausted.
#[post("/calling/sessions/{id}/next")]
async fn next_lead(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let actor = user.require(Area::Calling)?;
    let lead = data.calling.next(actor, &path).await?;
    Ok(HttpResponse::Ok().json(json!({ "lead": lead })))
}

#[post("/calling/sessions/{id}/outcome")]
async fn record_outcome(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
    req: web::Json<OutcomeRequest>,
) -> Result<HttpResponse, AppError> {
    let actor = user.require(Area::Calling)?;
    let result = data.calling.record_outcome(actor, &path, req.into_inner()).await?;
    if let Some(meeting) = &result.meeting {
        data.log(
            "INFO",
            "Calling",
            &format!("Meeting booked for lead {} at {}", result.call_log.lead_id, meeting.scheduled_at),
        );
    }
    Ok(HttpResponse::Ok().json(result))
}

#[delete("/calling/sessions/{id}")]
async fn end_session(
    data: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let actor = user.require(Area::Calling)?;
    data.calling.end(actor, &path)?;
    Ok(ok())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(start_session)
        .service(next_lead)
        .service(record_outcome)
        .service(end_session);
}

#[cfg(test)]
mod tests {
    use crate::domain::lead::{LeadListInput, NewLead};
    use crate::domain::role::UserRole;
    use crate::interfaces::http::test_support::{init_app, TestApp};
    use actix_web::http::StatusCode;
    use actix_web::test::{call_and_read_body_json, call_service, read_body_json, TestRequest};
    use serde_json::{json, Value};

    async fn seeded_list(app: &TestApp) -> String {
        let list = app
            .repository
            .create_lead_list(&LeadListInput {
                name: "Cafes".to_string(),
                niche: None,
                assigned_cold_callers: Vec::new(),
            })
            .await
            .unwrap();
        let leads: Vec<NewLead> = [("Alpha Cafe", "1"), ("Bravo Cafe", "2")]
            .iter()
            .map(|(name, phone)| NewLead {
                list_id: list.id.clone(),
                name: name.to_string(),
                phone: phone.to_string(),
                email: None,
                city: None,
                website: None,
                niche: None,
                source: None,
            })
            .collect();
        app.repository.insert_leads(&leads).await.unwrap();
        list.id
    }

    #[actix_web::test]
    async fn booking_through_a_session() {
        let app = TestApp::new().await;
        let (_, caller) = app.user(UserRole::ColdCaller).await;
        let list_id = seeded_list(&app).await;
        let service = init_app!(app);

        let req = TestRequest::post()
            .uri("/api/calling/sessions")
            .insert_header(("Authorization", caller.clone()))
            .set_json(json!({"list_id": list_id}))
            .to_request();
        let session: Value = call_and_read_body_json(&service, req).await;
        let session_id = session["id"].as_str().unwrap().to_string();

        let req = TestRequest::post()
            .uri(&format!("/api/calling/sessions/{}/next", session_id))
            .insert_header(("Authorization", caller.clone()))
            .to_request();
        let served: Value = call_and_read_body_json(&service, req).await;
        let lead_id = served["lead"]["id"].as_str().unwrap().to_string();

        let req = TestRequest::post()
            .uri(&format!("/api/calling/sessions/{}/outcome", session_id))
            .insert_header(("Authorization", caller.clone()))
            .set_json(json!({
                "lead_id": lead_id,
                "outcome": "booked",
                "booking": {"date": "2026-11-02", "time": "10:30"}
            }))
            .to_request();
        let result: Value = call_and_read_body_json(&service, req).await;
        assert_eq!(result["deal"]["stage"], "qualification");
        assert_eq!(result["meeting"]["lead_id"], lead_id.as_str());
        assert_ne!(result["next_lead"]["id"], lead_id.as_str());

        let req = TestRequest::delete()
            .uri(&format!("/api/calling/sessions/{}", session_id))
            .insert_header(("Authorization", caller))
            .to_request();
        assert_eq!(call_service(&service, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn sessions_are_private() {
        let app = TestApp::new().await;
        let (_, caller) = app.user(UserRole::ColdCaller).await;
        let (_, other) = app.user(UserRole::ColdCaller).await;
        let list_id = seeded_list(&app).await;
        let service = init_app!(app);

        let req = TestRequest::post()
            .uri("/api/calling/sessions")
            .insert_header(("Authorization", caller))
            .set_json(json!({"listId": list_id}))
            .to_request();
        let session: Value = call_and_read_body_json(&service, req).await;

        let req = TestRequest::post()
            .uri(&format!("/api/calling/sessions/{}/next", session["id"].as_str().unwrap()))
            .insert_header(("Authorization", other))
            .to_request();
        let resp = call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["error"], "This calling session belongs to another user");
    }

    #[actix_web::test]
    async fn closer_cannot_cold_call() {
        let app = TestApp::new().await;
        let (_, closer) = app.user(UserRole::Closer).await;
        let service = init_app!(app);

        let req = TestRequest::post()
            .uri("/api/calling/sessions")
            .insert_header(("Authorization", closer))
            .set_json(json!({"list_id": "any"}))
            .to_request();
        assert_eq!(call_service(&service, req).await.status(), StatusCode::FORBIDDEN);
    }
}
