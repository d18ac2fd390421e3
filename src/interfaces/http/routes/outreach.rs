use crate::application::use_cases::email::EmailRequest;
use crate::domain::error::AppError;
use crate::domain::role::Area;
use crate::interfaces::http::auth::CurrentUser;
use crate::interfaces::http::AppState;
use actix_web::{post, web, HttpResponse};

#[post("/email/send")]
async fn send_email(
    data: web::Data<AppState>,
    user: CurrentUser,
    req: web::Json<EmailRequest>,
) -> Result<HttpResponse, AppError> {
    user.require(Area::Leads)?;
    match data.email.send(req.into_inner()).await {
        Ok(receipt) => {
            data.log("INFO", "Email", &format!("Email {} sent", receipt.id));
            Ok(HttpResponse::Ok().json(receipt))
        }
        Err(e) => {
            data.log("ERROR", "Email", &e.message());
            Err(e)
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(send_email);
}

#[cfg(test)]
mod tests {
    use crate::domain::error::Result;
    use crate::domain::role::UserRole;
    use crate::infrastructure::bootstrap::Integrations;
    use crate::infrastructure::config::Settings;
    use crate::infrastructure::integrations::resend::{EmailSender, OutgoingEmail};
    use crate::interfaces::http::test_support::{init_app, TestApp};
    use actix_web::http::StatusCode;
    use actix_web::test::{call_and_read_body_json, call_service, read_body_json, TestRequest};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Outbox {
        sent: Mutex<Vec<OutgoingEmail>>,
    }

    #[async_trait]
    impl EmailSender for Outbox {
        async fn send(&self, email: &OutgoingEmail) -> Result<String> {
            self.sent.lock().unwrap().push(email.clone());
            Ok("msg_1".to_string())
        }
    }

    #[actix_web::test]
    async fn sends_with_configured_sender() {
        let outbox = Arc::new(Outbox::default());
        let mut settings = Settings::default();
        settings.resend.from = Some("Agency <hello@agency.test>".to_string());
        let integrations = Integrations {
            email: Some(outbox.clone() as Arc<dyn EmailSender>),
            ..Integrations::offline()
        };
        let app = TestApp::with_integrations(integrations, settings).await;
        let (_, closer) = app.user(UserRole::Closer).await;
        let service = init_app!(app);

        let req = TestRequest::post()
            .uri("/api/email/send")
            .insert_header(("Authorization", closer))
            .set_json(json!({"to": "jo@bakery.test", "subject": "Hello", "text": "Hi Jo"}))
            .to_request();
        let receipt: Value = call_and_read_body_json(&service, req).await;
        assert_eq!(receipt["id"], "msg_1");

        let sent = outbox.sent.lock().unwrap();
        assert_eq!(sent[0].from, "Agency <hello@agency.test>");
        assert_eq!(sent[0].to, vec!["jo@bakery.test".to_string()]);
    }

    #[actix_web::test]
    async fn missing_key_is_server_error() {
        let app = TestApp::new().await;
        let (_, owner) = app.user(UserRole::Owner).await;
        let service = init_app!(app);

        let req = TestRequest::post()
            .uri("/api/email/send")
            .insert_header(("Authorization", owner))
            .set_json(json!({"to": ["a@b.test"], "subject": "Hi", "html": "<p>Hi</p>"}))
            .to_request();
        let resp = call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["error"], "RESEND_API_KEY not configured");
    }
}
