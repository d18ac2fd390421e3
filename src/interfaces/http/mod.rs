pub mod auth;
pub mod routes;
pub mod state;

pub use state::{AppState, IntegrationStatus};

use crate::domain::error::AppError;
use crate::domain::role::UserRole;
use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::{dev::Server, get, web, App, HttpResponse, HttpServer, ResponseError};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Mutex;

use auth::CurrentUser;

pub const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) | AppError::ParseError(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) | AppError::SecurityError(_) => StatusCode::FORBIDDEN,
            AppError::Upstream(_) | AppError::LLMError(_) => StatusCode::BAD_GATEWAY,
            AppError::NotConfigured(_)
            | AppError::Internal(_)
            | AppError::DatabaseError(_)
            | AppError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        HttpResponse::build(self.status_code()).json(json!({ "error": self.message() }))
    }
}

pub fn add_log_entry(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) -> LogEntry {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    let mut logs = logs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    logs.push(entry.clone());
    if logs.len() > MAX_LOG_ENTRIES {
        logs.remove(0);
    }
    entry
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    add_log_entry(logs, level, source, message);
}

#[get("/health")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

#[get("/logs")]
async fn get_logs(data: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    user.require_role(&[UserRole::Owner])?;
    let logs = data
        .logs
        .lock()
        .map_err(|_| AppError::Internal("Operations log lock poisoned".to_string()))?
        .clone();
    Ok(HttpResponse::Ok().json(logs))
}

/// Every route under `/api`, plus body and query errors mapped to 400.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default()
        .limit(2 * 1024 * 1024)
        .error_handler(|err, _| AppError::ValidationError(err.to_string()).into());
    let query_config = web::QueryConfig::default()
        .error_handler(|err, _| AppError::ValidationError(err.to_string()).into());
    let path_config = web::PathConfig::default()
        .error_handler(|err, _| AppError::ValidationError(err.to_string()).into());

    cfg.app_data(json_config)
        .app_data(web::PayloadConfig::new(10 * 1024 * 1024))
        .app_data(query_config)
        .app_data(path_config)
        .service(
            web::scope("/api")
                .service(health)
                .service(get_logs)
                .configure(routes::auth::configure)
                .configure(routes::records::configure)
                .configure(routes::deals::configure)
                .configure(routes::leads::configure)
                .configure(routes::calling::configure)
                .configure(routes::reports::configure)
                .configure(routes::invoices::configure)
                .configure(routes::ads::configure)
                .configure(routes::scheduling::configure)
                .configure(routes::webhooks::configure)
                .configure(routes::outreach::configure),
        );
}

pub fn start_server(state: web::Data<AppState>, bind: (String, u16)) -> std::io::Result<Server> {
    let server = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(actix_web::middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(bind)?
    .run();

    Ok(server)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::domain::profile::Profile;
    use crate::infrastructure::bootstrap::{build_state, Integrations};
    use crate::infrastructure::config::Settings;
    use crate::infrastructure::db::CrmRepository;
    use crate::infrastructure::security::{generate_token, hash_token};
    use std::sync::Arc;

    pub(crate) struct TestApp {
        pub state: web::Data<AppState>,
        pub repository: Arc<CrmRepository>,
    }

    impl TestApp {
        pub async fn new() -> Self {
            Self::with_integrations(Integrations::offline(), Settings::default()).await
        }

        pub async fn with_integrations(integrations: Integrations, settings: Settings) -> Self {
            let repository = Arc::new(CrmRepository::in_memory().await.unwrap());
            let state = web::Data::new(build_state(repository.clone(), integrations, &settings));
            Self { state, repository }
        }

        /// A profile with `role` and the bearer token that authenticates it.
        pub async fn user(&self, role: UserRole) -> (Profile, String) {
            let token = generate_token();
            let profile = self
                .repository
                .create_profile(Some(role.as_str()), role, &hash_token(&token))
                .await
                .unwrap();
            (profile, format!("Bearer {}", token))
        }
    }

    macro_rules! init_app {
        ($test_app:expr) => {
            actix_web::test::init_service(
                actix_web::App::new()
                    .app_data($test_app.state.clone())
                    .configure($crate::interfaces::http::configure),
            )
            .await
        };
    }
    pub(crate) use init_app;
}
