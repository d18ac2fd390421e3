use std::sync::{Arc, Mutex};

use actix_web::web;
use tracing::{error, info};

use crate::application::use_cases::ads_sync::AdsCredentials;
use crate::application::{
    AdsSyncUseCase, AnalyticsUseCase, AuthUseCase, BulkLeadImportUseCase, CallingQueueUseCase,
    CsvLeadImportUseCase, DashboardUseCase, DealsUseCase, EmailUseCase, InsightsUseCase,
    InvoicingUseCase, LeadScraperUseCase, LeadWebhooksUseCase, LeadsUseCase, RecordsUseCase,
    SchedulingUseCase,
};
use crate::domain::error::Result;
use crate::infrastructure::config::{non_empty, Settings};
use crate::infrastructure::db::CrmRepository;
use crate::infrastructure::integrations::apify::{ApifyClient, PlaceScraper};
use crate::infrastructure::integrations::calendly::{CalendlyClient, Scheduler};
use crate::infrastructure::integrations::meta_graph::{AdsPlatform, MetaGraphClient};
use crate::infrastructure::integrations::resend::{EmailSender, ResendClient};
use crate::infrastructure::integrations::stripe::{PaymentGateway, StripeClient};
use crate::infrastructure::integrations::workflows::{N8nNotifier, WorkflowNotifier};
use crate::infrastructure::llm_clients::{LLMClient, OpenAIClient};
use crate::interfaces::http::{add_log, AppState, IntegrationStatus, LogEntry};

/// Outbound clients. Optional ones are `None` when their secret is unset.
pub struct Integrations {
    pub llm: Arc<dyn LLMClient>,
    pub payments: Option<Arc<dyn PaymentGateway>>,
    pub ads: Arc<dyn AdsPlatform>,
    pub scheduler: Option<Arc<dyn Scheduler>>,
    pub scraper: Option<Arc<dyn PlaceScraper>>,
    pub notifier: Arc<dyn WorkflowNotifier>,
    pub email: Option<Arc<dyn EmailSender>>,
}

impl Integrations {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            llm: Arc::new(OpenAIClient::new()),
            payments: non_empty(&settings.stripe.secret_key)
                .map(|key| Arc::new(StripeClient::new(key)) as Arc<dyn PaymentGateway>),
            ads: Arc::new(MetaGraphClient::new()),
            scheduler: non_empty(&settings.calendly.api_token)
                .map(|token| Arc::new(CalendlyClient::new(token)) as Arc<dyn Scheduler>),
            scraper: non_empty(&settings.apify.token)
                .map(|token| Arc::new(ApifyClient::new(token)) as Arc<dyn PlaceScraper>),
            notifier: Arc::new(N8nNotifier::new(
                non_empty(&settings.n8n.no_answer_url),
                non_empty(&settings.n8n.meeting_booked_url),
            )),
            email: non_empty(&settings.resend.api_key)
                .map(|key| Arc::new(ResendClient::new(key)) as Arc<dyn EmailSender>),
        }
    }

    /// Every optional integration switched off.
    pub fn offline() -> Self {
        Self::from_settings(&Settings::default())
    }
}

pub fn build_state(
    repository: Arc<CrmRepository>,
    integrations: Integrations,
    settings: &Settings,
) -> AppState {
    let Integrations {
        llm,
        payments,
        ads,
        scheduler,
        scraper,
        notifier,
        email,
    } = integrations;

    let scheduling = Arc::new(SchedulingUseCase::new(
        scheduler,
        non_empty(&settings.cron.secret),
    ));
    let credentials = AdsCredentials {
        access_token: non_empty(&settings.meta.access_token),
        graph_token: non_empty(&settings.facebook.graph_token),
        ad_account_id: non_empty(&settings.meta.ad_account_id),
    };

    AppState {
        auth: AuthUseCase::new(repository.clone()),
        records: RecordsUseCase::new(repository.clone()),
        deals: DealsUseCase::new(repository.clone()),
        leads: LeadsUseCase::new(repository.clone()),
        csv_import: CsvLeadImportUseCase::new(repository.clone()),
        bulk_import: BulkLeadImportUseCase::new(repository.clone()),
        calling: CallingQueueUseCase::new(repository.clone(), notifier.clone(), scheduling.clone()),
        dashboard: DashboardUseCase::new(repository.clone()),
        analytics: AnalyticsUseCase::new(repository.clone()),
        insights: InsightsUseCase::new(repository.clone(), llm, settings.llm_config()),
        invoicing: InvoicingUseCase::new(repository.clone(), payments),
        ads: AdsSyncUseCase::new(repository.clone(), ads.clone(), credentials),
        webhooks: LeadWebhooksUseCase::new(
            repository,
            ads,
            notifier,
            non_empty(&settings.facebook.verify_token),
            non_empty(&settings.facebook.graph_token),
        ),
        scheduling,
        scraper: LeadScraperUseCase::new(scraper),
        email: EmailUseCase::new(email, non_empty(&settings.resend.from)),
        integrations: IntegrationStatus::from_settings(settings),
        logs: Arc::new(Mutex::new(Vec::<LogEntry>::new())),
    }
}

/// Connects the database, runs migrations and wires every use case.
pub async fn bootstrap(settings: &Settings) -> Result<web::Data<AppState>> {
    let repository = CrmRepository::connect(&settings.database.url, settings.database.max_connections)
        .await
        .map_err(|e| {
            error!(error = %e, url = %settings.database.url, "Failed to open CRM database");
            e
        })?;

    let state = build_state(
        Arc::new(repository),
        Integrations::from_settings(settings),
        settings,
    );

    let status = &state.integrations;
    add_log(&state.logs, "INFO", "Server", &format!("Database ready at {}", settings.database.url));
    for (name, configured) in [
        ("OpenAI", status.openai),
        ("Stripe", status.stripe),
        ("Meta Ads", status.meta_ads),
        ("Calendly", status.calendly),
        ("Apify", status.apify),
        ("Resend", status.resend),
    ] {
        if !configured {
            add_log(&state.logs, "WARN", "Server", &format!("{} not configured", name));
        }
    }
    info!(?status, "Integrations resolved");

    Ok(web::Data::new(state))
}
