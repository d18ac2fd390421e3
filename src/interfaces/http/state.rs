use crate::application::{
    AdsSyncUseCase, AnalyticsUseCase, AuthUseCase, BulkLeadImportUseCase, CallingQueueUseCase,
    CsvLeadImportUseCase, DashboardUseCase, DealsUseCase, EmailUseCase, InsightsUseCase,
    InvoicingUseCase, LeadScraperUseCase, LeadWebhooksUseCase, LeadsUseCase, RecordsUseCase,
    SchedulingUseCase,
};
use crate::infrastructure::config::{non_empty, Settings};
use serde::Serialize;
use std::sync::{Arc, Mutex};

use super::LogEntry;

/// Which optional integrations have their secrets set. Shown on the
/// settings page; never exposes the secrets themselves.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct IntegrationStatus {
    pub openai: bool,
    pub stripe: bool,
    pub meta_ads: bool,
    pub meta_account_sync: bool,
    pub facebook_webhook: bool,
    pub calendly: bool,
    pub apify: bool,
    pub n8n_no_answer: bool,
    pub n8n_meeting_booked: bool,
    pub resend: bool,
    pub cron_secret: bool,
}

impl IntegrationStatus {
    pub fn from_settings(settings: &Settings) -> Self {
        let set = |value: &Option<String>| non_empty(value).is_some();
        Self {
            openai: set(&settings.openai.api_key),
            stripe: set(&settings.stripe.secret_key),
            meta_ads: set(&settings.meta.access_token),
            meta_account_sync: set(&settings.facebook.graph_token) && set(&settings.meta.ad_account_id),
            facebook_webhook: set(&settings.facebook.verify_token) && set(&settings.facebook.graph_token),
            calendly: set(&settings.calendly.api_token),
            apify: set(&settings.apify.token),
            n8n_no_answer: set(&settings.n8n.no_answer_url),
            n8n_meeting_booked: set(&settings.n8n.meeting_booked_url),
            resend: set(&settings.resend.api_key),
            cron_secret: set(&settings.cron.secret),
        }
    }
}

pub struct AppState {
    pub auth: AuthUseCase,
    pub records: RecordsUseCase,
    pub deals: DealsUseCase,
    pub leads: LeadsUseCase,
    pub csv_import: CsvLeadImportUseCase,
    pub bulk_import: BulkLeadImportUseCase,
    pub calling: CallingQueueUseCase,
    pub dashboard: DashboardUseCase,
    pub analytics: AnalyticsUseCase,
    pub insights: InsightsUseCase,
    pub invoicing: InvoicingUseCase,
    pub ads: AdsSyncUseCase,
    pub webhooks: LeadWebhooksUseCase,
    pub scheduling: Arc<SchedulingUseCase>,
    pub scraper: LeadScraperUseCase,
    pub email: EmailUseCase,
    pub integrations: IntegrationStatus,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

impl AppState {
    pub fn log(&self, level: &str, source: &str, message: &str) {
        super::add_log(&self.logs, level, source, message);
    }
}
