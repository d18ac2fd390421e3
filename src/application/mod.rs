pub mod use_cases;

pub use use_cases::ads_sync::AdsSyncUseCase;
pub use use_cases::analytics::AnalyticsUseCase;
pub use use_cases::auth::AuthUseCase;
pub use use_cases::bulk_lead_import::BulkLeadImportUseCase;
pub use use_cases::calling_queue::CallingQueueUseCase;
pub use use_cases::csv_lead_import::CsvLeadImportUseCase;
pub use use_cases::dashboard::DashboardUseCase;
pub use use_cases::deals::DealsUseCase;
pub use use_cases::email::EmailUseCase;
pub use use_cases::insights::InsightsUseCase;
pub use use_cases::invoicing::InvoicingUseCase;
pub use use_cases::lead_scraper::LeadScraperUseCase;
pub use use_cases::lead_webhooks::LeadWebhooksUseCase;
pub use use_cases::leads::LeadsUseCase;
pub use use_cases::records::RecordsUseCase;
pub use use_cases::scheduling::SchedulingUseCase;
