pub mod ads_sync;
pub mod analytics;
pub mod auth;
pub mod bulk_lead_import;
pub mod calling_queue;
pub mod csv_lead_import;
pub mod dashboard;
pub mod deals;
pub mod email;
pub mod insights;
pub mod invoicing;
pub mod lead_scraper;
pub mod lead_webhooks;
pub mod leads;
pub mod records;
pub mod scheduling;
