use crate::domain::error::{AppError, Result};
use crate::domain::invoice::{invoice_total, Invoice, InvoiceStatus, SendInvoiceRequest};
use crate::domain::now_timestamp;
use crate::domain::profile::Profile;
use crate::infrastructure::db::repository::NewInvoice;
use crate::infrastructure::db::CrmRepository;
use crate::infrastructure::integrations::stripe::{
    GatewayInvoiceRequest, InvoiceCustomer, PaymentGateway,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

pub const DEFAULT_DAYS_UNTIL_DUE: i64 = 30;

#[derive(Debug, Serialize)]
pub struct SendInvoiceResult {
    pub ok: bool,
    pub invoice: Invoice,
    pub message: String,
}

/// Whole days from `now` until the due date, rounded up. No due date means 30.
pub fn days_until_due(due_date: Option<&str>, now: DateTime<Utc>) -> Result<i64> {
    let Some(raw) = due_date.map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(DEFAULT_DAYS_UNTIL_DUE);
    };
    let due = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::ValidationError(format!("Invalid due_date: {}", raw)))?
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AppError::ValidationError(format!("Invalid due_date: {}", raw)))?;

    let millis = (due - now).num_milliseconds();
    let days = (millis as f64 / 86_400_000.0).ceil() as i64;
    Ok(days.max(0))
}

pub struct InvoicingUseCase {
    repository: Arc<CrmRepository>,
    gateway: Option<Arc<dyn PaymentGateway>>,
}

impl InvoicingUseCase {
    pub fn new(repository: Arc<CrmRepository>, gateway: Option<Arc<dyn PaymentGateway>>) -> Self {
        Self { repository, gateway }
    }

    pub async fn list(&self) -> Result<Vec<Invoice>> {
        self.repository.list_invoices().await
    }

    /// Saves the invoice and, when a payment gateway is configured, sends it.
    /// A gateway failure still saves the invoice, as a draft.
    pub async fn send(&self, actor: &Profile, request: SendInvoiceRequest) -> Result<SendInvoiceResult> {
        request.validate()?;
        let client = self.repository.get_client(&request.client_id).await?;
        let days = days_until_due(request.due_date.as_deref(), Utc::now())?;

        let currency = request.currency.trim().to_lowercase();
        let amount_total = invoice_total(&request.line_items);
        let mut invoice = NewInvoice {
            client_id: client.id.clone(),
            created_by: actor.id.clone(),
            stripe_invoice_id: None,
            stripe_customer_id: None,
            status: InvoiceStatus::Draft,
            currency: currency.clone(),
            amount_total,
            amount_due: Some(amount_total),
            due_date: request.due_date.clone().filter(|d| !d.trim().is_empty()),
            line_items: request.line_items.iter().map(|item| item.to_line_item()).collect(),
            memo: request.memo.clone().filter(|m| !m.trim().is_empty()),
            footer: request.footer.clone().filter(|f| !f.trim().is_empty()),
            sent_at: None,
        };

        let message = match &self.gateway {
            None => "Payment key not set. Invoice saved as draft.".to_string(),
            Some(gateway) => {
                invoice.status = InvoiceStatus::Pending;
                let gateway_request = GatewayInvoiceRequest {
                    client_id: client.id.clone(),
                    customer: InvoiceCustomer {
                        name: client.name.clone(),
                        email: client.email.clone(),
                    },
                    currency,
                    days_until_due: days,
                    memo: invoice.memo.clone(),
                    footer: invoice.footer.clone(),
                    items: request.line_items.clone(),
                };
                match gateway.send_invoice(&gateway_request).await {
                    Ok(receipt) => {
                        invoice.status = InvoiceStatus::Sent;
                        invoice.sent_at = Some(now_timestamp());
                        invoice.stripe_invoice_id = Some(receipt.invoice_id);
                        invoice.stripe_customer_id = Some(receipt.customer_id);
                        "Invoice sent via Stripe.".to_string()
                    }
                    Err(e) => {
                        tracing::error!(client_id = %client.id, error = %e, "Stripe invoice failed");
                        invoice.status = InvoiceStatus::Draft;
                        format!("Stripe error: {}. Invoice saved as draft.", e.message())
                    }
                }
            }
        };

        let saved = self.repository.create_invoice(&invoice).await?;
        tracing::info!(invoice_id = %saved.id, status = saved.status.as_str(), amount = saved.amount_total, "Invoice saved");

        Ok(SendInvoiceResult {
            ok: true,
            invoice: saved,
            message,
        })
    }
}
