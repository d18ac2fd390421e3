use crate::domain::error::{AppError, Result};
use crate::domain::invoice::{Invoice, InvoiceLineItem, InvoiceStatus};
use crate::domain::{new_id, now_timestamp};

use super::entities::InvoiceEntity;
use super::CrmRepository;

const INVOICE_SELECT: &str =
    "SELECT i.*, c.name AS client_name FROM invoices i LEFT JOIN clients c ON c.id = i.client_id";

#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub client_id: String,
    pub created_by: String,
    pub stripe_invoice_id: Option<String>,
    pub stripe_customer_id: Option<String>,
    pub status: InvoiceStatus,
    pub currency: String,
    pub amount_total: f64,
    pub amount_due: Option<f64>,
    pub due_date: Option<String>,
    pub line_items: Vec<InvoiceLineItem>,
    pub memo: Option<String>,
    pub footer: Option<String>,
    pub sent_at: Option<String>,
}

impl CrmRepository {
    pub async fn create_invoice(&self, invoice: &NewInvoice) -> Result<Invoice> {
        let id = new_id();
        let now = now_timestamp();
        let line_items = serde_json::to_string(&invoice.line_items)
            .map_err(|e| AppError::Internal(format!("Failed to encode line items: {}", e)))?;

        sqlx::query(
            "INSERT INTO invoices (id, client_id, created_by, stripe_invoice_id, stripe_customer_id, status, currency, \
             amount_total, amount_due, due_date, line_items, memo, footer, sent_at, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&invoice.client_id)
        .bind(&invoice.created_by)
        .bind(&invoice.stripe_invoice_id)
        .bind(&invoice.stripe_customer_id)
        .bind(invoice.status.as_str())
        .bind(&invoice.currency)
        .bind(invoice.amount_total)
        .bind(invoice.amount_due)
        .bind(&invoice.due_date)
        .bind(line_items)
        .bind(&invoice.memo)
        .bind(&invoice.footer)
        .bind(&invoice.sent_at)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create invoice: {}", e)))?;

        self.get_invoice(&id).await
    }

    pub async fn get_invoice(&self, id: &str) -> Result<Invoice> {
        let invoice = sqlx::query_as::<_, InvoiceEntity>(&format!("{INVOICE_SELECT} WHERE i.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch invoice: {}", e)))?;

        match invoice {
            Some(invoice) => Ok(invoice.into()),
            None => Err(AppError::NotFound(format!("Invoice not found: {}", id))),
        }
    }

    pub async fn list_invoices(&self) -> Result<Vec<Invoice>> {
        let invoices = sqlx::query_as::<_, InvoiceEntity>(&format!(
            "{INVOICE_SELECT} ORDER BY i.created_at DESC, i.rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list invoices: {}", e)))?;

        Ok(invoices.into_iter().map(Into::into).collect())
    }
}
