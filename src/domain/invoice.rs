use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Pending,
    Sent,
    Paid,
    Void,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Void => "void",
        }
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "draft" => Ok(InvoiceStatus::Draft),
            "pending" => Ok(InvoiceStatus::Pending),
            "sent" => Ok(InvoiceStatus::Sent),
            "paid" => Ok(InvoiceStatus::Paid),
            "void" => Ok(InvoiceStatus::Void),
            other => Err(format!("Unknown invoice status: {}", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InvoiceLineItem {
    pub description: String,
    pub quantity: f64,
    pub unit_amount: f64,
    pub amount: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Invoice {
    pub id: String,
    pub client_id: String,
    pub client_name: Option<String>,
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
    pub paid_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct LineItemInput {
    #[validate(length(min = 1, message = "Line item description is required"))]
    pub description: String,
    #[validate(range(min = 0.0, message = "Quantity cannot be negative"))]
    #[serde(default)]
    pub quantity: f64,
    #[validate(range(min = 0.0, message = "Unit amount cannot be negative"))]
    #[serde(default)]
    pub unit_amount: f64,
    #[serde(default)]
    pub amount: Option<f64>,
    /// Billed monthly through a subscription instead of once.
    #[serde(default)]
    pub is_monthly: bool,
}

impl LineItemInput {
    pub fn to_line_item(&self) -> InvoiceLineItem {
        InvoiceLineItem {
            description: self.description.clone(),
            quantity: self.quantity,
            unit_amount: self.unit_amount,
            amount: self.amount.unwrap_or(self.quantity * self.unit_amount),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct SendInvoiceRequest {
    #[validate(length(min = 1, message = "client_id is required"))]
    pub client_id: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub footer: Option<String>,
    #[validate(length(min = 1, message = "At least one line item is required"), nested)]
    pub line_items: Vec<LineItemInput>,
}

fn default_currency() -> String {
    "usd".to_string()
}

/// Σ quantity × unit_amount over every line, one-time and monthly alike.
pub fn invoice_total(items: &[LineItemInput]) -> f64 {
    items
        .iter()
        .map(|item| item.quantity * item.unit_amount)
        .sum()
}

/// Amount in the currency's minor unit (cents), as payment APIs expect.
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}
