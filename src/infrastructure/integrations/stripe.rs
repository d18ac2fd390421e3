use async_trait::async_trait;
use serde_json::Value;

use super::{join_url, read_json};
use crate::domain::error::{AppError, Result};
use crate::domain::invoice::{to_minor_units, LineItemInput};

const STRIPE_API_BASE: &str = "https://api.stripe.com";

#[derive(Debug, Clone)]
pub struct InvoiceCustomer {
    pub name: String,
    pub email: Option<String>,
}

/// Everything the gateway needs to bill one client.
#[derive(Debug, Clone)]
pub struct GatewayInvoiceRequest {
    pub client_id: String,
    pub customer: InvoiceCustomer,
    pub currency: String,
    pub days_until_due: i64,
    pub memo: Option<String>,
    pub footer: Option<String>,
    pub items: Vec<LineItemInput>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayReceipt {
    pub customer_id: String,
    pub invoice_id: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates, finalizes and sends an invoice. Monthly items also get a subscription.
    async fn send_invoice(&self, request: &GatewayInvoiceRequest) -> Result<GatewayReceipt>;
}

pub struct StripeClient {
    client: reqwest::Client,
    secret_key: String,
    base_url: String,
}

type Form = Vec<(String, String)>;

impl StripeClient {
    pub fn new(secret_key: String) -> Self {
        Self {
            client: super::http_client(super::DEFAULT_HTTP_TIMEOUT),
            secret_key,
            base_url: STRIPE_API_BASE.to_string(),
        }
    }

    async fn post(&self, path: &str, form: &Form) -> Result<Value> {
        let response = self
            .client
            .post(join_url(&self.base_url, path))
            .basic_auth(&self.secret_key, Some(""))
            .form(form)
            .send()
            .await?;

        read_json("Stripe", response).await
    }

    fn id_of(value: &Value, what: &str) -> Result<String> {
        value["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AppError::Upstream(format!("Stripe {} response has no id", what)))
    }
}

fn field(key: &str, value: impl ToString) -> (String, String) {
    (key.to_string(), value.to_string())
}

/// Stripe quantities are whole numbers.
fn whole_quantity(quantity: f64) -> i64 {
    quantity.round().max(1.0) as i64
}

pub(crate) fn customer_form(customer: &InvoiceCustomer) -> Form {
    let mut form = vec![field("name", &customer.name)];
    if let Some(email) = &customer.email {
        form.push(field("email", email));
    }
    form
}

pub(crate) fn invoice_form(request: &GatewayInvoiceRequest, customer_id: &str) -> Form {
    let mut form = vec![
        field("customer", customer_id),
        field("collection_method", "send_invoice"),
        field("days_until_due", request.days_until_due),
        field("metadata[crm_client_id]", &request.client_id),
    ];
    if let Some(memo) = &request.memo {
        form.push(field("description", memo));
    }
    if let Some(footer) = &request.footer {
        form.push(field("footer", footer));
    }
    form
}

pub(crate) fn invoice_item_form(
    item: &LineItemInput,
    currency: &str,
    customer_id: &str,
    invoice_id: &str,
    subscription_id: Option<&str>,
) -> Form {
    let description = match subscription_id {
        Some(_) => format!("{} (Monthly recurring)", item.description),
        None => item.description.clone(),
    };
    let mut form = vec![
        field("customer", customer_id),
        field("invoice", invoice_id),
        field("description", description),
        field("quantity", whole_quantity(item.quantity)),
        field("unit_amount_decimal", to_minor_units(item.unit_amount)),
        field("currency", currency),
    ];
    if let Some(subscription_id) = subscription_id {
        form.push(field("subscription", subscription_id));
    }
    form
}

pub(crate) fn monthly_price_form(item: &LineItemInput, currency: &str) -> Form {
    vec![
        field("currency", currency),
        field("unit_amount", to_minor_units(item.unit_amount)),
        field("recurring[interval]", "month"),
        field("product_data[name]", &item.description),
    ]
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn send_invoice(&self, request: &GatewayInvoiceRequest) -> Result<GatewayReceipt> {
        let currency = request.currency.to_lowercase();

        let customer = self.post("v1/customers", &customer_form(&request.customer)).await?;
        let customer_id = Self::id_of(&customer, "customer")?;

        let invoice = self
            .post("v1/invoices", &invoice_form(request, &customer_id))
            .await?;
        let invoice_id = Self::id_of(&invoice, "invoice")?;

        for item in request.items.iter().filter(|item| !item.is_monthly) {
            self.post(
                "v1/invoiceitems",
                &invoice_item_form(item, &currency, &customer_id, &invoice_id, None),
            )
            .await?;
        }

        for item in request.items.iter().filter(|item| item.is_monthly) {
            let price = self
                .post("v1/prices", &monthly_price_form(item, &currency))
                .await?;
            let price_id = Self::id_of(&price, "price")?;

            let subscription = self
                .post(
                    "v1/subscriptions",
                    &vec![
                        field("customer", &customer_id),
                        field("items[0][price]", &price_id),
                        field("items[0][quantity]", whole_quantity(item.quantity)),
                        field("collection_method", "send_invoice"),
                        field("days_until_due", request.days_until_due),
                        field("metadata[crm_client_id]", &request.client_id),
                        field("metadata[crm_invoice_id]", &invoice_id),
                        field("metadata[is_invoice_item]", "true"),
                    ],
                )
                .await?;
            let subscription_id = Self::id_of(&subscription, "subscription")?;

            self.post(
                "v1/invoiceitems",
                &invoice_item_form(item, &currency, &customer_id, &invoice_id, Some(&subscription_id)),
            )
            .await?;
        }

        self.post(&format!("v1/invoices/{}/finalize", invoice_id), &Vec::new())
            .await?;
        self.post(&format!("v1/invoices/{}/send", invoice_id), &Vec::new())
            .await?;

        tracing::info!(invoice_id = %invoice_id, customer_id = %customer_id, "Stripe invoice sent");

        Ok(GatewayReceipt {
            customer_id,
            invoice_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(is_monthly: bool) -> LineItemInput {
        LineItemInput {
            description: "Hosting".to_string(),
            quantity: 2.0,
            unit_amount: 49.99,
            amount: None,
            is_monthly,
        }
    }

    fn value_of<'a>(form: &'a Form, key: &str) -> Option<&'a str> {
        form.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn invoice_item_uses_minor_units() {
        let form = invoice_item_form(&item(false), "usd", "cus_1", "in_1", None);
        assert_eq!(value_of(&form, "unit_amount_decimal"), Some("4999"));
        assert_eq!(value_of(&form, "quantity"), Some("2"));
        assert_eq!(value_of(&form, "subscription"), None);
    }

    #[test]
    fn recurring_item_is_labelled_and_linked() {
        let form = invoice_item_form(&item(true), "usd", "cus_1", "in_1", Some("sub_1"));
        assert_eq!(value_of(&form, "description"), Some("Hosting (Monthly recurring)"));
        assert_eq!(value_of(&form, "subscription"), Some("sub_1"));

        let price = monthly_price_form(&item(true), "cad");
        assert_eq!(value_of(&price, "recurring[interval]"), Some("month"));
        assert_eq!(value_of(&price, "currency"), Some("cad"));
    }

    #[test]
    fn invoice_form_skips_missing_memo() {
        let request = GatewayInvoiceRequest {
            client_id: "c1".to_string(),
            customer: InvoiceCustomer {
                name: "Acme".to_string(),
                email: None,
            },
            currency: "usd".to_string(),
            days_until_due: 14,
            memo: None,
            footer: Some("Thanks".to_string()),
            items: vec![item(false)],
        };
        let form = invoice_form(&request, "cus_1");
        assert_eq!(value_of(&form, "days_until_due"), Some("14"));
        assert_eq!(value_of(&form, "description"), None);
        assert_eq!(value_of(&form, "footer"), Some("Thanks"));
        assert_eq!(customer_form(&request.customer).len(), 1);
    }
}
