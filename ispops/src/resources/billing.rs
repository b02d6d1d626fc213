use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::json;
use strum_macros::Display as EnumDisplay;
use tracing::info;

use simcore::error::HandlerError;
use simcore::query::apply_list_query;
use simcore::response::MockResponse;
use simcore::router::{MockRouter, RequestContext};
use simcore::store::{Record, ResourceStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumDisplay)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InvoiceStatus {
    Open,
    Paid,
    PastDue,
    Voided,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub subscriber_id: String,
    pub status: InvoiceStatus,
    pub amount_cents: i64,
    pub period: String,
    pub issued_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
}

impl Record for Invoice {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub invoice_id: String,
    pub amount_cents: i64,
    pub method: String,
    pub received_at: DateTime<Utc>,
}

impl Record for Payment {
    fn id(&self) -> &str {
        &self.id
    }
}

pub static INVOICES: Lazy<ResourceStore<Invoice>> = Lazy::new(ResourceStore::new);
pub static PAYMENTS: Lazy<ResourceStore<Payment>> = Lazy::new(ResourceStore::new);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InvoiceOverrides {
    pub id: Option<String>,
    pub subscriber_id: Option<String>,
    pub status: Option<InvoiceStatus>,
    pub amount_cents: Option<i64>,
    pub period: Option<String>,
    pub issued_at: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
}

pub fn invoice(overrides: InvoiceOverrides) -> Invoice {
    let now = Utc::now();
    Invoice {
        id: overrides.id.unwrap_or_else(|| INVOICES.next_id("INV")),
        subscriber_id: overrides.subscriber_id.unwrap_or_else(|| "SUB-1".to_string()),
        status: overrides.status.unwrap_or(InvoiceStatus::Open),
        amount_cents: overrides.amount_cents.unwrap_or(4_900),
        period: overrides.period.unwrap_or_else(|| "2026-07".to_string()),
        issued_at: overrides.issued_at.unwrap_or(now),
        due_at: overrides.due_at.unwrap_or(now + chrono::Duration::days(14)),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaymentOverrides {
    pub id: Option<String>,
    pub invoice_id: Option<String>,
    pub amount_cents: Option<i64>,
    pub method: Option<String>,
    pub received_at: Option<DateTime<Utc>>,
}

pub fn payment(overrides: PaymentOverrides) -> Payment {
    Payment {
        id: overrides.id.unwrap_or_else(|| PAYMENTS.next_id("PAY")),
        invoice_id: overrides.invoice_id.unwrap_or_else(|| "INV-1".to_string()),
        amount_cents: overrides.amount_cents.unwrap_or(4_900),
        method: overrides.method.unwrap_or_else(|| "card".to_string()),
        received_at: overrides.received_at.unwrap_or_else(Utc::now),
    }
}

pub fn seed_invoices(records: Vec<Invoice>) {
    INVOICES.seed(records);
}

pub fn seed_payments(records: Vec<Payment>) {
    PAYMENTS.seed(records);
}

pub fn clear_billing() {
    INVOICES.clear();
    PAYMENTS.clear();
}

const INVOICE_SEARCH_FIELDS: &[&str] = &["subscriber_id", "period"];

pub fn register(router: &mut MockRouter) {
    router.get("/billing/invoices", list_invoices);
    router.post("/billing/invoices", create_invoice);
    router.get("/billing/invoices/{id}", get_invoice);
    router.post("/billing/invoices/{id}/void", void_invoice);
    router.get("/billing/payments", list_payments);
    router.post("/billing/payments", record_payment);
}

fn list_invoices(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let query = ctx.list_query()?;
    let page = apply_list_query(INVOICES.snapshot(), &query, INVOICE_SEARCH_FIELDS);
    Ok(MockResponse::ok(page.into_body()))
}

fn get_invoice(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let id = ctx.param("id");
    let record = INVOICES
        .get(id)
        .ok_or_else(|| HandlerError::not_found("invoice", id))?;
    Ok(MockResponse::ok(json!(record)))
}

fn create_invoice(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    ctx.required_str("subscriber_id")?;
    let overrides: InvoiceOverrides = ctx.body_as()?;
    let record = INVOICES.insert(invoice(overrides));
    Ok(MockResponse::created(json!(record)))
}

fn void_invoice(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let id = ctx.param("id");
    let updated = INVOICES
        .update(id, |record| record.status = InvoiceStatus::Voided)
        .ok_or_else(|| HandlerError::not_found("invoice", id))?;
    info!(invoice_id = %id, "invoice voided");
    Ok(MockResponse::ok(json!(updated)))
}

fn list_payments(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let query = ctx.list_query()?;
    let page = apply_list_query(PAYMENTS.snapshot(), &query, &["invoice_id", "method"]);
    Ok(MockResponse::ok(page.into_body()))
}

fn record_payment(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let body = ctx.body_object()?;
    if !body.get("amount_cents").map(|v| v.is_i64()).unwrap_or(false) {
        return Err(HandlerError::bad_request("amount_cents is required"));
    }
    ctx.required_str("invoice_id")?;
    let overrides: PaymentOverrides = ctx.body_as()?;
    let record = PAYMENTS.insert(payment(overrides));
    // No referential check: a payment may reference an invoice ID that
    // exists only in the caller's fixtures.
    Ok(MockResponse::created(json!(record)))
}
