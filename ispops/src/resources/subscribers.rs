use std::collections::BTreeMap;

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
use simcore::store::{Record, ResourceStore, apply_patch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumDisplay)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubscriberStatus {
    Active,
    Suspended,
    Cancelled,
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: String,
    pub name: String,
    pub email: String,
    pub service_id: String,
    pub plan: String,
    pub status: SubscriberStatus,
    pub balance_cents: i64,
    /// Plain string, never validated against the partner store.
    pub partner_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Subscriber {
    fn id(&self) -> &str {
        &self.id
    }
}

pub static SUBSCRIBERS: Lazy<ResourceStore<Subscriber>> = Lazy::new(ResourceStore::new);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubscriberOverrides {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub service_id: Option<String>,
    pub plan: Option<String>,
    pub status: Option<SubscriberStatus>,
    pub balance_cents: Option<i64>,
    pub partner_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Build a fully-populated subscriber from partial input. Precedence:
/// explicit override > computed default > static default.
pub fn subscriber(overrides: SubscriberOverrides) -> Subscriber {
    let now = Utc::now();
    let id = overrides.id.unwrap_or_else(|| SUBSCRIBERS.next_id("SUB"));
    Subscriber {
        name: overrides.name.unwrap_or_else(|| "Jane Doe".to_string()),
        email: overrides
            .email
            .unwrap_or_else(|| format!("{}@example.net", id.to_lowercase())),
        service_id: overrides
            .service_id
            .unwrap_or_else(|| format!("svc-{}", id.to_lowercase())),
        plan: overrides.plan.unwrap_or_else(|| "fiber_100".to_string()),
        status: overrides.status.unwrap_or(SubscriberStatus::Active),
        balance_cents: overrides.balance_cents.unwrap_or(0),
        partner_id: overrides.partner_id,
        created_at: overrides.created_at.unwrap_or(now),
        updated_at: now,
        id,
    }
}

pub fn seed_subscribers(records: Vec<Subscriber>) {
    SUBSCRIBERS.seed(records);
}

pub fn clear_subscribers() {
    SUBSCRIBERS.clear();
}

const SEARCH_FIELDS: &[&str] = &["name", "email", "service_id"];

pub fn register(router: &mut MockRouter) {
    // summary must precede `{id}`: the parameterized route would capture
    // the literal "summary" segment as an ID
    router.get("/subscribers/summary", subscriber_summary);
    router.get("/subscribers", list_subscribers);
    router.post("/subscribers", create_subscriber);
    router.get("/subscribers/{id}", get_subscriber);
    router.put("/subscribers/{id}", update_subscriber);
    router.delete("/subscribers/{id}", delete_subscriber);
    router.post("/subscribers/{id}/suspend", suspend_subscriber);
    router.post("/subscribers/{id}/resume", resume_subscriber);
}

fn list_subscribers(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let query = ctx.list_query()?;
    let page = apply_list_query(SUBSCRIBERS.snapshot(), &query, SEARCH_FIELDS);
    Ok(MockResponse::ok(page.into_body()))
}

fn subscriber_summary(_ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let snapshot = SUBSCRIBERS.snapshot();
    let mut by_status: BTreeMap<String, u64> = BTreeMap::new();
    for record in &snapshot {
        *by_status.entry(record.status.to_string()).or_insert(0) += 1;
    }
    Ok(MockResponse::ok(json!({
        "total": snapshot.len(),
        "by_status": by_status,
    })))
}

fn get_subscriber(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let id = ctx.param("id");
    let record = SUBSCRIBERS
        .get(id)
        .ok_or_else(|| HandlerError::not_found("subscriber", id))?;
    Ok(MockResponse::ok(json!(record)))
}

fn create_subscriber(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    ctx.required_str("name")?;
    let overrides: SubscriberOverrides = ctx.body_as()?;
    let record = SUBSCRIBERS.insert(subscriber(overrides));
    info!(subscriber_id = %record.id, "created subscriber");
    Ok(MockResponse::created(json!(record)))
}

fn update_subscriber(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let id = ctx.param("id");
    let patch = ctx.body_object()?.clone();
    let current = SUBSCRIBERS
        .get(id)
        .ok_or_else(|| HandlerError::not_found("subscriber", id))?;
    let mut updated = apply_patch(&current, &patch).map_err(HandlerError::BadRequest)?;
    updated.updated_at = Utc::now();
    let saved = SUBSCRIBERS
        .update(id, |record| *record = updated.clone())
        .ok_or_else(|| HandlerError::not_found("subscriber", id))?;
    Ok(MockResponse::ok(json!(saved)))
}

fn delete_subscriber(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let id = ctx.param("id");
    SUBSCRIBERS
        .remove(id)
        .ok_or_else(|| HandlerError::not_found("subscriber", id))?;
    Ok(MockResponse::no_content())
}

fn suspend_subscriber(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    set_status(ctx, SubscriberStatus::Suspended)
}

fn resume_subscriber(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    set_status(ctx, SubscriberStatus::Active)
}

fn set_status(
    ctx: &RequestContext,
    status: SubscriberStatus,
) -> Result<MockResponse, HandlerError> {
    let id = ctx.param("id");
    let updated = SUBSCRIBERS
        .update(id, |record| {
            record.status = status;
            record.updated_at = Utc::now();
        })
        .ok_or_else(|| HandlerError::not_found("subscriber", id))?;
    info!(subscriber_id = %id, status = %status, "subscriber status changed");
    Ok(MockResponse::ok(json!(updated)))
}
