use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use simcore::error::HandlerError;
use simcore::query::{ListQuery, SortDirection, apply_list_query};
use simcore::response::MockResponse;
use simcore::router::{MockRouter, RequestContext};
use simcore::store::{Record, ResourceStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: String,
    pub actor: String,
    pub action: String,
    pub target: String,
    pub detail: Value,
    pub occurred_at: DateTime<Utc>,
}

impl Record for AuditEvent {
    fn id(&self) -> &str {
        &self.id
    }
}

pub static AUDIT_EVENTS: Lazy<ResourceStore<AuditEvent>> = Lazy::new(ResourceStore::new);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuditEventOverrides {
    pub id: Option<String>,
    pub actor: Option<String>,
    pub action: Option<String>,
    pub target: Option<String>,
    pub detail: Option<Value>,
    pub occurred_at: Option<DateTime<Utc>>,
}

pub fn audit_event(overrides: AuditEventOverrides) -> AuditEvent {
    AuditEvent {
        id: overrides.id.unwrap_or_else(|| AUDIT_EVENTS.next_id("EVT")),
        actor: overrides.actor.unwrap_or_else(|| "system".to_string()),
        action: overrides.action.unwrap_or_else(|| "update".to_string()),
        target: overrides.target.unwrap_or_default(),
        detail: overrides.detail.unwrap_or(Value::Null),
        occurred_at: overrides.occurred_at.unwrap_or_else(Utc::now),
    }
}

pub fn seed_audit_events(records: Vec<AuditEvent>) {
    AUDIT_EVENTS.seed(records);
}

pub fn clear_audit() {
    AUDIT_EVENTS.clear();
}

pub fn register(router: &mut MockRouter) {
    router.get("/audit/events", list_events);
    router.post("/audit/events", record_event);
}

/// Newest-first unless the caller asks for another order.
fn list_events(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let mut query: ListQuery = ctx.list_query()?;
    if query.sort.is_none() {
        query.sort = Some("occurred_at".to_string());
        query.direction = SortDirection::Descending;
    }
    let page = apply_list_query(AUDIT_EVENTS.snapshot(), &query, &["actor", "action", "target"]);
    Ok(MockResponse::ok(page.into_body()))
}

fn record_event(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    ctx.required_str("actor")?;
    ctx.required_str("action")?;
    let overrides: AuditEventOverrides = ctx.body_as()?;
    let record = AUDIT_EVENTS.insert(audit_event(overrides));
    Ok(MockResponse::created(json!(record)))
}
