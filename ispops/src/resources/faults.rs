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
pub enum AlarmStatus {
    Active,
    Acknowledged,
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumDisplay)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlarmSeverity {
    Critical,
    Major,
    Minor,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alarm {
    pub id: String,
    pub device: String,
    pub severity: AlarmSeverity,
    pub status: AlarmStatus,
    pub message: String,
    pub raised_at: DateTime<Utc>,
    pub acknowledged_by: Option<String>,
    pub cleared_at: Option<DateTime<Utc>>,
}

impl Record for Alarm {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Trouble ticket. Documented transitions are
/// pending -> in_progress -> completed | cancelled, but handlers overwrite
/// the status unconditionally, like the backend they simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumDisplay)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TicketStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub subscriber_id: String,
    pub subject: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Ticket {
    fn id(&self) -> &str {
        &self.id
    }
}

pub static ALARMS: Lazy<ResourceStore<Alarm>> = Lazy::new(ResourceStore::new);
pub static TICKETS: Lazy<ResourceStore<Ticket>> = Lazy::new(ResourceStore::new);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlarmOverrides {
    pub id: Option<String>,
    pub device: Option<String>,
    pub severity: Option<AlarmSeverity>,
    pub status: Option<AlarmStatus>,
    pub message: Option<String>,
    pub raised_at: Option<DateTime<Utc>>,
}

pub fn alarm(overrides: AlarmOverrides) -> Alarm {
    Alarm {
        id: overrides.id.unwrap_or_else(|| ALARMS.next_id("ALM")),
        device: overrides.device.unwrap_or_else(|| "olt-01".to_string()),
        severity: overrides.severity.unwrap_or(AlarmSeverity::Major),
        status: overrides.status.unwrap_or(AlarmStatus::Active),
        message: overrides
            .message
            .unwrap_or_else(|| "loss of signal".to_string()),
        raised_at: overrides.raised_at.unwrap_or_else(Utc::now),
        acknowledged_by: None,
        cleared_at: None,
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TicketOverrides {
    pub id: Option<String>,
    pub subscriber_id: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub status: Option<TicketStatus>,
    pub priority: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

pub fn ticket(overrides: TicketOverrides) -> Ticket {
    let now = Utc::now();
    Ticket {
        id: overrides.id.unwrap_or_else(|| TICKETS.next_id("TCK")),
        subscriber_id: overrides.subscriber_id.unwrap_or_else(|| "SUB-1".to_string()),
        subject: overrides.subject.unwrap_or_else(|| "no sync".to_string()),
        description: overrides.description.unwrap_or_default(),
        status: overrides.status.unwrap_or(TicketStatus::Pending),
        priority: overrides.priority.unwrap_or_else(|| "normal".to_string()),
        created_at: overrides.created_at.unwrap_or(now),
        updated_at: now,
    }
}

pub fn seed_alarms(records: Vec<Alarm>) {
    ALARMS.seed(records);
}

pub fn seed_tickets(records: Vec<Ticket>) {
    TICKETS.seed(records);
}

pub fn clear_faults() {
    ALARMS.clear();
    TICKETS.clear();
}

pub fn register(router: &mut MockRouter) {
    router.get("/faults/alarms", list_alarms);
    router.post("/faults/alarms/{id}/acknowledge", acknowledge_alarm);
    router.post("/faults/alarms/{id}/clear", clear_alarm);
    router.get("/faults/tickets", list_tickets);
    router.post("/faults/tickets", create_ticket);
    router.get("/faults/tickets/{id}", get_ticket);
    router.patch("/faults/tickets/{id}", patch_ticket);
}

fn list_alarms(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let query = ctx.list_query()?;
    let page = apply_list_query(ALARMS.snapshot(), &query, &["device", "message"]);
    Ok(MockResponse::ok(page.into_body()))
}

/// Shared store mutation: the GraphQL `AcknowledgeAlarm` operation funnels
/// through the same function.
pub fn acknowledge(id: &str, acknowledged_by: Option<String>) -> Result<Alarm, HandlerError> {
    ALARMS
        .update(id, |record| {
            record.status = AlarmStatus::Acknowledged;
            record.acknowledged_by =
                Some(acknowledged_by.clone().unwrap_or_else(|| "noc".to_string()));
        })
        .ok_or_else(|| HandlerError::not_found("alarm", id))
}

fn acknowledge_alarm(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let id = ctx.param("id");
    let acknowledged_by = ctx
        .body
        .as_ref()
        .and_then(|b| b.get("acknowledged_by"))
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let updated = acknowledge(id, acknowledged_by)?;
    info!(alarm_id = %id, "alarm acknowledged");
    Ok(MockResponse::ok(json!(updated)))
}

fn clear_alarm(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let id = ctx.param("id");
    let updated = ALARMS
        .update(id, |record| {
            record.status = AlarmStatus::Cleared;
            record.cleared_at = Some(Utc::now());
        })
        .ok_or_else(|| HandlerError::not_found("alarm", id))?;
    Ok(MockResponse::ok(json!(updated)))
}

fn list_tickets(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let query = ctx.list_query()?;
    let page = apply_list_query(TICKETS.snapshot(), &query, &["subject", "description"]);
    Ok(MockResponse::ok(page.into_body()))
}

fn create_ticket(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    ctx.required_str("subject")?;
    let overrides: TicketOverrides = ctx.body_as()?;
    let record = TICKETS.insert(ticket(overrides));
    Ok(MockResponse::created(json!(record)))
}

fn get_ticket(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let id = ctx.param("id");
    let record = TICKETS
        .get(id)
        .ok_or_else(|| HandlerError::not_found("ticket", id))?;
    Ok(MockResponse::ok(json!(record)))
}

/// Partial update, including an unconditional status overwrite when the
/// patch carries one.
fn patch_ticket(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let id = ctx.param("id");
    let patch = ctx.body_object()?.clone();
    let current = TICKETS
        .get(id)
        .ok_or_else(|| HandlerError::not_found("ticket", id))?;
    let mut updated = apply_patch(&current, &patch).map_err(HandlerError::BadRequest)?;
    updated.updated_at = Utc::now();
    let saved = TICKETS
        .update(id, |record| *record = updated.clone())
        .ok_or_else(|| HandlerError::not_found("ticket", id))?;
    Ok(MockResponse::ok(json!(saved)))
}
