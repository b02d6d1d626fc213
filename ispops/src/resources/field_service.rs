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
use simcore::store::{Record, ResourceStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumDisplay)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WorkOrderStatus {
    Unassigned,
    Assigned,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: String,
    pub subscriber_id: String,
    pub kind: String,
    pub status: WorkOrderStatus,
    pub technician: Option<String>,
    pub address: String,
    pub scheduled_for: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Record for WorkOrder {
    fn id(&self) -> &str {
        &self.id
    }
}

pub static WORK_ORDERS: Lazy<ResourceStore<WorkOrder>> = Lazy::new(ResourceStore::new);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkOrderOverrides {
    pub id: Option<String>,
    pub subscriber_id: Option<String>,
    pub kind: Option<String>,
    pub status: Option<WorkOrderStatus>,
    pub technician: Option<String>,
    pub address: Option<String>,
    pub scheduled_for: Option<DateTime<Utc>>,
}

pub fn work_order(overrides: WorkOrderOverrides) -> WorkOrder {
    WorkOrder {
        id: overrides.id.unwrap_or_else(|| WORK_ORDERS.next_id("WO")),
        subscriber_id: overrides.subscriber_id.unwrap_or_else(|| "SUB-1".to_string()),
        kind: overrides.kind.unwrap_or_else(|| "installation".to_string()),
        status: overrides.status.unwrap_or(WorkOrderStatus::Unassigned),
        technician: overrides.technician,
        address: overrides
            .address
            .unwrap_or_else(|| "1 Exchange Street".to_string()),
        scheduled_for: overrides.scheduled_for.unwrap_or_else(Utc::now),
        completed_at: None,
    }
}

pub fn seed_work_orders(records: Vec<WorkOrder>) {
    WORK_ORDERS.seed(records);
}

pub fn clear_field_service() {
    WORK_ORDERS.clear();
}

pub fn register(router: &mut MockRouter) {
    // schedule is a literal sibling of `{id}`; register it first
    router.get("/field-service/schedule", technician_schedule);
    router.get("/field-service/work-orders", list_work_orders);
    router.post("/field-service/work-orders", create_work_order);
    router.get("/field-service/work-orders/{id}", get_work_order);
    router.post("/field-service/work-orders/{id}/assign", assign_work_order);
    router.post(
        "/field-service/work-orders/{id}/complete",
        complete_work_order,
    );
}

fn list_work_orders(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let query = ctx.list_query()?;
    let page = apply_list_query(
        WORK_ORDERS.snapshot(),
        &query,
        &["subscriber_id", "address", "kind"],
    );
    Ok(MockResponse::ok(page.into_body()))
}

fn get_work_order(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let id = ctx.param("id");
    let record = WORK_ORDERS
        .get(id)
        .ok_or_else(|| HandlerError::not_found("work order", id))?;
    Ok(MockResponse::ok(json!(record)))
}

fn create_work_order(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    ctx.required_str("subscriber_id")?;
    let overrides: WorkOrderOverrides = ctx.body_as()?;
    let record = WORK_ORDERS.insert(work_order(overrides));
    Ok(MockResponse::created(json!(record)))
}

fn assign_work_order(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let id = ctx.param("id");
    let technician = ctx.required_str("technician")?;
    let updated = WORK_ORDERS
        .update(id, |record| {
            record.technician = Some(technician.clone());
            record.status = WorkOrderStatus::Assigned;
        })
        .ok_or_else(|| HandlerError::not_found("work order", id))?;
    info!(work_order_id = %id, technician = %technician, "work order assigned");
    Ok(MockResponse::ok(json!(updated)))
}

fn complete_work_order(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let id = ctx.param("id");
    let updated = WORK_ORDERS
        .update(id, |record| {
            record.status = WorkOrderStatus::Completed;
            record.completed_at = Some(Utc::now());
        })
        .ok_or_else(|| HandlerError::not_found("work order", id))?;
    Ok(MockResponse::ok(json!(updated)))
}

/// Per-technician day schedule fabricated from the work-order store.
/// Unassigned orders are grouped under "unassigned"; a `date` filter
/// (YYYY-MM-DD) narrows to one day.
fn technician_schedule(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let date = ctx.query_value("date").map(str::to_string);
    let mut schedule: BTreeMap<String, Vec<WorkOrder>> = BTreeMap::new();
    for order in WORK_ORDERS.snapshot() {
        if let Some(date) = &date {
            if order.scheduled_for.date_naive().to_string() != *date {
                continue;
            }
        }
        let technician = order
            .technician
            .clone()
            .unwrap_or_else(|| "unassigned".to_string());
        schedule.entry(technician).or_default().push(order);
    }
    for orders in schedule.values_mut() {
        orders.sort_by(|a, b| {
            a.scheduled_for
                .cmp(&b.scheduled_for)
                .then_with(|| a.id.cmp(&b.id))
        });
    }
    Ok(MockResponse::ok(json!({ "schedule": schedule })))
}
