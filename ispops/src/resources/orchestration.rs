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
pub enum WorkflowStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub name: String,
    pub status: WorkflowStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub status: WorkflowStatus,
    pub steps: Vec<WorkflowStep>,
    pub requested_by: String,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Record for Workflow {
    fn id(&self) -> &str {
        &self.id
    }
}

pub static WORKFLOWS: Lazy<ResourceStore<Workflow>> = Lazy::new(ResourceStore::new);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkflowOverrides {
    pub id: Option<String>,
    pub name: Option<String>,
    pub kind: Option<String>,
    pub status: Option<WorkflowStatus>,
    pub steps: Option<Vec<WorkflowStep>>,
    pub requested_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// The fabricated step list per workflow kind. Unknown kinds get a single
/// generic step, which is what the simulated orchestrator does for
/// ad-hoc jobs.
fn steps_for_kind(kind: &str) -> Vec<WorkflowStep> {
    let names: &[&str] = match kind {
        "provision_subscriber" => &["allocate_ip", "configure_ont", "enable_radius"],
        "suspend_subscriber" => &["disable_radius", "notify_subscriber"],
        "decommission_ont" => &["release_ip", "deprovision_ont"],
        _ => &["execute"],
    };
    names
        .iter()
        .map(|name| WorkflowStep {
            name: name.to_string(),
            status: WorkflowStatus::Pending,
        })
        .collect()
}

pub fn workflow(overrides: WorkflowOverrides) -> Workflow {
    let kind = overrides
        .kind
        .unwrap_or_else(|| "provision_subscriber".to_string());
    Workflow {
        id: overrides.id.unwrap_or_else(|| WORKFLOWS.next_id("WF")),
        name: overrides.name.unwrap_or_else(|| kind.clone()),
        status: overrides.status.unwrap_or(WorkflowStatus::Pending),
        steps: overrides.steps.unwrap_or_else(|| steps_for_kind(&kind)),
        requested_by: overrides.requested_by.unwrap_or_else(|| "system".to_string()),
        created_at: overrides.created_at.unwrap_or_else(Utc::now),
        finished_at: None,
        kind,
    }
}

pub fn seed_workflows(records: Vec<Workflow>) {
    WORKFLOWS.seed(records);
}

pub fn clear_orchestration() {
    WORKFLOWS.clear();
}

pub fn register(router: &mut MockRouter) {
    // summary precedes `{id}`
    router.get("/orchestration/workflows/summary", workflow_summary);
    router.get("/orchestration/workflows", list_workflows);
    router.post("/orchestration/workflows", create_workflow);
    router.get("/orchestration/workflows/{id}", get_workflow);
    router.post("/orchestration/workflows/{id}/cancel", cancel_workflow);
}

fn list_workflows(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let query = ctx.list_query()?;
    let page = apply_list_query(WORKFLOWS.snapshot(), &query, &["name", "kind", "requested_by"]);
    Ok(MockResponse::ok(page.into_body()))
}

fn workflow_summary(_ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let snapshot = WORKFLOWS.snapshot();
    let mut by_status: BTreeMap<String, u64> = BTreeMap::new();
    for record in &snapshot {
        *by_status.entry(record.status.to_string()).or_insert(0) += 1;
    }
    Ok(MockResponse::ok(json!({
        "total": snapshot.len(),
        "by_status": by_status,
    })))
}

fn get_workflow(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let id = ctx.param("id");
    let record = WORKFLOWS
        .get(id)
        .ok_or_else(|| HandlerError::not_found("workflow", id))?;
    Ok(MockResponse::ok(json!(record)))
}

fn create_workflow(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    ctx.required_str("kind")?;
    let overrides: WorkflowOverrides = ctx.body_as()?;
    let record = WORKFLOWS.insert(workflow(overrides));
    info!(workflow_id = %record.id, kind = %record.kind, "workflow created");
    Ok(MockResponse::created(json!(record)))
}

/// Cancellation overwrites the status whatever state the workflow is in;
/// the simulated orchestrator does not reject late cancels.
fn cancel_workflow(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let id = ctx.param("id");
    let updated = WORKFLOWS
        .update(id, |record| {
            record.status = WorkflowStatus::Cancelled;
            record.finished_at = Some(Utc::now());
        })
        .ok_or_else(|| HandlerError::not_found("workflow", id))?;
    Ok(MockResponse::ok(json!(updated)))
}
