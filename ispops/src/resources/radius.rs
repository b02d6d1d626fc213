use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use simcore::error::HandlerError;
use simcore::query::apply_list_query;
use simcore::response::MockResponse;
use simcore::router::{MockRouter, RequestContext};
use simcore::store::{Record, ResourceStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadiusSession {
    pub id: String,
    pub subscriber_id: String,
    pub username: String,
    pub nas_ip: String,
    pub framed_ip: String,
    pub input_octets: u64,
    pub output_octets: u64,
    pub started_at: DateTime<Utc>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub terminate_cause: Option<String>,
}

impl Record for RadiusSession {
    fn id(&self) -> &str {
        &self.id
    }
}

pub static SESSIONS: Lazy<ResourceStore<RadiusSession>> = Lazy::new(ResourceStore::new);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RadiusSessionOverrides {
    pub id: Option<String>,
    pub subscriber_id: Option<String>,
    pub username: Option<String>,
    pub nas_ip: Option<String>,
    pub framed_ip: Option<String>,
    pub input_octets: Option<u64>,
    pub output_octets: Option<u64>,
    pub started_at: Option<DateTime<Utc>>,
}

pub fn radius_session(overrides: RadiusSessionOverrides) -> RadiusSession {
    let id = overrides.id.unwrap_or_else(|| SESSIONS.next_id("RAD"));
    RadiusSession {
        subscriber_id: overrides.subscriber_id.unwrap_or_else(|| "SUB-1".to_string()),
        username: overrides
            .username
            .unwrap_or_else(|| format!("{}@isp", id.to_lowercase())),
        nas_ip: overrides.nas_ip.unwrap_or_else(|| "10.0.0.1".to_string()),
        framed_ip: overrides.framed_ip.unwrap_or_else(|| "100.64.0.10".to_string()),
        input_octets: overrides.input_octets.unwrap_or(0),
        output_octets: overrides.output_octets.unwrap_or(0),
        started_at: overrides.started_at.unwrap_or_else(Utc::now),
        stopped_at: None,
        terminate_cause: None,
        id,
    }
}

pub fn seed_sessions(records: Vec<RadiusSession>) {
    SESSIONS.seed(records);
}

pub fn clear_radius() {
    SESSIONS.clear();
}

pub fn register(router: &mut MockRouter) {
    // summary precedes `{id}`
    router.get("/radius/sessions/summary", session_summary);
    router.get("/radius/sessions", list_sessions);
    router.get("/radius/sessions/{id}", get_session);
    router.post("/radius/sessions/{id}/disconnect", disconnect_session);
}

fn list_sessions(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let query = ctx.list_query()?;
    let page = apply_list_query(
        SESSIONS.snapshot(),
        &query,
        &["subscriber_id", "username", "nas_ip"],
    );
    Ok(MockResponse::ok(page.into_body()))
}

fn session_summary(_ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let snapshot = SESSIONS.snapshot();
    let active = snapshot.iter().filter(|s| s.stopped_at.is_none()).count();
    let input_octets: u64 = snapshot.iter().map(|s| s.input_octets).sum();
    let output_octets: u64 = snapshot.iter().map(|s| s.output_octets).sum();
    Ok(MockResponse::ok(json!({
        "total": snapshot.len(),
        "active": active,
        "input_octets": input_octets,
        "output_octets": output_octets,
    })))
}

fn get_session(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let id = ctx.param("id");
    let record = SESSIONS
        .get(id)
        .ok_or_else(|| HandlerError::not_found("radius session", id))?;
    Ok(MockResponse::ok(json!(record)))
}

/// Disconnect requests are acknowledged with 202: the real NAS completes
/// them asynchronously, the mock completes them immediately.
fn disconnect_session(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let id = ctx.param("id");
    let updated = SESSIONS
        .update(id, |record| {
            record.stopped_at = Some(Utc::now());
            record.terminate_cause = Some("Admin-Reset".to_string());
        })
        .ok_or_else(|| HandlerError::not_found("radius session", id))?;
    info!(session_id = %id, "radius session disconnected");
    Ok(MockResponse::accepted(json!(updated)))
}
