use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::json;

use simcore::error::HandlerError;
use simcore::query::apply_list_query;
use simcore::response::MockResponse;
use simcore::router::{MockRouter, RequestContext};
use simcore::store::{Record, ResourceStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entitlement {
    pub id: String,
    pub feature: String,
    pub seats: u32,
    pub seats_used: u32,
    pub expires_at: DateTime<Utc>,
}

impl Record for Entitlement {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activation {
    pub id: String,
    pub license_key: String,
    pub hostname: String,
    pub activated_at: DateTime<Utc>,
}

impl Record for Activation {
    fn id(&self) -> &str {
        &self.id
    }
}

pub static ENTITLEMENTS: Lazy<ResourceStore<Entitlement>> = Lazy::new(ResourceStore::new);
pub static ACTIVATIONS: Lazy<ResourceStore<Activation>> = Lazy::new(ResourceStore::new);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EntitlementOverrides {
    pub id: Option<String>,
    pub feature: Option<String>,
    pub seats: Option<u32>,
    pub seats_used: Option<u32>,
    pub expires_at: Option<DateTime<Utc>>,
}

pub fn entitlement(overrides: EntitlementOverrides) -> Entitlement {
    Entitlement {
        id: overrides.id.unwrap_or_else(|| ENTITLEMENTS.next_id("ENT")),
        feature: overrides
            .feature
            .unwrap_or_else(|| "radius_accounting".to_string()),
        seats: overrides.seats.unwrap_or(10),
        seats_used: overrides.seats_used.unwrap_or(0),
        expires_at: overrides
            .expires_at
            .unwrap_or_else(|| Utc::now() + chrono::Duration::days(365)),
    }
}

pub fn seed_entitlements(records: Vec<Entitlement>) {
    ENTITLEMENTS.seed(records);
}

pub fn clear_licensing() {
    ENTITLEMENTS.clear();
    ACTIVATIONS.clear();
}

pub fn register(router: &mut MockRouter) {
    router.get("/licensing/entitlements", list_entitlements);
    router.get("/licensing/activations", list_activations);
    router.post("/licensing/activate", activate);
}

fn list_entitlements(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let query = ctx.list_query()?;
    let page = apply_list_query(ENTITLEMENTS.snapshot(), &query, &["feature"]);
    Ok(MockResponse::ok(page.into_body()))
}

fn list_activations(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let query = ctx.list_query()?;
    let page = apply_list_query(ACTIVATIONS.snapshot(), &query, &["license_key", "hostname"]);
    Ok(MockResponse::ok(page.into_body()))
}

fn activate(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let license_key = ctx.required_str("license_key")?;
    let hostname = ctx
        .body_object()?
        .get("hostname")
        .and_then(|v| v.as_str())
        .unwrap_or("localhost")
        .to_string();
    let record = ACTIVATIONS.insert(Activation {
        id: ACTIVATIONS.next_id("ACT"),
        license_key,
        hostname,
        activated_at: Utc::now(),
    });
    Ok(MockResponse::created(json!(record)))
}
