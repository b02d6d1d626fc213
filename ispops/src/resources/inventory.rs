use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::json;
use strum_macros::Display as EnumDisplay;

use simcore::error::HandlerError;
use simcore::query::apply_list_query;
use simcore::response::MockResponse;
use simcore::router::{MockRouter, RequestContext};
use simcore::store::{Record, ResourceStore, apply_patch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumDisplay)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeviceStatus {
    Online,
    Offline,
    Degraded,
    Provisioning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Olt {
    pub id: String,
    pub name: String,
    pub site: String,
    pub status: DeviceStatus,
    pub pon_ports: u32,
}

impl Record for Olt {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ont {
    pub id: String,
    /// Plain string reference to an OLT, unvalidated.
    pub olt_id: String,
    pub serial: String,
    pub subscriber_id: Option<String>,
    pub status: DeviceStatus,
    pub rx_power_dbm: f64,
    pub last_seen_at: DateTime<Utc>,
}

impl Record for Ont {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessPoint {
    pub id: String,
    pub name: String,
    pub site: String,
    pub band: String,
    pub status: DeviceStatus,
    pub clients: u32,
}

impl Record for AccessPoint {
    fn id(&self) -> &str {
        &self.id
    }
}

pub static OLTS: Lazy<ResourceStore<Olt>> = Lazy::new(ResourceStore::new);
pub static ONTS: Lazy<ResourceStore<Ont>> = Lazy::new(ResourceStore::new);
pub static ACCESS_POINTS: Lazy<ResourceStore<AccessPoint>> = Lazy::new(ResourceStore::new);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OltOverrides {
    pub id: Option<String>,
    pub name: Option<String>,
    pub site: Option<String>,
    pub status: Option<DeviceStatus>,
    pub pon_ports: Option<u32>,
}

pub fn olt(overrides: OltOverrides) -> Olt {
    let id = overrides.id.unwrap_or_else(|| OLTS.next_id("OLT"));
    Olt {
        name: overrides.name.unwrap_or_else(|| id.to_lowercase()),
        site: overrides.site.unwrap_or_else(|| "central".to_string()),
        status: overrides.status.unwrap_or(DeviceStatus::Online),
        pon_ports: overrides.pon_ports.unwrap_or(16),
        id,
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OntOverrides {
    pub id: Option<String>,
    pub olt_id: Option<String>,
    pub serial: Option<String>,
    pub subscriber_id: Option<String>,
    pub status: Option<DeviceStatus>,
    pub rx_power_dbm: Option<f64>,
    pub last_seen_at: Option<DateTime<Utc>>,
}

pub fn ont(overrides: OntOverrides) -> Ont {
    let id = overrides.id.unwrap_or_else(|| ONTS.next_id("ONT"));
    Ont {
        olt_id: overrides.olt_id.unwrap_or_else(|| "OLT-1".to_string()),
        serial: overrides
            .serial
            .unwrap_or_else(|| format!("ALCL{}", id.replace('-', ""))),
        subscriber_id: overrides.subscriber_id,
        status: overrides.status.unwrap_or(DeviceStatus::Online),
        rx_power_dbm: overrides.rx_power_dbm.unwrap_or(-21.5),
        last_seen_at: overrides.last_seen_at.unwrap_or_else(Utc::now),
        id,
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccessPointOverrides {
    pub id: Option<String>,
    pub name: Option<String>,
    pub site: Option<String>,
    pub band: Option<String>,
    pub status: Option<DeviceStatus>,
    pub clients: Option<u32>,
}

pub fn access_point(overrides: AccessPointOverrides) -> AccessPoint {
    let id = overrides.id.unwrap_or_else(|| ACCESS_POINTS.next_id("AP"));
    AccessPoint {
        name: overrides.name.unwrap_or_else(|| id.to_lowercase()),
        site: overrides.site.unwrap_or_else(|| "tower-1".to_string()),
        band: overrides.band.unwrap_or_else(|| "5ghz".to_string()),
        status: overrides.status.unwrap_or(DeviceStatus::Online),
        clients: overrides.clients.unwrap_or(0),
        id,
    }
}

pub fn seed_olts(records: Vec<Olt>) {
    OLTS.seed(records);
}

pub fn seed_onts(records: Vec<Ont>) {
    ONTS.seed(records);
}

pub fn seed_access_points(records: Vec<AccessPoint>) {
    ACCESS_POINTS.seed(records);
}

pub fn clear_inventory() {
    OLTS.clear();
    ONTS.clear();
    ACCESS_POINTS.clear();
}

pub fn register(router: &mut MockRouter) {
    router.get("/inventory/fiber/olts", list_olts);
    router.get("/inventory/fiber/onts", list_onts);
    router.patch("/inventory/fiber/onts/{id}", patch_ont);
    router.get("/inventory/wireless/aps", list_access_points);
    router.patch("/inventory/wireless/aps/{id}", patch_access_point);
}

fn list_olts(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let query = ctx.list_query()?;
    let page = apply_list_query(OLTS.snapshot(), &query, &["name", "site"]);
    Ok(MockResponse::ok(page.into_body()))
}

fn list_onts(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let query = ctx.list_query()?;
    let page = apply_list_query(ONTS.snapshot(), &query, &["serial", "olt_id"]);
    Ok(MockResponse::ok(page.into_body()))
}

fn patch_ont(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let id = ctx.param("id");
    let patch = ctx.body_object()?.clone();
    let current = ONTS
        .get(id)
        .ok_or_else(|| HandlerError::not_found("ont", id))?;
    let updated = apply_patch(&current, &patch).map_err(HandlerError::BadRequest)?;
    let saved = ONTS
        .update(id, |record| *record = updated.clone())
        .ok_or_else(|| HandlerError::not_found("ont", id))?;
    Ok(MockResponse::ok(json!(saved)))
}

fn list_access_points(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let query = ctx.list_query()?;
    let page = apply_list_query(ACCESS_POINTS.snapshot(), &query, &["name", "site"]);
    Ok(MockResponse::ok(page.into_body()))
}

fn patch_access_point(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let id = ctx.param("id");
    let patch = ctx.body_object()?.clone();
    let current = ACCESS_POINTS
        .get(id)
        .ok_or_else(|| HandlerError::not_found("access point", id))?;
    let updated = apply_patch(&current, &patch).map_err(HandlerError::BadRequest)?;
    let saved = ACCESS_POINTS
        .update(id, |record| *record = updated.clone())
        .ok_or_else(|| HandlerError::not_found("access point", id))?;
    Ok(MockResponse::ok(json!(saved)))
}
