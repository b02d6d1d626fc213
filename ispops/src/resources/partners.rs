use std::collections::BTreeMap;

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
pub enum PartnerTier {
    Reseller,
    Wholesale,
    Referral,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partner {
    pub id: String,
    pub name: String,
    pub tier: PartnerTier,
    pub contact_email: String,
    pub active: bool,
    pub commission_rate: f64,
    pub created_at: DateTime<Utc>,
}

impl Record for Partner {
    fn id(&self) -> &str {
        &self.id
    }
}

pub static PARTNERS: Lazy<ResourceStore<Partner>> = Lazy::new(ResourceStore::new);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PartnerOverrides {
    pub id: Option<String>,
    pub name: Option<String>,
    pub tier: Option<PartnerTier>,
    pub contact_email: Option<String>,
    pub active: Option<bool>,
    pub commission_rate: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
}

pub fn partner(overrides: PartnerOverrides) -> Partner {
    let id = overrides.id.unwrap_or_else(|| PARTNERS.next_id("PRT"));
    Partner {
        name: overrides.name.unwrap_or_else(|| "Acme Networks".to_string()),
        tier: overrides.tier.unwrap_or(PartnerTier::Reseller),
        contact_email: overrides
            .contact_email
            .unwrap_or_else(|| format!("ops@{}.example.net", id.to_lowercase())),
        active: overrides.active.unwrap_or(true),
        commission_rate: overrides.commission_rate.unwrap_or(0.1),
        created_at: overrides.created_at.unwrap_or_else(Utc::now),
        id,
    }
}

pub fn seed_partners(records: Vec<Partner>) {
    PARTNERS.seed(records);
}

pub fn clear_partners() {
    PARTNERS.clear();
}

pub fn register(router: &mut MockRouter) {
    router.get("/partners/summary", partner_summary);
    router.get("/partners", list_partners);
    router.post("/partners", create_partner);
    router.get("/partners/{id}", get_partner);
    router.put("/partners/{id}", update_partner);
}

fn list_partners(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let query = ctx.list_query()?;
    let page = apply_list_query(PARTNERS.snapshot(), &query, &["name", "contact_email"]);
    Ok(MockResponse::ok(page.into_body()))
}

fn partner_summary(_ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let snapshot = PARTNERS.snapshot();
    let mut by_tier: BTreeMap<String, u64> = BTreeMap::new();
    for record in &snapshot {
        *by_tier.entry(record.tier.to_string()).or_insert(0) += 1;
    }
    let active = snapshot.iter().filter(|p| p.active).count();
    Ok(MockResponse::ok(json!({
        "total": snapshot.len(),
        "active": active,
        "by_tier": by_tier,
    })))
}

fn get_partner(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let id = ctx.param("id");
    let record = PARTNERS
        .get(id)
        .ok_or_else(|| HandlerError::not_found("partner", id))?;
    Ok(MockResponse::ok(json!(record)))
}

fn create_partner(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    ctx.required_str("name")?;
    let overrides: PartnerOverrides = ctx.body_as()?;
    let record = PARTNERS.insert(partner(overrides));
    Ok(MockResponse::created(json!(record)))
}

fn update_partner(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let id = ctx.param("id");
    let patch = ctx.body_object()?.clone();
    let current = PARTNERS
        .get(id)
        .ok_or_else(|| HandlerError::not_found("partner", id))?;
    let updated = apply_patch(&current, &patch).map_err(HandlerError::BadRequest)?;
    let saved = PARTNERS
        .update(id, |record| *record = updated.clone())
        .ok_or_else(|| HandlerError::not_found("partner", id))?;
    Ok(MockResponse::ok(json!(saved)))
}
