use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::json;

use simcore::error::HandlerError;
use simcore::query::apply_list_query;
use simcore::response::MockResponse;
use simcore::router::{MockRouter, RequestContext};
use simcore::store::{Record, ResourceStore};

use super::communications;

// Re-exported so notification fixtures and template fixtures stay in sync.
pub use super::communications::seed_templates;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub template_id: String,
    pub title: String,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Record for Notification {
    fn id(&self) -> &str {
        &self.id
    }
}

pub static NOTIFICATIONS: Lazy<ResourceStore<Notification>> = Lazy::new(ResourceStore::new);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NotificationOverrides {
    pub id: Option<String>,
    pub template_id: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub read: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
}

pub fn notification(overrides: NotificationOverrides) -> Notification {
    Notification {
        id: overrides.id.unwrap_or_else(|| NOTIFICATIONS.next_id("NTF")),
        template_id: overrides.template_id.unwrap_or_else(|| "TPL-1".to_string()),
        title: overrides.title.unwrap_or_else(|| "Service notice".to_string()),
        body: overrides.body.unwrap_or_default(),
        read: overrides.read.unwrap_or(false),
        created_at: overrides.created_at.unwrap_or_else(Utc::now),
    }
}

pub fn seed_notifications(records: Vec<Notification>) {
    NOTIFICATIONS.seed(records);
}

/// Seed notifications together with the communications templates they
/// reference, reusing that module's fixture set.
pub fn seed_notification_fixtures() {
    let templates = communications::default_templates();
    let notifications = templates
        .iter()
        .map(|template| {
            notification(NotificationOverrides {
                template_id: Some(template.id.clone()),
                title: Some(template.subject.clone()),
                ..Default::default()
            })
        })
        .collect();
    seed_templates(templates);
    seed_notifications(notifications);
}

pub fn clear_notifications() {
    NOTIFICATIONS.clear();
}

pub fn register(router: &mut MockRouter) {
    router.get("/notifications", list_notifications);
    router.post("/notifications/read-all", read_all);
    router.post("/notifications/{id}/read", mark_read);
}

fn list_notifications(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let query = ctx.list_query()?;
    let page = apply_list_query(NOTIFICATIONS.snapshot(), &query, &["title", "body"]);
    Ok(MockResponse::ok(page.into_body()))
}

fn mark_read(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let id = ctx.param("id");
    let updated = NOTIFICATIONS
        .update(id, |record| record.read = true)
        .ok_or_else(|| HandlerError::not_found("notification", id))?;
    Ok(MockResponse::ok(json!(updated)))
}

fn read_all(_ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let updated = NOTIFICATIONS.update_all(|record| record.read = true);
    Ok(MockResponse::ok(json!({ "updated": updated })))
}
