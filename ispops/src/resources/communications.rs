use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use simcore::error::HandlerError;
use simcore::query::apply_list_query;
use simcore::response::MockResponse;
use simcore::router::{MockRouter, RequestContext};
use simcore::store::{Record, ResourceStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub id: String,
    pub name: String,
    pub channel: String,
    pub subject: String,
    /// Placeholders use `{{name}}` syntax and are substituted on send.
    pub body: String,
}

impl Record for MessageTemplate {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageLogEntry {
    pub id: String,
    pub template_id: String,
    pub recipient: String,
    pub channel: String,
    pub subject: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

impl Record for MessageLogEntry {
    fn id(&self) -> &str {
        &self.id
    }
}

pub static TEMPLATES: Lazy<ResourceStore<MessageTemplate>> = Lazy::new(ResourceStore::new);
pub static MESSAGES: Lazy<ResourceStore<MessageLogEntry>> = Lazy::new(ResourceStore::new);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MessageTemplateOverrides {
    pub id: Option<String>,
    pub name: Option<String>,
    pub channel: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
}

pub fn message_template(overrides: MessageTemplateOverrides) -> MessageTemplate {
    MessageTemplate {
        id: overrides.id.unwrap_or_else(|| TEMPLATES.next_id("TPL")),
        name: overrides.name.unwrap_or_else(|| "outage_notice".to_string()),
        channel: overrides.channel.unwrap_or_else(|| "email".to_string()),
        subject: overrides
            .subject
            .unwrap_or_else(|| "Service notice".to_string()),
        body: overrides
            .body
            .unwrap_or_else(|| "Hello {{name}}, your service is affected.".to_string()),
    }
}

/// The default template fixtures. The notifications module reuses these
/// for its own seeding, the one sanctioned cross-module seed dependency.
pub fn default_templates() -> Vec<MessageTemplate> {
    vec![
        message_template(MessageTemplateOverrides {
            id: Some("TPL-1".to_string()),
            name: Some("outage_notice".to_string()),
            subject: Some("Planned maintenance".to_string()),
            body: Some("Hello {{name}}, maintenance is planned for {{window}}.".to_string()),
            ..Default::default()
        }),
        message_template(MessageTemplateOverrides {
            id: Some("TPL-2".to_string()),
            name: Some("payment_reminder".to_string()),
            subject: Some("Invoice due".to_string()),
            body: Some("Hello {{name}}, invoice {{invoice}} is due.".to_string()),
            ..Default::default()
        }),
    ]
}

pub fn seed_templates(records: Vec<MessageTemplate>) {
    TEMPLATES.seed(records);
}

pub fn seed_messages(records: Vec<MessageLogEntry>) {
    MESSAGES.seed(records);
}

pub fn clear_communications() {
    TEMPLATES.clear();
    MESSAGES.clear();
}

pub fn register(router: &mut MockRouter) {
    router.get("/communications/templates", list_templates);
    router.get("/communications/templates/{id}", get_template);
    router.get("/communications/messages", list_messages);
    router.post("/communications/send", send_message);
}

fn list_templates(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let query = ctx.list_query()?;
    let page = apply_list_query(TEMPLATES.snapshot(), &query, &["name", "subject"]);
    Ok(MockResponse::ok(page.into_body()))
}

fn get_template(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let id = ctx.param("id");
    let record = TEMPLATES
        .get(id)
        .ok_or_else(|| HandlerError::not_found("template", id))?;
    Ok(MockResponse::ok(json!(record)))
}

fn list_messages(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let query = ctx.list_query()?;
    let page = apply_list_query(MESSAGES.snapshot(), &query, &["recipient", "subject"]);
    Ok(MockResponse::ok(page.into_body()))
}

/// Render a template and append the result to the message log.
fn send_message(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let template_id = ctx.required_str("template_id")?;
    let recipient = ctx.required_str("recipient")?;
    let template = TEMPLATES
        .get(&template_id)
        .ok_or_else(|| HandlerError::not_found("template", template_id.clone()))?;

    let variables = ctx
        .body_object()?
        .get("variables")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let mut body = template.body.clone();
    for (name, value) in &variables {
        let value = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
        body = body.replace(&format!("{{{{{}}}}}", name), &value);
    }

    let entry = MESSAGES.insert(MessageLogEntry {
        id: MESSAGES.next_id("MSG"),
        template_id,
        recipient: recipient.clone(),
        channel: template.channel.clone(),
        subject: template.subject.clone(),
        body,
        sent_at: Utc::now(),
    });
    info!(message_id = %entry.id, recipient = %recipient, "message logged");
    Ok(MockResponse::created(json!(entry)))
}
