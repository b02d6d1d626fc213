use serde_json::{Value, json};

use simcore::graphql::{GraphQLRegistry, camelize};

use crate::resources::{billing, faults, orchestration, subscribers};

/// The GraphQL surface of the mock API. Operations are matched by name
/// and read or mutate the same stores as the REST handlers; every
/// response passes through `camelize` so snake_case records come back
/// shaped like the generated schema the frontend consumes.
pub fn register(registry: &mut GraphQLRegistry) {
    registry.operation("SubscriberProfile", |vars| {
        let id = string_variable(vars, "subscriberId")?;
        let record = subscribers::SUBSCRIBERS
            .get(&id)
            .ok_or_else(|| format!("subscriber {} not found", id))?;
        Ok(camelize(&json!({ "subscriber": record })))
    });

    registry.operation("OutstandingInvoices", |vars| {
        let subscriber_id = string_variable(vars, "subscriberId")?;
        let invoices: Vec<_> = billing::INVOICES
            .snapshot()
            .into_iter()
            .filter(|invoice| invoice.subscriber_id == subscriber_id)
            .filter(|invoice| {
                matches!(
                    invoice.status,
                    billing::InvoiceStatus::Open | billing::InvoiceStatus::PastDue
                )
            })
            .collect();
        Ok(camelize(&json!({ "invoices": invoices })))
    });

    registry.operation("AcknowledgeAlarm", |vars| {
        let id = string_variable(vars, "alarmId")?;
        let acknowledged_by = vars
            .get("acknowledgedBy")
            .and_then(Value::as_str)
            .map(str::to_string);
        let updated = faults::acknowledge(&id, acknowledged_by).map_err(|e| e.to_string())?;
        Ok(camelize(&json!({ "acknowledgeAlarm": updated })))
    });

    registry.operation("WorkflowStatus", |vars| {
        let id = string_variable(vars, "workflowId")?;
        let record = orchestration::WORKFLOWS
            .get(&id)
            .ok_or_else(|| format!("workflow {} not found", id))?;
        Ok(camelize(&json!({ "workflow": record })))
    });
}

fn string_variable(variables: &Value, name: &str) -> Result<String, String> {
    variables
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| format!("variable {} is required", name))
}
