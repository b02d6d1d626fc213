use http::StatusCode;
use serde_json::json;
use serial_test::serial;

use ispops::registry::reset_all_stores;
use ispops::resources::billing::{self, InvoiceOverrides, InvoiceStatus};
use ispops::resources::faults::{self, AlarmOverrides};
use ispops::resources::subscribers::{self, SubscriberOverrides};

use super::send;

#[tokio::test]
#[serial]
async fn test_subscriber_profile_is_camelized() {
    reset_all_stores();
    subscribers::seed_subscribers(vec![subscribers::subscriber(SubscriberOverrides {
        id: Some("SUB-1".to_string()),
        name: Some("Mara Voss".to_string()),
        ..Default::default()
    })]);

    let (status, body) = send(
        "POST",
        "/graphql",
        Some(json!({
            "query": "query SubscriberProfile($subscriberId: ID!) { subscriber(id: $subscriberId) { id } }",
            "variables": { "subscriberId": "SUB-1" },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let subscriber = &body["data"]["subscriber"];
    assert_eq!(subscriber["id"], json!("SUB-1"));
    // snake_case seed fields come back camelCased
    assert!(subscriber["serviceId"].is_string());
    assert!(subscriber["createdAt"].is_string());
    assert!(subscriber.get("service_id").is_none());
}

#[tokio::test]
#[serial]
async fn test_outstanding_invoices_filters_by_variable() {
    reset_all_stores();
    billing::seed_invoices(vec![
        billing::invoice(InvoiceOverrides {
            id: Some("INV-1".to_string()),
            subscriber_id: Some("SUB-1".to_string()),
            ..Default::default()
        }),
        billing::invoice(InvoiceOverrides {
            id: Some("INV-2".to_string()),
            subscriber_id: Some("SUB-1".to_string()),
            status: Some(InvoiceStatus::Paid),
            ..Default::default()
        }),
        billing::invoice(InvoiceOverrides {
            id: Some("INV-3".to_string()),
            subscriber_id: Some("SUB-2".to_string()),
            status: Some(InvoiceStatus::PastDue),
            ..Default::default()
        }),
    ]);

    let (status, body) = send(
        "POST",
        "/graphql",
        Some(json!({
            "operationName": "OutstandingInvoices",
            "query": "query OutstandingInvoices($subscriberId: ID!) { invoices { id } }",
            "variables": { "subscriberId": "SUB-1" },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let invoices = body["data"]["invoices"].as_array().unwrap();
    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices[0]["id"], json!("INV-1"));
    assert_eq!(invoices[0]["subscriberId"], json!("SUB-1"));
}

#[tokio::test]
#[serial]
async fn test_acknowledge_alarm_mutation_shares_the_rest_store() {
    reset_all_stores();
    faults::seed_alarms(vec![faults::alarm(AlarmOverrides {
        id: Some("ALM-1".to_string()),
        ..Default::default()
    })]);

    let (status, body) = send(
        "POST",
        "/graphql",
        Some(json!({
            "query": "mutation AcknowledgeAlarm($alarmId: ID!) { acknowledgeAlarm(id: $alarmId) { id } }",
            "variables": { "alarmId": "ALM-1", "acknowledgedBy": "m.voss" },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["acknowledgeAlarm"]["status"], json!("acknowledged"));

    // the REST surface sees the same mutation
    let (_, alarms) = send("GET", "/faults/alarms?status=acknowledged", None).await;
    assert_eq!(alarms["total"], json!(1));
}

#[tokio::test]
#[serial]
async fn test_unknown_operation_gets_errors_envelope_with_200() {
    reset_all_stores();

    let (status, body) = send(
        "POST",
        "/graphql",
        Some(json!({ "query": "query NoSuchOperation { x }" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["errors"][0]["message"],
        json!("unknown operation: NoSuchOperation")
    );
}

#[tokio::test]
#[serial]
async fn test_missing_record_surfaces_as_graphql_error() {
    reset_all_stores();

    let (status, body) = send(
        "POST",
        "/graphql",
        Some(json!({
            "query": "query SubscriberProfile { subscriber { id } }",
            "variables": { "subscriberId": "SUB-404" },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["errors"][0]["message"],
        json!("subscriber SUB-404 not found")
    );
}
