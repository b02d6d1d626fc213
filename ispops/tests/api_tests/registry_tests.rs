use http::StatusCode;
use serde_json::json;
use serial_test::serial;

use ispops::registry::{self, reset_all_stores};
use ispops::resources::field_service::{self, WorkOrderOverrides};
use ispops::resources::radius::{self, RadiusSessionOverrides};
use ispops::resources::search::{self, SearchDocumentOverrides};
use ispops::resources::subscribers;

use super::send;

#[test]
fn test_full_assembly_has_no_shadowed_routes() {
    let router = registry::rest_router();
    assert!(!router.is_empty());
    assert_eq!(router.shadowed_routes(), Vec::<(String, String)>::new());
}

#[tokio::test]
#[serial]
async fn test_demo_seed_then_reset_leaves_every_store_empty() {
    registry::seed_demo_data();
    assert!(!subscribers::SUBSCRIBERS.is_empty());

    reset_all_stores();

    for path in [
        "/subscribers",
        "/billing/invoices",
        "/billing/payments",
        "/faults/alarms",
        "/faults/tickets",
        "/field-service/work-orders",
        "/partners",
        "/licensing/entitlements",
        "/licensing/activations",
        "/communications/templates",
        "/communications/messages",
        "/notifications",
        "/radius/sessions",
        "/inventory/fiber/olts",
        "/inventory/fiber/onts",
        "/inventory/wireless/aps",
        "/audit/events",
        "/orchestration/workflows",
    ] {
        let (status, body) = send("GET", path, None).await;
        assert_eq!(status, StatusCode::OK, "GET {} after reset", path);
        assert_eq!(body["total"], json!(0), "GET {} after reset", path);
    }

    let (_, results) = send("GET", "/search?q=anything", None).await;
    assert_eq!(results["total"], json!(0));
}

#[tokio::test]
#[serial]
async fn test_reset_registry_reaches_the_module_clears() {
    // assembling a backend registers every module's clear function
    let _ = registry::mock_backend();
    registry::seed_demo_data();

    simcore::reset::reset_all();

    assert!(subscribers::SUBSCRIBERS.is_empty());
    assert!(radius::SESSIONS.is_empty());
    assert!(search::SEARCH_DOCUMENTS.is_empty());
}

#[tokio::test]
#[serial]
async fn test_search_ranks_title_matches_before_body_matches() {
    reset_all_stores();
    search::seed_search_documents(vec![
        search::search_document(SearchDocumentOverrides {
            id: Some("DOC-1".to_string()),
            title: Some("Backhaul capacity".to_string()),
            body: Some("mentions fiber in passing".to_string()),
            ..Default::default()
        }),
        search::search_document(SearchDocumentOverrides {
            id: Some("DOC-2".to_string()),
            title: Some("Fiber outage review".to_string()),
            body: Some("post-incident notes".to_string()),
            ..Default::default()
        }),
    ]);

    let (status, body) = send("GET", "/search?q=fiber", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["DOC-2", "DOC-1"]);
}

#[tokio::test]
#[serial]
async fn test_search_kind_filter() {
    reset_all_stores();
    search::seed_search_documents(vec![
        search::search_document(SearchDocumentOverrides {
            id: Some("DOC-1".to_string()),
            kind: Some("subscriber".to_string()),
            title: Some("Mara Voss".to_string()),
            ..Default::default()
        }),
        search::search_document(SearchDocumentOverrides {
            id: Some("DOC-2".to_string()),
            kind: Some("ticket".to_string()),
            title: Some("Voss escalation".to_string()),
            ..Default::default()
        }),
    ]);

    let (_, body) = send("GET", "/search?q=voss&kind=ticket", None).await;
    assert_eq!(body["total"], json!(1));
    assert_eq!(body["results"][0]["id"], json!("DOC-2"));
}

#[tokio::test]
#[serial]
async fn test_schedule_groups_by_technician_and_filters_by_date() {
    reset_all_stores();
    let day = "2026-03-02T09:00:00Z".parse().unwrap();
    let other_day = "2026-03-03T09:00:00Z".parse().unwrap();
    field_service::seed_work_orders(vec![
        field_service::work_order(WorkOrderOverrides {
            id: Some("WO-1".to_string()),
            technician: Some("t.okafor".to_string()),
            scheduled_for: Some(day),
            ..Default::default()
        }),
        field_service::work_order(WorkOrderOverrides {
            id: Some("WO-2".to_string()),
            scheduled_for: Some(day),
            ..Default::default()
        }),
        field_service::work_order(WorkOrderOverrides {
            id: Some("WO-3".to_string()),
            technician: Some("t.okafor".to_string()),
            scheduled_for: Some(other_day),
            ..Default::default()
        }),
    ]);

    let (status, body) = send("GET", "/field-service/schedule?date=2026-03-02", None).await;
    assert_eq!(status, StatusCode::OK);
    let schedule = &body["schedule"];
    assert_eq!(schedule["t.okafor"].as_array().unwrap().len(), 1);
    assert_eq!(schedule["t.okafor"][0]["id"], json!("WO-1"));
    assert_eq!(schedule["unassigned"][0]["id"], json!("WO-2"));
}

#[tokio::test]
#[serial]
async fn test_radius_summary_totals_octets_and_precedes_id_route() {
    reset_all_stores();
    radius::seed_sessions(vec![
        radius::radius_session(RadiusSessionOverrides {
            id: Some("RAD-1".to_string()),
            input_octets: Some(100),
            output_octets: Some(500),
            ..Default::default()
        }),
        radius::radius_session(RadiusSessionOverrides {
            id: Some("RAD-2".to_string()),
            input_octets: Some(50),
            output_octets: Some(250),
            ..Default::default()
        }),
    ]);

    let (status, body) = send("GET", "/radius/sessions/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(2));
    assert_eq!(body["active"], json!(2));
    assert_eq!(body["input_octets"], json!(150));
    assert_eq!(body["output_octets"], json!(750));

    let (status, body) = send("POST", "/radius/sessions/RAD-1/disconnect", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["terminate_cause"], json!("Admin-Reset"));

    let (_, summary) = send("GET", "/radius/sessions/summary", None).await;
    assert_eq!(summary["active"], json!(1));
}

#[tokio::test]
#[serial]
async fn test_work_order_assignment_requires_technician() {
    reset_all_stores();
    field_service::seed_work_orders(vec![field_service::work_order(WorkOrderOverrides {
        id: Some("WO-1".to_string()),
        ..Default::default()
    })]);

    let (status, body) = send(
        "POST",
        "/field-service/work-orders/WO-1/assign",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("technician is required"));

    let (status, body) = send(
        "POST",
        "/field-service/work-orders/WO-1/assign",
        Some(json!({ "technician": "t.okafor" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("assigned"));
}
