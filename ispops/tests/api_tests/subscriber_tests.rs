use http::StatusCode;
use serde_json::json;
use serial_test::serial;

use ispops::registry::reset_all_stores;
use ispops::resources::subscribers::{self, SubscriberOverrides, SubscriberStatus};

use super::send;

fn seed_three() {
    subscribers::seed_subscribers(vec![
        subscribers::subscriber(SubscriberOverrides {
            id: Some("SUB-1".to_string()),
            name: Some("Mara Voss".to_string()),
            ..Default::default()
        }),
        subscribers::subscriber(SubscriberOverrides {
            id: Some("SUB-2".to_string()),
            name: Some("Theo Brandt".to_string()),
            status: Some(SubscriberStatus::Suspended),
            ..Default::default()
        }),
        subscribers::subscriber(SubscriberOverrides {
            id: Some("SUB-3".to_string()),
            name: Some("Ines Kowalczyk".to_string()),
            ..Default::default()
        }),
    ]);
}

#[tokio::test]
#[serial]
async fn test_list_filters_by_status_and_paginates() {
    reset_all_stores();
    seed_three();

    let (status, body) = send("GET", "/subscribers?status=active&limit=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(2));
    assert_eq!(body["has_more"], json!(true));
    assert_eq!(body["items"][0]["id"], json!("SUB-1"));
}

#[tokio::test]
#[serial]
async fn test_free_text_search_over_name() {
    reset_all_stores();
    seed_three();

    let (status, body) = send("GET", "/subscribers?q=voss", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(1));
    assert_eq!(body["items"][0]["name"], json!("Mara Voss"));
}

#[tokio::test]
#[serial]
async fn test_summary_is_not_captured_by_the_id_route() {
    reset_all_stores();
    seed_three();

    let (status, body) = send("GET", "/subscribers/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(3));
    assert_eq!(body["by_status"]["active"], json!(2));
    assert_eq!(body["by_status"]["suspended"], json!(1));
}

#[tokio::test]
#[serial]
async fn test_get_unknown_subscriber_is_404() {
    reset_all_stores();

    let (status, body) = send("GET", "/subscribers/SUB-404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("subscriber SUB-404 not found"));
}

#[tokio::test]
#[serial]
async fn test_create_requires_name() {
    reset_all_stores();

    let (status, body) = send("POST", "/subscribers", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("name is required"));
}

#[tokio::test]
#[serial]
async fn test_create_continues_the_seeded_id_sequence() {
    reset_all_stores();
    subscribers::seed_subscribers(vec![subscribers::subscriber(SubscriberOverrides {
        id: Some("SUB-7".to_string()),
        ..Default::default()
    })]);

    let (status, body) = send(
        "POST",
        "/subscribers",
        Some(json!({ "name": "New Subscriber", "plan": "fiber_500" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], json!("SUB-8"));
    assert_eq!(body["plan"], json!("fiber_500"));
    assert_eq!(body["status"], json!("active"));
}

#[tokio::test]
#[serial]
async fn test_suspend_and_resume_overwrite_status() {
    reset_all_stores();
    seed_three();

    let (status, body) = send("POST", "/subscribers/SUB-1/suspend", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("suspended"));

    let (status, body) = send("POST", "/subscribers/SUB-1/resume", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("active"));
}

#[tokio::test]
#[serial]
async fn test_update_merges_fields_and_keeps_id() {
    reset_all_stores();
    seed_three();

    let (status, body) = send(
        "PUT",
        "/subscribers/SUB-2",
        Some(json!({ "plan": "fiber_1000", "id": "SUB-999" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], json!("SUB-2"));
    assert_eq!(body["plan"], json!("fiber_1000"));
}

#[tokio::test]
#[serial]
async fn test_delete_returns_no_content_then_404() {
    reset_all_stores();
    seed_three();

    let (status, _) = send("DELETE", "/subscribers/SUB-3", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send("GET", "/subscribers/SUB-3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
