use http::StatusCode;
use serde_json::json;
use serial_test::serial;

use ispops::registry::reset_all_stores;
use ispops::resources::notifications;

use super::send;

#[tokio::test]
#[serial]
async fn test_notification_fixtures_reuse_communication_templates() {
    reset_all_stores();
    notifications::seed_notification_fixtures();

    let (status, templates) = send("GET", "/communications/templates", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(templates["total"], json!(2));

    let (status, body) = send("GET", "/notifications", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(2));
    // every notification points at a seeded template
    let template_ids: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["template_id"].as_str().unwrap())
        .collect();
    assert_eq!(template_ids, vec!["TPL-1", "TPL-2"]);
}

#[tokio::test]
#[serial]
async fn test_unread_filter_and_mark_read() {
    reset_all_stores();
    notifications::seed_notification_fixtures();

    let (_, unread) = send("GET", "/notifications?read=false", None).await;
    assert_eq!(unread["total"], json!(2));

    let id = unread["items"][0]["id"].as_str().unwrap().to_string();
    let (status, body) = send("POST", &format!("/notifications/{}/read", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["read"], json!(true));

    let (_, unread) = send("GET", "/notifications?read=false", None).await;
    assert_eq!(unread["total"], json!(1));
}

#[tokio::test]
#[serial]
async fn test_read_all_touches_every_notification() {
    reset_all_stores();
    notifications::seed_notification_fixtures();

    let (status, body) = send("POST", "/notifications/read-all", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], json!(2));

    let (_, unread) = send("GET", "/notifications?read=false", None).await;
    assert_eq!(unread["total"], json!(0));
}

#[tokio::test]
#[serial]
async fn test_send_renders_template_with_variables() {
    reset_all_stores();
    notifications::seed_notification_fixtures();

    let (status, body) = send(
        "POST",
        "/communications/send",
        Some(json!({
            "template_id": "TPL-1",
            "recipient": "mara.voss@example.net",
            "variables": { "name": "Mara", "window": "02:00-04:00" },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body["body"],
        json!("Hello Mara, maintenance is planned for 02:00-04:00.")
    );
    assert_eq!(body["id"], json!("MSG-1"));

    let (_, messages) = send("GET", "/communications/messages", None).await;
    assert_eq!(messages["total"], json!(1));
}

#[tokio::test]
#[serial]
async fn test_send_validates_template_and_recipient() {
    reset_all_stores();
    notifications::seed_notification_fixtures();

    let (status, _) = send(
        "POST",
        "/communications/send",
        Some(json!({ "template_id": "TPL-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        "POST",
        "/communications/send",
        Some(json!({ "template_id": "TPL-404", "recipient": "x@example.net" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("template TPL-404 not found"));
}
