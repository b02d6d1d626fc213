use axum::Router;
use axum::body::Body;
use http::StatusCode;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use common::test_helpers::test_utils::build_request;
use ispops::registry;

/// One assembled backend per request; the module-level stores carry state
/// across requests within a test.
pub fn backend() -> Router {
    registry::mock_backend().into_router()
}

pub async fn send(method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = build_request(method, uri, body.map(|b| b.to_string()))
        .unwrap()
        .map(Body::from);
    let response = backend().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub mod billing_tests;
pub mod fault_tests;
pub mod graphql_api_tests;
pub mod notification_tests;
pub mod registry_tests;
pub mod subscriber_tests;
