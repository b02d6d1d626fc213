use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Request, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use http::{StatusCode, header};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::graphql::{GraphQLRegistry, GraphQLRequest};
use crate::model::GenericError;
use crate::response::MockResponse;
use crate::router::MockRouter;

const MAX_BODY_BYTES: usize = 1 << 20;

/// The assembled mock API: a REST route table plus a GraphQL operation
/// registry, served the same way the real backend would be.
pub struct MockBackend {
    router: Arc<MockRouter>,
    graphql: Arc<GraphQLRegistry>,
}

#[derive(Clone)]
struct AppState {
    router: Arc<MockRouter>,
    graphql: Arc<GraphQLRegistry>,
}

impl MockBackend {
    pub fn new(router: MockRouter, graphql: GraphQLRegistry) -> Self {
        Self {
            router: Arc::new(router),
            graphql: Arc::new(graphql),
        }
    }

    pub fn rest_router(&self) -> &MockRouter {
        &self.router
    }

    /// The axum service. Tests drive this in-process with
    /// `tower::ServiceExt::oneshot`; the binary binds it to a listener.
    pub fn into_router(self) -> Router {
        let state = AppState {
            router: self.router,
            graphql: self.graphql,
        };

        Router::new()
            .route("/health", get(health_check))
            .route("/graphql", post(dispatch_graphql))
            .fallback(dispatch_rest)
            .layer(TraceLayer::new_for_http())
            .layer(
                CorsLayer::new()
                    .allow_origin(
                        "http://localhost:3000"
                            .parse::<header::HeaderValue>()
                            .unwrap(),
                    )
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .with_state(state)
    }

    pub async fn serve(self, addr: &str) -> Result<(), GenericError> {
        tracing::info!("Starting mock backend at {}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.into_router()).await?;

        Ok(())
    }
}

/// Serve an assembled backend at the configured address. Runs until the
/// process is stopped.
pub async fn run_backend(
    config: common::config::BackendConfig,
    backend: MockBackend,
) -> Result<(), GenericError> {
    backend.serve(&config.server_address).await
}

pub fn initialize_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK").into_response()
}

async fn dispatch_graphql(
    State(state): State<AppState>,
    Json(request): Json<GraphQLRequest>,
) -> impl IntoResponse {
    Json(state.graphql.dispatch(&request))
}

async fn dispatch_rest(State(state): State<AppState>, request: Request) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request
        .uri()
        .query()
        .map(parse_query_pairs)
        .unwrap_or_default();

    let bytes = match axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, %method, path, "failed to read request body");
            return MockResponse::with_status(
                StatusCode::BAD_REQUEST,
                json!({ "error": "failed to read request body" }),
            )
            .into_response();
        }
    };
    let body = if bytes.is_empty() {
        None
    } else {
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(_) => {
                return MockResponse::with_status(
                    StatusCode::BAD_REQUEST,
                    json!({ "error": "request body must be valid JSON" }),
                )
                .into_response();
            }
        }
    };

    state.router.dispatch(&method, &path, query, body).into_response()
}

fn parse_query_pairs(query: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}
