use crate::common::CoverageRecord;
use crate::graphql::{create_schema, GraphQLSchema};
use crate::observability::metrics;
use crate::pipeline::search::{self, SearchQuery};
use crate::pipeline::storage::{SnapshotInfo, Storage};
use crate::pipeline::Importer;
use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::Query,
    http::{Method, StatusCode},
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Extension, Router,
};
use hyper::Server;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    /// Absent when the server only serves a preloaded snapshot
    pub importer: Option<Arc<Importer>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub carriers: Vec<CoverageRecord>,
    pub error: Option<String>,
}

/// Health check endpoint
async fn health(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let snapshot = state.storage.current().await;
    Json(serde_json::json!({
        "status": "healthy",
        "service": "coverage-sheets",
        "version": env!("CARGO_PKG_VERSION"),
        "snapshot_version": snapshot.version,
        "records": snapshot.records.len(),
    }))
}

async fn heartbeat() -> &'static str {
    "OK"
}

/// Every record of the current snapshot
async fn carriers(Extension(state): Extension<AppState>) -> Json<Vec<CoverageRecord>> {
    metrics::api::request("carriers");
    let snapshot = state.storage.current().await;
    Json(snapshot.records.clone())
}

async fn run_search(state: &AppState, query: &SearchQuery) -> SearchResponse {
    metrics::api::request("search");
    let snapshot = state.storage.current().await;
    SearchResponse {
        carriers: search::filter(&snapshot.records, query).cloned().collect(),
        error: None,
    }
}

async fn search_get(
    Extension(state): Extension<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<SearchResponse> {
    Json(run_search(&state, &query).await)
}

async fn search_post(
    Extension(state): Extension<AppState>,
    Json(query): Json<SearchQuery>,
) -> Json<SearchResponse> {
    Json(run_search(&state, &query).await)
}

async fn snapshot_info(Extension(state): Extension<AppState>) -> Json<SnapshotInfo> {
    let snapshot = state.storage.current().await;
    Json(SnapshotInfo::from(snapshot.as_ref()))
}

/// Run one import cycle on demand
async fn admin_import(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let Some(importer) = state.importer.as_ref() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "no importer configured".to_string(),
        )
            .into_response();
    };

    match importer.run_once().await {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn metrics_text() -> impl IntoResponse {
    match metrics::render() {
        Some(text) => (StatusCode::OK, text),
        None => (StatusCode::NOT_FOUND, "metrics disabled".to_string()),
    }
}

/// GraphQL handler (supports GET and POST)
async fn graphql_handler(
    Extension(schema): Extension<GraphQLSchema>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

/// Create the HTTP router with all routes, including GraphQL
pub fn create_server(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let schema = create_schema(state.storage.clone());

    Router::new()
        .route("/health", get(health))
        .route("/heartbeat", get(heartbeat))
        .route("/carriers", get(carriers))
        .route("/search", get(search_get).post(search_post))
        .route("/snapshot", get(snapshot_info))
        .route("/metrics", get(metrics_text))
        .route("/admin/import", post(admin_import))
        .route("/graphql", post(graphql_handler).get(graphql_handler))
        .route("/graphiql", get(graphiql))
        .layer(Extension(schema))
        .layer(Extension(state))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port; returns after ctrl-c.
pub async fn start_server(state: AppState, port: u16) -> Result<(), hyper::Error> {
    let app = create_server(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("HTTP server listening on http://localhost:{port}");
    info!("Search:   http://localhost:{port}/search?state=IL&coverage=FIRE");
    info!("GraphiQL: http://localhost:{port}/graphiql");

    Server::try_bind(&addr)?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
