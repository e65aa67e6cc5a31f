//! HTTP transport: a small axum router over the tool registry.
//!
//! Progress is not streamed over plain HTTP; callers poll `/health` for
//! the busy flag or use the stdio transport for live progress events.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use hunter_engine::DesignGate;

use crate::resources;
use crate::tools::ToolRegistry;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ToolRegistry>,
    pub gate: DesignGate,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/tools/{name}", post(call_tool))
        .route("/resources", get(list_resources))
        .route("/resources/read", get(read_resource))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "tools": state.registry.len(),
        "busy": !state.gate.is_free(),
    }))
}

async fn list_tools(State(state): State<AppState>) -> Json<Value> {
    Json(state.registry.manifest())
}

async fn call_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(params): Json<Value>,
) -> (StatusCode, Json<Value>) {
    match state.registry.invoke(&name, params, None).await {
        Ok(value) => (StatusCode::OK, Json(value)),
        Err(e) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": "error", "error": e.to_string() })),
        ),
    }
}

async fn list_resources() -> Json<Value> {
    Json(resources::manifest())
}

#[derive(Deserialize)]
struct ReadQuery {
    uri: String,
}

async fn read_resource(Query(query): Query<ReadQuery>) -> (StatusCode, Json<Value>) {
    match resources::find(&query.uri) {
        Some(resource) => (
            StatusCode::OK,
            Json(json!({ "uri": resource.uri, "content": resource.content })),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "status": "error",
                "error": format!("Unknown resource: {}", query.uri),
            })),
        ),
    }
}
