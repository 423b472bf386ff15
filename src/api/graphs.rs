/// Graph management and execution REST endpoints
///
/// Thin adapter: every handler turns a request into one engine call and the
/// engine's answer into a JSON response.

use crate::{
    config::StreamConfig,
    runtime::{EngineError, ExecutionEngine, ExecutionResult},
    workflow::{analysis, GraphDefinition, GraphReport, RunState},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// The execution engine with its graph, tool and run registries
    pub engine: Arc<ExecutionEngine>,
    /// Live streaming settings for the WebSocket endpoint
    pub stream: StreamConfig,
}

/// Error body: `{"detail": "..."}`
pub type ApiError = (StatusCode, Json<Value>);

pub(crate) fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (status, Json(json!({ "detail": detail.into() })))
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let status = match err {
            EngineError::GraphNotFound(_) => StatusCode::NOT_FOUND,
            EngineError::Cancelled { .. } => StatusCode::SERVICE_UNAVAILABLE,
            EngineError::ToolNotFound { .. } | EngineError::SinkClosed { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        api_error(status, err.to_string())
    }
}

/// Request body for graph creation
#[derive(Debug, Deserialize)]
pub struct CreateGraphRequest {
    pub definition: GraphDefinition,
}

/// Response for graph creation
#[derive(Debug, Serialize)]
pub struct CreateGraphResponse {
    pub graph_id: String,
    pub message: String,
    /// Structural problems found in the definition; registration still succeeds
    pub warnings: Vec<String>,
}

/// Request body for a blocking run
#[derive(Debug, Deserialize)]
pub struct RunGraphRequest {
    pub graph_id: String,
    #[serde(default)]
    pub initial_state: RunState,
}

/// A registered graph with its diagnostic report
#[derive(Debug, Serialize)]
pub struct GraphResponse {
    pub graph_id: String,
    pub definition: GraphDefinition,
    pub analysis: GraphReport,
}

/// Create graph management and execution routes
pub fn create_graph_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/graph/create", post(create_graph))
        .route("/graph/run", post(run_graph))
        .route("/graph/state/{run_id}", get(get_run_state))
        .route("/graph/{graph_id}", get(get_graph))
}

/// GET /
async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "Workflow Engine Ready",
        "preloaded_graphs": state.engine.graph_ids(),
    }))
}

/// Register a new graph under a fresh id
///
/// POST /graph/create
/// Body: { "definition": { "start_node": "...", "nodes": [...], "edges": [...] } }
async fn create_graph(
    State(state): State<AppState>,
    Json(payload): Json<CreateGraphRequest>,
) -> Result<Json<CreateGraphResponse>, ApiError> {
    let graph_id = uuid::Uuid::new_v4().to_string();
    let tool_names = state.engine.tool_names();
    let warnings = analysis::analyze(&payload.definition, tool_names.as_slice()).warnings();

    for warning in &warnings {
        tracing::warn!(graph_id = %graph_id, "⚠️ {}", warning);
    }

    state.engine.register_graph(graph_id.clone(), payload.definition);

    Ok(Json(CreateGraphResponse {
        graph_id,
        message: "Graph created successfully".to_string(),
        warnings,
    }))
}

/// Get a graph definition and its analysis
///
/// GET /graph/{graph_id}
async fn get_graph(
    State(state): State<AppState>,
    Path(graph_id): Path<String>,
) -> Result<Json<GraphResponse>, ApiError> {
    let definition = state
        .engine
        .graph(&graph_id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Graph not found"))?;
    let analysis = state.engine.analyze(&graph_id)?;

    Ok(Json(GraphResponse {
        graph_id,
        definition: (*definition).clone(),
        analysis,
    }))
}

/// Execute a graph and wait for the result
///
/// POST /graph/run
/// Body: { "graph_id": "...", "initial_state": { ... } }
async fn run_graph(
    State(state): State<AppState>,
    Json(payload): Json<RunGraphRequest>,
) -> Result<Json<ExecutionResult>, ApiError> {
    let run_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(run_id = %run_id, graph_id = %payload.graph_id, "📥 Run requested");

    let result = state
        .engine
        .run(run_id, &payload.graph_id, &payload.initial_state, None)
        .await
        .map_err(|e| {
            tracing::error!("❌ Run failed for graph {}: {}", payload.graph_id, e);
            ApiError::from(e)
        })?;

    Ok(Json(result))
}

/// Final state of a finished run
///
/// GET /graph/state/{run_id}
async fn get_run_state(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match state.engine.final_state(&run_id).await {
        Some(final_state) => Ok(Json(json!({ "run_id": run_id, "state": final_state }))),
        None => Err(api_error(StatusCode::NOT_FOUND, "Run ID not found")),
    }
}
