use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use stepwise::config::Config;
use stepwise::server::{create_engine, create_router};
use tower::ServiceExt;

fn app() -> Router {
    let config = Config::default();
    create_router(create_engine(&config), &config)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn healthz() {
    let app = app();
    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn root_lists_preloaded_graphs() {
    let app = app();
    let (status, body) = send(&app, "GET", "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["preloaded_graphs"], json!(["code_review_v1"]));
}

#[tokio::test]
async fn create_run_and_fetch_state() {
    let app = app();

    let definition = json!({
        "start_node": "extract",
        "nodes": [{"id": "extract", "function_name": "extract_functions"}],
        "edges": []
    });
    let (status, created) = send(&app, "POST", "/graph/create", Some(json!({"definition": definition}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["warnings"], json!([]));
    let graph_id = created["graph_id"].as_str().unwrap().to_string();

    let (status, result) = send(
        &app,
        "POST",
        "/graph/run",
        Some(json!({"graph_id": graph_id, "initial_state": {"code": "def a(): pass"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["final_state"]["function_count"], json!(1));
    assert_eq!(result["logs"][0]["step_id"], json!(1));
    assert_eq!(result["termination"]["reason"], json!("completed"));

    let run_id = result["run_id"].as_str().unwrap();
    let (status, state) = send(&app, "GET", &format!("/graph/state/{run_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["state"]["extracted"], json!(true));
}

#[tokio::test]
async fn create_reports_warnings() {
    let app = app();
    let definition = json!({
        "start_node": "a",
        "nodes": [{"id": "a", "function_name": "missing_tool"}],
        "edges": [{"from_node": "a", "to_node": "ghost"}]
    });

    let (status, created) = send(&app, "POST", "/graph/create", Some(json!({"definition": definition}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["warnings"].as_array().unwrap().len(), 2);

    let graph_id = created["graph_id"].as_str().unwrap();
    let (status, graph) = send(&app, "GET", &format!("/graph/{graph_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(graph["analysis"]["missing_tools"], json!(["missing_tool"]));
}

#[tokio::test]
async fn run_unknown_graph_is_404() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/graph/run",
        Some(json!({"graph_id": "nope", "initial_state": {}})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn run_with_missing_tool_is_500() {
    let app = app();
    let definition = json!({
        "start_node": "a",
        "nodes": [{"id": "a", "function_name": "missing_tool"}],
        "edges": []
    });
    let (_, created) = send(&app, "POST", "/graph/create", Some(json!({"definition": definition}))).await;
    let graph_id = created["graph_id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/graph/run",
        Some(json!({"graph_id": graph_id, "initial_state": {}})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn unknown_run_state_is_404() {
    let app = app();
    let (status, _) = send(&app, "GET", "/graph/state/does-not-exist", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
