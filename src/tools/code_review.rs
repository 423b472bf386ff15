/// Code review mini-agent
///
/// A looping demo graph: extract functions, score complexity, detect issues and,
/// while any issue remains, apply one improvement and go around again.
///
/// ```text
/// extract → complexity → issues →(issue_count truthy) improve → complexity
/// ```

use crate::runtime::{tool_fn, ExecutionEngine};
use crate::workflow::types::{EdgeDefinition, GraphDefinition, RunState, StateUpdate};
use rand::Rng;
use serde_json::{json, Value};

/// Graph id the demo is registered under
pub const CODE_REVIEW_GRAPH_ID: &str = "code_review_v1";

/// Improvements after which issue detection gives up
const MAX_IMPROVEMENTS: i64 = 3;

const WILDCARD_ISSUE: &str = "Avoid wildcard imports";
const PRINT_ISSUE: &str = "Use logging instead of print";

fn as_update(value: Value) -> StateUpdate {
    match value {
        Value::Object(map) => map,
        _ => StateUpdate::new(),
    }
}

fn code(state: &RunState) -> &str {
    state.get("code").and_then(Value::as_str).unwrap_or_default()
}

fn int(state: &RunState, key: &str, default: i64) -> i64 {
    state.get(key).and_then(Value::as_i64).unwrap_or(default)
}

/// Count function definitions in `code`
pub fn extract_functions(state: &RunState) -> anyhow::Result<StateUpdate> {
    let count = code(state).matches("def ").count();
    tracing::info!(function_count = count, "Extracting functions");
    Ok(as_update(json!({"function_count": count, "extracted": true})))
}

/// Score complexity as a random base plus the function count
pub fn check_complexity(state: &RunState) -> anyhow::Result<StateUpdate> {
    let base: i64 = rand::thread_rng().gen_range(1..=5);
    let score = base + int(state, "function_count", 0);
    tracing::info!(complexity_score = score, "Checking complexity");
    Ok(as_update(json!({"complexity_score": score})))
}

/// Detect bad patterns in `code`
pub fn detect_issues(state: &RunState) -> anyhow::Result<StateUpdate> {
    if int(state, "improvements_made", 0) > MAX_IMPROVEMENTS {
        tracing::info!("Improvement limit reached, reporting no issues");
        return Ok(as_update(json!({"issues": [], "issue_count": 0})));
    }

    let code = code(state);
    let mut issues = Vec::new();
    if code.contains("import *") {
        issues.push(WILDCARD_ISSUE);
    }
    if code.contains("print(") {
        issues.push(PRINT_ISSUE);
    }

    tracing::info!(issue_count = issues.len(), ?issues, "Detecting issues");
    Ok(as_update(json!({"issues": issues, "issue_count": issues.len()})))
}

/// Fix the most recently reported issue and lower the complexity score
pub fn suggest_improvements(state: &RunState) -> anyhow::Result<StateUpdate> {
    let new_score = (int(state, "complexity_score", 100) - 2).max(0);

    let mut issues: Vec<Value> = state
        .get("issues")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let mut code = code(state).to_string();

    if let Some(fixed) = issues.pop() {
        match fixed.as_str() {
            Some(WILDCARD_ISSUE) => code = code.replace("import *", "from module import name"),
            Some(PRINT_ISSUE) => code = code.replace("print(", "log("),
            _ => {}
        }
        tracing::info!(%fixed, remaining = issues.len(), "Applied improvement");
    }

    Ok(as_update(json!({
        "complexity_score": new_score,
        "issue_count": issues.len(),
        "issues": issues,
        "improvements_made": int(state, "improvements_made", 0) + 1,
        "code": code,
    })))
}

/// The demo graph definition
pub fn code_review_graph() -> GraphDefinition {
    GraphDefinition::new("extract")
        .node("extract", "extract_functions")
        .node("complexity", "check_complexity")
        .node("issues", "detect_issues")
        .node("improve", "suggest_improvements")
        .edge(EdgeDefinition::always("extract", "complexity"))
        .edge(EdgeDefinition::always("complexity", "issues"))
        .edge(EdgeDefinition::when_truthy("issues", "improve", "issue_count"))
        .edge(EdgeDefinition::always("improve", "complexity"))
}

/// Register the demo tools and the demo graph on an engine
pub fn register_code_review(engine: &ExecutionEngine) {
    engine.register_tool("extract_functions", tool_fn(extract_functions));
    engine.register_tool("check_complexity", tool_fn(check_complexity));
    engine.register_tool("detect_issues", tool_fn(detect_issues));
    engine.register_tool("suggest_improvements", tool_fn(suggest_improvements));
    engine.register_graph(CODE_REVIEW_GRAPH_ID, code_review_graph());
}
