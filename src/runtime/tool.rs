/// Tool contract
///
/// A tool is the unit of work bound to a node. It reads the current run state
/// and returns a partial update; the engine merges the update itself. Every
/// tool returns a future that the engine awaits, so synchronous and
/// asynchronous tools share a single calling convention.

use crate::workflow::types::{RunState, StateUpdate};
use arc_swap::ArcSwap;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::{collections::HashMap, future::Future, sync::Arc};

/// State transformer invoked when its node is visited.
pub trait Tool: Send + Sync + 'static {
    /// Compute the update for the given state.
    fn invoke<'a>(&'a self, state: &'a RunState) -> BoxFuture<'a, anyhow::Result<StateUpdate>>;
}

/// Adapter for synchronous functions.
pub struct FnTool<F>(F);

impl<F> Tool for FnTool<F>
where
    F: Fn(&RunState) -> anyhow::Result<StateUpdate> + Send + Sync + 'static,
{
    fn invoke<'a>(&'a self, state: &'a RunState) -> BoxFuture<'a, anyhow::Result<StateUpdate>> {
        let result = (self.0)(state);
        futures::future::ready(result).boxed()
    }
}

/// Adapter for asynchronous functions.
///
/// The function receives an owned copy of the state so its future can outlive
/// the borrow, e.g. across a network call.
pub struct AsyncFnTool<F>(F);

impl<F, Fut> Tool for AsyncFnTool<F>
where
    F: Fn(RunState) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<StateUpdate>> + Send + 'static,
{
    fn invoke<'a>(&'a self, state: &'a RunState) -> BoxFuture<'a, anyhow::Result<StateUpdate>> {
        (self.0)(state.clone()).boxed()
    }
}

/// Wrap a synchronous function as a tool.
pub fn tool_fn<F>(f: F) -> FnTool<F>
where
    F: Fn(&RunState) -> anyhow::Result<StateUpdate> + Send + Sync + 'static,
{
    FnTool(f)
}

/// Wrap an async function as a tool.
pub fn async_tool_fn<F, Fut>(f: F) -> AsyncFnTool<F>
where
    F: Fn(RunState) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<StateUpdate>> + Send + 'static,
{
    AsyncFnTool(f)
}

/// Name to tool mapping
///
/// Lock-free ArcSwap map: registrations may happen while runs are in flight and
/// a run resolves each tool at the moment its node is visited.
#[derive(Default)]
pub struct ToolRegistry {
    tools: ArcSwap<HashMap<String, Arc<dyn Tool>>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any existing tool under the same name
    pub fn register(&self, name: impl Into<String>, tool: impl Tool) {
        let name = name.into();
        let tool: Arc<dyn Tool> = Arc::new(tool);

        self.tools.rcu(|current| {
            let mut next = HashMap::clone(current);
            next.insert(name.clone(), Arc::clone(&tool));
            next
        });

        tracing::debug!(tool = %name, "Registered tool");
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.load().get(name).cloned()
    }

    /// All registered tool names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.load().keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn update(value: serde_json::Value) -> StateUpdate {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_sync_tool() {
        let tool = tool_fn(|state: &RunState| {
            let n = state.get("n").and_then(|v| v.as_i64()).unwrap_or(0);
            Ok(update(json!({"n": n + 1})))
        });

        let state = RunState::try_from(json!({"n": 41})).unwrap();
        let out = tool.invoke(&state).await.unwrap();
        assert_eq!(out.get("n"), Some(&json!(42)));
    }

    #[tokio::test]
    async fn test_async_tool() {
        let tool = async_tool_fn(|state: RunState| async move {
            tokio::task::yield_now().await;
            let name = state.get("name").cloned().unwrap_or(json!("anon"));
            Ok(update(json!({"greeting": format!("hello {}", name.as_str().unwrap_or_default())})))
        });

        let state = RunState::try_from(json!({"name": "ada"})).unwrap();
        let out = tool.invoke(&state).await.unwrap();
        assert_eq!(out.get("greeting"), Some(&json!("hello ada")));
    }

    #[tokio::test]
    async fn test_registry_last_write_wins() {
        let registry = ToolRegistry::new();
        registry.register("t", tool_fn(|_: &RunState| Ok(update(json!({"v": 1})))));
        registry.register("a", tool_fn(|_: &RunState| Ok(StateUpdate::new())));
        registry.register("t", tool_fn(|_: &RunState| Ok(update(json!({"v": 2})))));

        assert_eq!(registry.names(), vec!["a", "t"]);
        assert!(registry.get("missing").is_none());

        let tool = registry.get("t").unwrap();
        let out = tool.invoke(&RunState::new()).await.unwrap();
        assert_eq!(out.get("v"), Some(&json!(2)));
    }

    #[tokio::test]
    async fn test_tool_error_propagates() {
        let tool = tool_fn(|_: &RunState| Err(anyhow::anyhow!("boom")));
        let err = tool.invoke(&RunState::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
