/// Node execution against the tool registry
///
/// Resolves a node's tool by name and invokes it against the current run state.

use crate::runtime::tool::{Tool, ToolRegistry};
use crate::workflow::types::{NodeDefinition, RunState, StateUpdate};

/// Why a node produced no update
#[derive(Debug)]
pub enum NodeFailure {
    /// No tool is registered under the node's function name
    ToolNotFound,
    /// The tool raised an error while running
    ToolFailed(anyhow::Error),
}

/// Node executor owning the tool registry
#[derive(Debug, Default)]
pub struct NodeExecutor {
    tools: ToolRegistry,
}

impl NodeExecutor {
    /// Create an executor with an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any existing tool under the same name
    pub fn register_tool(&self, name: impl Into<String>, tool: impl Tool) {
        self.tools.register(name, tool);
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Execute a single node with the given state
    ///
    /// Returns the tool's partial update; merging is left to the caller.
    pub async fn execute_node(
        &self,
        node: &NodeDefinition,
        state: &RunState,
    ) -> Result<StateUpdate, NodeFailure> {
        let Some(tool) = self.tools.get(&node.function_name) else {
            tracing::error!("❌ Tool '{}' not found for node '{}'", node.function_name, node.id);
            return Err(NodeFailure::ToolNotFound);
        };

        tracing::debug!("🚀 Executing node '{}' with tool '{}'", node.id, node.function_name);
        let start_time = std::time::Instant::now();

        let result = tool.invoke(state).await;
        let duration = start_time.elapsed();

        match result {
            Ok(update) => {
                tracing::debug!(
                    "✅ Node '{}' completed in {:?}, updated keys: {:?}",
                    node.id,
                    duration,
                    update.keys().collect::<Vec<_>>()
                );
                Ok(update)
            }
            Err(e) => {
                tracing::warn!("❌ Node '{}' failed in {:?} - Error: {}", node.id, duration, e);
                Err(NodeFailure::ToolFailed(e))
            }
        }
    }
}
