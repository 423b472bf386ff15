/// Graph execution engine
///
/// Walks a registered graph from its start node, invoking one tool per step
/// against a private copy of the run state, merging the returned updates and
/// following the first outgoing edge whose condition matches. Loops are allowed;
/// a hard step ceiling guarantees termination.

use crate::config::EngineConfig;
use crate::runtime::error::{EngineError, Result};
use crate::runtime::executor::{NodeExecutor, NodeFailure};
use crate::runtime::result::{ExecutionLog, ExecutionResult, TerminationReason};
use crate::runtime::sink::StepSink;
use crate::runtime::store::RunStore;
use crate::runtime::tool::Tool;
use crate::workflow::analysis::{self, GraphReport};
use crate::workflow::registry::GraphRegistry;
use crate::workflow::types::{EdgeDefinition, GraphDefinition, NodeDefinition, RunState};
use chrono::Utc;
use std::{collections::HashMap, sync::Arc};
use tokio_util::sync::CancellationToken;

/// Execution engine owning the graph registry, the tool registry and the run store
///
/// Construct once at startup and share behind an `Arc`. Runs are independent:
/// each owns its state and log, so any number may execute concurrently.
#[derive(Debug)]
pub struct ExecutionEngine {
    graphs: GraphRegistry,
    executor: NodeExecutor,
    runs: RunStore,
    config: EngineConfig,
}

/// Per-run lookup tables built once from a graph definition
struct RunPlan<'g> {
    nodes: HashMap<&'g str, &'g NodeDefinition>,
    /// Outgoing edges per node, in declaration order
    outgoing: HashMap<&'g str, Vec<&'g EdgeDefinition>>,
}

impl<'g> RunPlan<'g> {
    fn build(graph: &'g GraphDefinition) -> Self {
        let mut nodes = HashMap::with_capacity(graph.nodes.len());
        for node in &graph.nodes {
            nodes.entry(node.id.as_str()).or_insert(node);
        }

        let mut outgoing: HashMap<&str, Vec<&EdgeDefinition>> = HashMap::new();
        for edge in &graph.edges {
            outgoing.entry(edge.from_node.as_str()).or_default().push(edge);
        }

        Self { nodes, outgoing }
    }

    /// First outgoing edge of `node_id` whose condition holds, in declaration order
    fn next_node(&self, node_id: &str, state: &RunState) -> Option<&'g str> {
        self.outgoing
            .get(node_id)?
            .iter()
            .copied()
            .find(|edge| edge.matches(state))
            .map(|edge| edge.to_node.as_str())
    }
}

impl ExecutionEngine {
    /// Create an engine with empty registries
    pub fn new(config: EngineConfig) -> Self {
        Self {
            graphs: GraphRegistry::new(),
            executor: NodeExecutor::new(),
            runs: RunStore::new(config.run_store_capacity),
            config,
        }
    }

    /// Register a graph under `graph_id` (last write wins, no validation)
    pub fn register_graph(&self, graph_id: impl Into<String>, definition: GraphDefinition) {
        self.graphs.register(graph_id, definition);
    }

    /// Register a tool under `name` (last write wins)
    pub fn register_tool(&self, name: impl Into<String>, tool: impl Tool) {
        self.executor.register_tool(name, tool);
    }

    pub fn graph(&self, graph_id: &str) -> Option<Arc<GraphDefinition>> {
        self.graphs.get(graph_id)
    }

    pub fn graph_ids(&self) -> Vec<String> {
        self.graphs.ids()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.executor.tools().names()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Structural report for a registered graph against the current tools
    pub fn analyze(&self, graph_id: &str) -> Result<GraphReport> {
        let graph = self
            .graphs
            .get(graph_id)
            .ok_or_else(|| EngineError::GraphNotFound(graph_id.to_string()))?;
        Ok(analysis::analyze(&graph, self.tool_names().as_slice()))
    }

    /// Final state of a stored run
    pub async fn final_state(&self, run_id: &str) -> Option<RunState> {
        self.runs.get_final_state(run_id).await
    }

    /// Full stored result of a run
    pub async fn result(&self, run_id: &str) -> Option<Arc<ExecutionResult>> {
        self.runs.get(run_id).await
    }

    /// Execute a graph against an initial state
    ///
    /// `initial_state` is copied up front, so the caller's value never aliases
    /// the run. When a `sink` is given every step log is delivered to it, in
    /// order, before the next node is chosen.
    ///
    /// Errors only for an unknown graph, a reached node whose tool is not
    /// registered, or a sink that stopped accepting entries. In those cases
    /// nothing is stored.
    pub async fn run(
        &self,
        run_id: impl Into<String>,
        graph_id: &str,
        initial_state: &RunState,
        sink: Option<&dyn StepSink>,
    ) -> Result<ExecutionResult> {
        self.execute(run_id.into(), graph_id, initial_state, sink, None)
            .await
    }

    /// Like [`run`](Self::run), checking `cancel` before each step
    pub async fn run_with_cancel(
        &self,
        run_id: impl Into<String>,
        graph_id: &str,
        initial_state: &RunState,
        sink: Option<&dyn StepSink>,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult> {
        self.execute(run_id.into(), graph_id, initial_state, sink, Some(cancel))
            .await
    }

    async fn execute(
        &self,
        run_id: String,
        graph_id: &str,
        initial_state: &RunState,
        sink: Option<&dyn StepSink>,
        cancel: Option<&CancellationToken>,
    ) -> Result<ExecutionResult> {
        let graph = self.graphs.get(graph_id).ok_or_else(|| {
            tracing::warn!(run_id = %run_id, graph_id = %graph_id, "Run requested for unknown graph");
            EngineError::GraphNotFound(graph_id.to_string())
        })?;

        let started_at = Utc::now();
        tracing::info!(run_id = %run_id, graph_id = %graph_id, start_node = %graph.start_node, "🚀 Starting run");

        let plan = RunPlan::build(&graph);
        let mut state = initial_state.clone();
        let mut logs: Vec<ExecutionLog> = Vec::new();
        let mut current = graph.start_node.as_str();
        let max_steps = self.config.max_steps;

        let termination = loop {
            if logs.len() >= max_steps {
                tracing::warn!(run_id = %run_id, max_steps, "Step ceiling reached, stopping run");
                break TerminationReason::StepLimit { max_steps };
            }

            if cancel.is_some_and(CancellationToken::is_cancelled) {
                tracing::warn!(run_id = %run_id, steps = logs.len(), "Run cancelled");
                return Err(EngineError::Cancelled {
                    run_id,
                    steps: logs.len(),
                });
            }

            let step_id = logs.len() + 1;

            let Some(node) = plan.nodes.get(current) else {
                tracing::warn!(run_id = %run_id, node_id = %current, "Reached undeclared node, stopping run");
                break TerminationReason::UnknownNode {
                    node_id: current.to_string(),
                };
            };

            tracing::info!("📍 Step {}: executing node '{}' ({})", step_id, node.id, node.function_name);

            let update = match self.executor.execute_node(node, &state).await {
                Ok(update) => update,
                Err(NodeFailure::ToolNotFound) => {
                    return Err(EngineError::ToolNotFound {
                        tool: node.function_name.clone(),
                        node_id: node.id.clone(),
                    });
                }
                Err(NodeFailure::ToolFailed(e)) => {
                    break TerminationReason::StoppedOnToolError {
                        node_id: node.id.clone(),
                        error: e.to_string(),
                    };
                }
            };

            state.merge(update);
            logs.push(ExecutionLog {
                step_id,
                node_id: node.id.clone(),
                state_snapshot: state.clone(),
            });

            if let (Some(sink), Some(log)) = (sink, logs.last()) {
                sink.deliver(log)
                    .await
                    .map_err(|e| EngineError::SinkClosed {
                        step_id,
                        message: e.to_string(),
                    })?;
            }

            match plan.next_node(current, &state) {
                Some(next) => {
                    tracing::debug!("🔗 Transition '{}' → '{}'", current, next);
                    current = next;
                }
                None => {
                    tracing::debug!(node_id = %current, "No edge conditions matched, run complete");
                    break TerminationReason::Completed {
                        node_id: current.to_string(),
                    };
                }
            }
        };

        let result = ExecutionResult {
            run_id,
            graph_id: graph_id.to_string(),
            final_state: state,
            logs,
            termination,
            started_at,
            finished_at: Utc::now(),
        };

        let elapsed = (result.finished_at - result.started_at).to_std().unwrap_or_default();
        if result.termination.is_natural() {
            tracing::info!(run_id = %result.run_id, steps = result.steps(), "🎉 Run completed in {:?}", elapsed);
        } else {
            tracing::warn!(
                run_id = %result.run_id,
                steps = result.steps(),
                termination = ?result.termination,
                "⚠️ Run stopped early after {:?}",
                elapsed
            );
        }

        self.runs.insert(result.clone()).await;
        Ok(result)
    }
}
