/// Engine error taxonomy
///
/// Only failures that abort a run are errors. Soft terminations (step ceiling,
/// no matching edge, undeclared node, tool failure) are reported through
/// `TerminationReason` on a successful `ExecutionResult` instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Unknown graph id passed to `run`; the run never starts
    #[error("Graph {0} not found")]
    GraphNotFound(String),

    /// A reached node names a tool with no registry entry
    #[error("Tool {tool} not found in registry (node {node_id})")]
    ToolNotFound { tool: String, node_id: String },

    /// The step sink stopped accepting entries
    #[error("Step sink closed at step {step_id}: {message}")]
    SinkClosed { step_id: usize, message: String },

    /// The run was cancelled before completion
    #[error("Run {run_id} cancelled after {steps} steps")]
    Cancelled { run_id: String, steps: usize },
}

pub type Result<T> = std::result::Result<T, EngineError>;
