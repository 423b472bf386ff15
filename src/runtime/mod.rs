/// Runtime Execution Engine
///
/// This module provides the step-by-step graph execution engine. It handles:
/// - Resolving nodes to registered tools and invoking them
/// - Shallow-merging tool updates into the run state
/// - First-match conditional transition selection with a step ceiling
/// - Ordered live delivery of step logs and storage of finished runs

// Error taxonomy for aborted runs
pub mod error;

// Tool contract, tool registry and sync/async adapters
pub mod tool;

// Single-node invocation
pub mod executor;

// Step logs, results and termination reasons
pub mod result;

// Ordered per-step delivery to external consumers
pub mod sink;

// Bounded store of completed runs
pub mod store;

// Core execution loop
pub mod engine;

// Re-export main types
pub use engine::ExecutionEngine;
pub use error::EngineError;
pub use result::{ExecutionLog, ExecutionResult, TerminationReason};
pub use sink::{StepDelivery, StepSink};
pub use tool::{async_tool_fn, tool_fn, Tool, ToolRegistry};
