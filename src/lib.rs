/// Stepwise: minimal graph-based workflow executor
///
/// This library provides the graph execution engine (conditional routing over a
/// shared JSON state, loop protection, per-step audit trail and live streaming),
/// a bundled demo graph, and a thin HTTP/WebSocket front end.

// Core configuration and setup
pub mod config;

// Graph definition layer - types, registry and structural analysis
pub mod workflow;

// Runtime execution engine - tool invocation, routing, step sinks and run store
pub mod runtime;

// Bundled demo tools and graph
pub mod tools;

// HTTP API layer - REST endpoints and WebSocket streaming
pub mod api;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use runtime::{
    EngineError, ExecutionEngine, ExecutionLog, ExecutionResult, StepDelivery, StepSink, TerminationReason, Tool,
    ToolRegistry,
};
pub use server::start_server;
pub use workflow::{EdgeDefinition, GraphDefinition, NodeDefinition, RunState, StateUpdate};
