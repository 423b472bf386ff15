/// Graph Definition Layer
///
/// This module holds the declarative side of the engine:
/// - Type definitions (GraphDefinition, NodeDefinition, EdgeDefinition, RunState)
/// - Lock-free last-write-wins graph registry using ArcSwap
/// - Diagnostic structural analysis with petgraph

// Core graph and state type definitions
pub mod types;

// Hot-reload registry using ArcSwap for zero-downtime updates
pub mod registry;

// Dangling references, reachability and cycle detection
pub mod analysis;

// Re-export commonly used types
pub use analysis::GraphReport;
pub use registry::GraphRegistry;
pub use types::{EdgeDefinition, GraphDefinition, NodeDefinition, RunState, StateUpdate};
