/// HTTP API Layer
///
/// Transport adapter in front of the execution engine. It handles:
/// - Graph registration and inspection
/// - Blocking runs and run state lookup
/// - Live step streaming over WebSocket

// Graph management and blocking execution endpoints
pub mod graphs;

// WebSocket step streaming endpoint
pub mod stream;

// Re-export router builders
pub use graphs::{create_graph_routes, AppState};
pub use stream::create_stream_routes;
