/// Stepwise: minimal graph-based workflow executor
///
/// Main entry point for the stepwise server. Initializes configuration and starts
/// the HTTP server with graph management, execution and streaming endpoints.

use stepwise::{config::Config, server::start_server};

/// Application entry point
///
/// Starts the server with environment-driven configuration. The server provides:
/// - Graph registration at POST /graph/create
/// - Blocking execution at POST /graph/run
/// - Live step streaming at /ws/graph/run
/// - Run state lookup at GET /graph/state/{run_id}
/// - Health check at /healthz
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::default();

    start_server(config).await?;

    Ok(())
}
