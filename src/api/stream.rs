/// WebSocket endpoint streaming a run step by step
///
/// Protocol: the client sends one text frame `{"graph_id": "...", "initial_state": {...}}`.
/// The server answers with `{"type": "start", "run_id"}`, one `{"type": "log", ...}`
/// frame per completed step, then `{"type": "result", "final_state"}` and closes.
/// Failures are reported as `{"error": "..."}` before closing.

use crate::api::graphs::AppState;
use crate::runtime::{ExecutionLog, StepSink};
use crate::workflow::RunState;
use axum::{
    extract::{
        ws::{Message, Utf8Bytes, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::Mutex;

/// First frame sent by the client
#[derive(Debug, Deserialize)]
struct StreamRunRequest {
    graph_id: Option<String>,
    #[serde(default)]
    initial_state: RunState,
}

/// Create the streaming route
pub fn create_stream_routes() -> Router<AppState> {
    Router::new().route("/ws/graph/run", get(ws_handler))
}

// GET /ws/graph/run: WebSocket upgrade
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: AppState) {
    tracing::info!("WebSocket client connected");

    if let Err(e) = stream_run(&mut socket, &state).await {
        tracing::debug!("WebSocket stream ended early: {}", e);
        let _ = send_json(&mut socket, json!({ "error": e.to_string() })).await;
    }

    let _ = socket.send(Message::Close(None)).await;
    tracing::debug!("WebSocket client disconnected");
}

async fn stream_run(socket: &mut WebSocket, state: &AppState) -> anyhow::Result<()> {
    let text = loop {
        match socket.recv().await {
            Some(Ok(Message::Text(text))) => break text,
            Some(Ok(Message::Close(_))) | None => return Ok(()),
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(e.into()),
        }
    };

    let request: StreamRunRequest =
        serde_json::from_str(text.as_str()).map_err(|_| anyhow::anyhow!("Invalid JSON"))?;

    let graph_id = request
        .graph_id
        .filter(|id| state.engine.graph(id).is_some())
        .ok_or_else(|| anyhow::anyhow!("Graph not found"))?;

    let run_id = uuid::Uuid::new_v4().to_string();
    send_json(socket, json!({ "type": "start", "run_id": run_id })).await?;

    let result = {
        let sink = SocketSink {
            socket: Mutex::new(&mut *socket),
            delay: Duration::from_millis(state.stream.step_delay_ms),
        };
        state
            .engine
            .run(run_id, &graph_id, &request.initial_state, Some(&sink))
            .await?
    };

    send_json(
        socket,
        json!({ "type": "result", "final_state": result.final_state }),
    )
    .await
}

/// Writes each step to the socket, then waits out the pacing delay.
/// The run does not advance until both are done.
struct SocketSink<'s> {
    socket: Mutex<&'s mut WebSocket>,
    delay: Duration,
}

impl StepSink for SocketSink<'_> {
    fn deliver<'a>(&'a self, log: &'a ExecutionLog) -> BoxFuture<'a, anyhow::Result<()>> {
        async move {
            let frame = json!({
                "type": "log",
                "step_id": log.step_id,
                "node_id": log.node_id,
                "state_snapshot": log.state_snapshot.as_map(),
            });
            {
                let mut socket = self.socket.lock().await;
                send_json(&mut **socket, frame).await?;
            }
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(())
        }
        .boxed()
    }
}

async fn send_json(socket: &mut WebSocket, value: Value) -> anyhow::Result<()> {
    socket
        .send(Message::Text(Utf8Bytes::from(value.to_string())))
        .await?;
    Ok(())
}
