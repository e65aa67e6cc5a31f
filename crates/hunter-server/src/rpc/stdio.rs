//! Line-delimited JSON transport over stdin/stdout.
//!
//! Requests:  `{"id": .., "tool": "...", "params": {...}}`
//! Responses: `{"id": .., "result": {...}}`
//! Progress:  `{"id": .., "progress": n, "total": m}` interleaved while a
//! job runs, in the order the engine generated them.
//!
//! The built-in names `tools/list`, `resources/list` and `resources/read`
//! answer without touching an engine.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tokio::sync::Mutex;
use tracing::{info, warn};

use hunter_engine::ProgressSink;

use crate::resources;
use crate::tools::ToolRegistry;

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Value,
    tool: String,
    #[serde(default)]
    params: Value,
}

/// Writes progress events for one request onto the shared stdout.
/// Failed writes are dropped: progress is fire-and-forget.
struct StdoutProgress {
    id: Value,
    out: Arc<Mutex<Stdout>>,
}

#[async_trait]
impl ProgressSink for StdoutProgress {
    async fn report(&self, current: u64, total: u64) {
        let line = json!({ "id": self.id, "progress": current, "total": total }).to_string();
        let mut out = self.out.lock().await;
        let _ = out.write_all(line.as_bytes()).await;
        let _ = out.write_all(b"\n").await;
        let _ = out.flush().await;
    }
}

async fn write_response(out: &Arc<Mutex<Stdout>>, id: Value, result: Value) -> anyhow::Result<()> {
    let line = json!({ "id": id, "result": result }).to_string();
    let mut out = out.lock().await;
    out.write_all(line.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await?;
    Ok(())
}

/// Serve requests from stdin until end-of-stream.
pub async fn serve(registry: Arc<ToolRegistry>) -> anyhow::Result<()> {
    let out = Arc::new(Mutex::new(io::stdout()));
    let mut lines = BufReader::new(io::stdin()).lines();

    info!("stdio transport ready with {} tools", registry.len());

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let request: Request = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                warn!("Ignoring malformed request line: {e}");
                continue;
            }
        };

        let result = match request.tool.as_str() {
            "tools/list" => registry.manifest(),
            "resources/list" => resources::manifest(),
            "resources/read" => {
                let uri = request.params["uri"].as_str().unwrap_or("");
                match resources::find(uri) {
                    Some(resource) => json!({
                        "uri": resource.uri,
                        "content": resource.content,
                    }),
                    None => json!({
                        "status": "error",
                        "error": format!("Unknown resource: {uri}"),
                    }),
                }
            }
            name => {
                let sink = StdoutProgress {
                    id: request.id.clone(),
                    out: out.clone(),
                };
                match registry.invoke(name, request.params, Some(&sink)).await {
                    Ok(value) => value,
                    Err(e) => json!({ "status": "error", "error": e.to_string() }),
                }
            }
        };

        write_response(&out, request.id, result).await?;
    }

    info!("stdin closed, shutting down");
    Ok(())
}
