//! Tool: open_nodes — fetch entities by exact name.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::session::MemorySessionManager;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::registry::HandlerFuture;

#[derive(Debug, Deserialize)]
struct OpenNodesParams {
    names: Vec<String>,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "open_nodes".to_string(),
        title: "Open Nodes".to_string(),
        description: "Fetch entities by exact name, along with the relations among them. \
                      Unknown names are omitted from the result."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "names": {
                    "type": "array",
                    "items": { "type": "string" }
                }
            },
            "required": ["names"]
        }),
    }
}

pub fn handler(args: Value, session: Arc<Mutex<MemorySessionManager>>) -> HandlerFuture {
    Box::pin(execute(args, session))
}

async fn execute(
    args: Value,
    session: Arc<Mutex<MemorySessionManager>>,
) -> McpResult<ToolCallResult> {
    let params: OpenNodesParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let session = session.lock().await;
    let graph = session.open_nodes(&params.names);

    let payload =
        serde_json::to_value(&graph).map_err(|e| McpError::InternalError(e.to_string()))?;

    Ok(ToolCallResult::structured(
        format!("Opened {} of {} requested entities", graph.entities.len(), params.names.len()),
        payload,
    ))
}
