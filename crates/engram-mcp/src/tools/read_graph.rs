//! Tool: read_graph — return the entire knowledge graph.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde_json::{json, Value};

use crate::session::MemorySessionManager;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::registry::HandlerFuture;

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "read_graph".to_string(),
        title: "Read Graph".to_string(),
        description: "Return every entity and relation in the knowledge graph.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {}
        }),
    }
}

pub fn handler(args: Value, session: Arc<Mutex<MemorySessionManager>>) -> HandlerFuture {
    Box::pin(execute(args, session))
}

async fn execute(
    _args: Value,
    session: Arc<Mutex<MemorySessionManager>>,
) -> McpResult<ToolCallResult> {
    let session = session.lock().await;
    let graph = session.store().read();

    let payload =
        serde_json::to_value(graph).map_err(|e| McpError::InternalError(e.to_string()))?;

    Ok(ToolCallResult::structured(
        format!(
            "Graph has {} entities and {} relations",
            graph.entities.len(),
            graph.relations.len()
        ),
        payload,
    ))
}
