//! Tool: search_nodes — substring search over the knowledge graph.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::session::MemorySessionManager;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::registry::HandlerFuture;

#[derive(Debug, Deserialize)]
struct SearchNodesParams {
    query: String,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "search_nodes".to_string(),
        title: "Search Nodes".to_string(),
        description: "Case-insensitive substring search over entity names, types, and \
                      observations. Returns matching entities and the relations among them."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": { "type": "string" }
            },
            "required": ["query"]
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
    let params: SearchNodesParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let session = session.lock().await;
    let graph = session.search(&params.query);

    let payload =
        serde_json::to_value(&graph).map_err(|e| McpError::InternalError(e.to_string()))?;

    Ok(ToolCallResult::structured(
        format!(
            "Found {} entities matching \"{}\"",
            graph.entities.len(),
            params.query
        ),
        payload,
    ))
}
