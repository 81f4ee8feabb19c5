//! Tool: delete_entities — remove entities and their relations.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::session::MemorySessionManager;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::registry::HandlerFuture;

#[derive(Debug, Deserialize)]
struct DeleteEntitiesParams {
    #[serde(rename = "entityNames")]
    entity_names: Vec<String>,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "delete_entities".to_string(),
        title: "Delete Entities".to_string(),
        description: "Remove entities by name, cascading to any relations that touch them. \
                      Unknown names are ignored."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "entityNames": {
                    "type": "array",
                    "items": { "type": "string" }
                }
            },
            "required": ["entityNames"]
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
    let params: DeleteEntitiesParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let mut session = session.lock().await;
    let removed = session.delete_entities(&params.entity_names)?;

    Ok(ToolCallResult::structured(
        format!("Deleted {removed} entities"),
        json!({ "entitiesDeleted": removed }),
    ))
}
