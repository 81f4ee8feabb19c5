//! Tool: delete_observations — remove specific observations from entities.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::session::MemorySessionManager;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::registry::HandlerFuture;

#[derive(Debug, Deserialize)]
struct DeleteObservationsParams {
    deletions: Vec<DeletionArg>,
}

#[derive(Debug, Deserialize)]
struct DeletionArg {
    #[serde(rename = "entityName")]
    entity_name: String,
    observations: Vec<String>,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "delete_observations".to_string(),
        title: "Delete Observations".to_string(),
        description: "Remove specific observation strings from entities. Unknown entities and \
                      unmatched observations are ignored."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "deletions": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "entityName": { "type": "string" },
                            "observations": {
                                "type": "array",
                                "items": { "type": "string" }
                            }
                        },
                        "required": ["entityName", "observations"]
                    }
                }
            },
            "required": ["deletions"]
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
    let params: DeleteObservationsParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let mut session = session.lock().await;
    let mut total = 0;
    for deletion in &params.deletions {
        total += session.delete_observations(&deletion.entity_name, &deletion.observations)?;
    }

    Ok(ToolCallResult::structured(
        format!("Deleted {total} observations"),
        json!({ "observationsDeleted": total }),
    ))
}
