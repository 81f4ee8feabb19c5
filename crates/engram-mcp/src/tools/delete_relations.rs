//! Tool: delete_relations — remove relations by exact triple.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Value};

use engram::RelationDraft;

use crate::session::MemorySessionManager;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::registry::HandlerFuture;

#[derive(Debug, Deserialize)]
struct DeleteRelationsParams {
    relations: Vec<RelationDraft>,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "delete_relations".to_string(),
        title: "Delete Relations".to_string(),
        description: "Remove relations matching the given (from, to, relationType) triples. \
                      Unmatched triples are ignored."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "relations": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "from": { "type": "string" },
                            "to": { "type": "string" },
                            "relationType": { "type": "string" }
                        },
                        "required": ["from", "to", "relationType"]
                    }
                }
            },
            "required": ["relations"]
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
    let params: DeleteRelationsParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let mut session = session.lock().await;
    let removed = session.delete_relations(&params.relations)?;

    Ok(ToolCallResult::structured(
        format!("Deleted {removed} relations"),
        json!({ "relationsDeleted": removed }),
    ))
}
