//! Tool: create_relations — add typed edges between entities.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Value};

use engram::RelationDraft;

use crate::session::MemorySessionManager;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::registry::HandlerFuture;

#[derive(Debug, Deserialize)]
struct CreateRelationsParams {
    relations: Vec<RelationDraft>,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "create_relations".to_string(),
        title: "Create Relations".to_string(),
        description:
            "Add directed relations between entities, named in active voice (e.g. depends_on). \
             Existing triples are skipped."
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
    let params: CreateRelationsParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let mut session = session.lock().await;
    let created = session.create_relations(params.relations)?;

    Ok(ToolCallResult::structured(
        format!("Created {} relations", created.len()),
        json!({
            "relationsCreated": created.len(),
            "relations": created,
        }),
    ))
}
