//! Tool: add_observations — record new observations on existing entities.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::session::MemorySessionManager;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::registry::HandlerFuture;

#[derive(Debug, Deserialize)]
struct AddObservationsParams {
    observations: Vec<ObservationArg>,
}

#[derive(Debug, Deserialize)]
struct ObservationArg {
    #[serde(rename = "entityName")]
    entity_name: String,
    contents: Vec<String>,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "add_observations".to_string(),
        title: "Add Observations".to_string(),
        description: "Append observation strings to existing entities. Duplicates are skipped; \
                      unknown entities are an error."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "observations": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "entityName": { "type": "string" },
                            "contents": {
                                "type": "array",
                                "items": { "type": "string" }
                            }
                        },
                        "required": ["entityName", "contents"]
                    }
                }
            },
            "required": ["observations"]
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
    let params: AddObservationsParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let mut session = session.lock().await;
    let mut per_entity = Vec::new();
    let mut total = 0;
    for obs in params.observations {
        let added = session.add_observations(&obs.entity_name, obs.contents)?;
        total += added;
        per_entity.push(json!({ "entityName": obs.entity_name, "added": added }));
    }

    Ok(ToolCallResult::structured(
        format!("Added {total} observations"),
        json!({
            "observationsAdded": total,
            "results": per_entity,
        }),
    ))
}
