//! Tool: create_entities — add entities to the knowledge graph.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Value};

use engram::EntityDraft;

use crate::session::MemorySessionManager;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::registry::HandlerFuture;

#[derive(Debug, Deserialize)]
struct CreateEntitiesParams {
    entities: Vec<EntityArg>,
}

#[derive(Debug, Deserialize)]
struct EntityArg {
    name: String,
    #[serde(rename = "entityType")]
    entity_type: String,
    #[serde(default)]
    content: Vec<ContentBlockArg>,
    #[serde(default)]
    observations: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlockArg {
    #[serde(default, rename = "type")]
    _kind: String,
    #[serde(default)]
    text: String,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "create_entities".to_string(),
        title: "Create Entities".to_string(),
        description: "Add new entities to the knowledge graph. Existing names are skipped."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "entities": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "entityType": { "type": "string" },
                            "content": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "type": { "type": "string" },
                                        "text": { "type": "string" }
                                    },
                                    "required": ["type"]
                                }
                            },
                            "observations": {
                                "type": "array",
                                "items": { "type": "string" }
                            }
                        },
                        "required": ["name", "entityType"]
                    }
                }
            },
            "required": ["entities"]
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
    let params: CreateEntitiesParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let drafts: Vec<EntityDraft> = params
        .entities
        .into_iter()
        .map(|e| {
            let mut observations = e.observations;
            observations.extend(
                e.content
                    .into_iter()
                    .filter(|block| !block.text.is_empty())
                    .map(|block| block.text),
            );
            EntityDraft {
                name: e.name,
                entity_type: e.entity_type,
                observations,
            }
        })
        .collect();

    let mut session = session.lock().await;
    let created = session.create_entities(drafts)?;

    Ok(ToolCallResult::structured(
        format!("Created {} entities", created.len()),
        json!({
            "entitiesCreated": created.len(),
            "entities": created,
        }),
    ))
}
