//! Tool: memory_stats — store counters and file location.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde_json::{json, Value};

use crate::session::MemorySessionManager;
use crate::types::{McpResult, ToolCallResult, ToolDefinition};

use super::registry::HandlerFuture;

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "memory_stats".to_string(),
        title: "Memory Statistics".to_string(),
        description: "Report entity, relation, and observation counts plus the backing file path."
            .to_string(),
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
    let store = session.store();

    let entities = store.entity_count();
    let relations = store.relation_count();
    let observations = store.observation_count();
    let file_path = session.file_path().display().to_string();

    Ok(ToolCallResult::structured(
        format!("{entities} entities, {relations} relations, {observations} observations"),
        json!({
            "entities": entities,
            "relations": relations,
            "observations": observations,
            "filePath": file_path,
        }),
    ))
}
