//! Tool: list_files — list memory files on disk as resource links.

use std::sync::Arc;
use tokio::sync::Mutex;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::session::MemorySessionManager;
use crate::types::{McpResult, ToolCallResult, ToolContent, ToolDefinition};

use super::registry::HandlerFuture;

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "list_files".to_string(),
        title: "List Memory Files".to_string(),
        description: "List the memory files in the store directory, including the active one, \
                      as file:// resource links."
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
    let active = session.file_path().clone();
    drop(session);

    let dir = active
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    let mut items = Vec::new();
    if let Ok(entries) = std::fs::read_dir(&dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "jsonl") {
                let metadata = entry.metadata().ok();
                let size = metadata.as_ref().map(|m| m.len()).unwrap_or(0);
                let modified = metadata
                    .and_then(|m| m.modified().ok())
                    .map(|t| DateTime::<Utc>::from(t).to_rfc3339());
                let name = path
                    .file_name()
                    .and_then(|s| s.to_str())
                    .unwrap_or_default()
                    .to_string();
                items.push(json!({
                    "name": name,
                    "path": path.display().to_string(),
                    "size": size,
                    "modifiedAt": modified,
                    "active": path == active,
                }));
            }
        }
    }
    items.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));

    let links: Vec<Value> = items
        .iter()
        .map(|item| {
            json!({
                "type": "resource_link",
                "uri": format!("file://{}", item["path"].as_str().unwrap_or_default()),
                "name": item["name"],
                "mimeType": "application/jsonl",
            })
        })
        .collect();

    let mut content = vec![ToolContent::Text {
        text: format!("{} memory files in {}", items.len(), dir.display()),
    }];
    for item in &items {
        content.push(ToolContent::ResourceLink {
            uri: format!("file://{}", item["path"].as_str().unwrap_or_default()),
            name: item["name"].as_str().unwrap_or_default().to_string(),
            mime_type: Some("application/jsonl".to_string()),
        });
    }

    Ok(ToolCallResult {
        content,
        structured_content: Some(json!({
            "items": items,
            "resourceLinks": links,
        })),
        is_error: None,
    })
}
