//! MCP response types for tools.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "resource_link")]
    ResourceLink {
        uri: String,
        name: String,
        #[serde(default, rename = "mimeType", skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },
}

/// Outcome of a tool call: a human-readable rendering plus a machine-readable
/// payload. Elicitation outcomes are carried here as successes, never as
/// JSON-RPC errors, so callers branch on `structuredContent.elicitation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub content: Vec<ToolContent>,
    #[serde(
        default,
        rename = "structuredContent",
        skip_serializing_if = "Option::is_none"
    )]
    pub structured_content: Option<Value>,
    #[serde(default, rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl ToolCallResult {
    pub fn text(text: String) -> Self {
        Self {
            content: vec![ToolContent::Text { text }],
            structured_content: None,
            is_error: None,
        }
    }

    /// A success with both renderings.
    pub fn structured(text: String, payload: Value) -> Self {
        Self {
            content: vec![ToolContent::Text { text }],
            structured_content: Some(payload),
            is_error: None,
        }
    }

    /// A validation outcome asking the caller to re-issue the call with the
    /// named fields supplied or corrected.
    pub fn elicitation(tool: &str, missing_fields: Vec<String>) -> Self {
        let text = format!(
            "Cannot run {tool} yet: missing or invalid fields: {}. \
             Re-issue the call with these fields supplied.",
            missing_fields.join(", ")
        );
        Self {
            content: vec![ToolContent::Text { text }],
            structured_content: Some(json!({
                "elicitation": true,
                "missingFields": missing_fields,
                "tool": tool,
            })),
            is_error: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolListResult {
    pub tools: Vec<ToolDefinition>,
    #[serde(default, rename = "nextCursor", skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}
