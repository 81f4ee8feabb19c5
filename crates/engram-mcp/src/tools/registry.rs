//! Tool registration and dispatch.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Mutex;

use serde_json::Value;

use crate::protocol::elicitation;
use crate::session::MemorySessionManager;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::{
    add_observations, create_entities, create_relations, delete_entities, delete_observations,
    delete_relations, list_files, memory_stats, open_nodes, read_graph, search_nodes,
};

pub type HandlerFuture = Pin<Box<dyn Future<Output = McpResult<ToolCallResult>> + Send>>;

/// A tool handler: caller-supplied arguments plus the shared session.
pub type ToolHandlerFn = fn(Value, Arc<Mutex<MemorySessionManager>>) -> HandlerFuture;

/// One registered tool: its wire descriptor and its handler.
pub struct RegisteredTool {
    pub definition: ToolDefinition,
    handler: ToolHandlerFn,
}

/// Closed name → tool table, built once at startup and read-only afterwards.
/// Registration order is preserved for `tools/list`.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// The full built-in tool set, in listing order.
    pub fn with_builtin_tools() -> Self {
        let mut registry = Self::new();
        registry.register(create_entities::definition(), create_entities::handler);
        registry.register(create_relations::definition(), create_relations::handler);
        registry.register(add_observations::definition(), add_observations::handler);
        registry.register(delete_entities::definition(), delete_entities::handler);
        registry.register(delete_observations::definition(), delete_observations::handler);
        registry.register(delete_relations::definition(), delete_relations::handler);
        registry.register(read_graph::definition(), read_graph::handler);
        registry.register(search_nodes::definition(), search_nodes::handler);
        registry.register(open_nodes::definition(), open_nodes::handler);
        registry.register(list_files::definition(), list_files::handler);
        registry.register(memory_stats::definition(), memory_stats::handler);
        registry
    }

    /// Register a tool. Re-registering a name replaces the earlier entry in
    /// place, keeping its position in the listing order.
    pub fn register(&mut self, definition: ToolDefinition, handler: ToolHandlerFn) {
        debug_assert!(
            !definition.title.is_empty() && definition.title != definition.name,
            "tool title must be set and distinct from its name"
        );
        let registered = RegisteredTool {
            definition,
            handler,
        };
        match self
            .tools
            .iter_mut()
            .find(|t| t.definition.name == registered.definition.name)
        {
            Some(existing) => *existing = registered,
            None => self.tools.push(registered),
        }
    }

    /// All descriptors in registration order.
    pub fn list(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition.clone()).collect()
    }

    pub fn resolve(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.iter().find(|t| t.definition.name == name)
    }

    /// Resolve and invoke a tool. Arguments are validated against the tool's
    /// declared schema first; findings short-circuit the handler and come
    /// back as an elicitation result rather than an error.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<Value>,
        session: &Arc<Mutex<MemorySessionManager>>,
    ) -> McpResult<ToolCallResult> {
        let tool = self
            .resolve(name)
            .ok_or_else(|| McpError::ToolNotFound(name.to_string()))?;

        let args = arguments.unwrap_or_else(|| Value::Object(serde_json::Map::new()));

        let findings = elicitation::validate_arguments(&tool.definition.input_schema, &args);
        if !findings.is_empty() {
            tracing::debug!("Eliciting {} field(s) for {name}", findings.len());
            return Ok(ToolCallResult::elicitation(name, findings));
        }

        (tool.handler)(args, Arc::clone(session)).await
    }
}
