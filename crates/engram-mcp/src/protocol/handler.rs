//! Main request dispatcher — receives JSON-RPC messages, routes to handlers.

use std::sync::Arc;
use tokio::sync::Mutex;

use futures::future::join_all;
use serde_json::Value;

use crate::session::MemorySessionManager;
use crate::tools::ToolRegistry;
use crate::transport::framing;
use crate::types::*;

use super::negotiation::NegotiatedCapabilities;
use super::validator::{classify, Classified};

/// The main protocol handler that dispatches incoming JSON-RPC messages.
///
/// Shared behind an `Arc` so the transport can process any number of
/// requests concurrently; every request yields exactly one response carrying
/// the caller's id, duplicates included.
pub struct ProtocolHandler {
    session: Arc<Mutex<MemorySessionManager>>,
    registry: Arc<ToolRegistry>,
    negotiation: Arc<Mutex<NegotiatedCapabilities>>,
    require_initialize: bool,
}

impl ProtocolHandler {
    pub fn new(session: Arc<Mutex<MemorySessionManager>>) -> Self {
        Self::with_registry(session, ToolRegistry::with_builtin_tools())
    }

    pub fn with_registry(
        session: Arc<Mutex<MemorySessionManager>>,
        registry: ToolRegistry,
    ) -> Self {
        Self {
            session,
            registry: Arc::new(registry),
            negotiation: Arc::new(Mutex::new(NegotiatedCapabilities::default())),
            require_initialize: false,
        }
    }

    /// Reject non-`initialize` requests until a handshake succeeds.
    /// Off by default; clients in the wild call tools without initializing.
    pub fn require_initialize(mut self, strict: bool) -> Self {
        self.require_initialize = strict;
        self
    }

    /// Handle one raw input line: a single message or a batch array.
    /// Returns the serialized response value, or `None` when nothing is owed
    /// (a notification, or a batch of only notifications).
    pub async fn handle_line(&self, line: &str) -> Option<Value> {
        match framing::parse_value(line) {
            Ok(value) => self.handle_value(value).await,
            Err(e) => {
                tracing::warn!("Parse error: {e}");
                Some(error_value(&e, RequestId::Null))
            }
        }
    }

    /// Handle a decoded JSON value, expanding batches into concurrently
    /// dispatched requests whose responses are reassembled in input order.
    pub async fn handle_value(&self, value: Value) -> Option<Value> {
        let Value::Array(items) = value else {
            return self.handle_single(value).await;
        };

        if items.is_empty() {
            let e = McpError::InvalidRequest("empty batch".to_string());
            return Some(error_value(&e, RequestId::Null));
        }

        let results = join_all(items.into_iter().map(|item| self.handle_single(item))).await;
        let responses: Vec<Value> = results.into_iter().flatten().collect();

        if responses.is_empty() {
            None
        } else {
            Some(Value::Array(responses))
        }
    }

    /// Handle one decoded message. Malformed envelopes are answered, not
    /// dropped; notifications are processed without a response.
    pub async fn handle_single(&self, value: Value) -> Option<Value> {
        match classify(value) {
            Classified::Request(request) => Some(self.handle_request(request).await),
            Classified::Notification(notification) => {
                self.handle_notification(notification).await;
                None
            }
            Classified::Invalid { id } => {
                let e = McpError::InvalidRequest(String::new());
                Some(error_value(&e, id))
            }
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Value {
        let id = request.id.clone();
        match self.dispatch_request(&request).await {
            Ok(result) => {
                serde_json::to_value(JsonRpcResponse::new(id, result)).unwrap_or_default()
            }
            Err(e) => error_value(&e, id),
        }
    }

    async fn dispatch_request(&self, request: &JsonRpcRequest) -> McpResult<Value> {
        if self.require_initialize && request.method != "initialize" {
            let negotiation = self.negotiation.lock().await;
            if !negotiation.negotiated() {
                return Err(McpError::NotInitialized);
            }
        }

        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params.clone()).await,
            "tools/list" => self.handle_tools_list().await,
            "tools/call" => self.handle_tools_call(request.params.clone()).await,
            "ping" => Ok(Value::Object(serde_json::Map::new())),
            _ => Err(McpError::MethodNotFound(request.method.clone())),
        }
    }

    async fn handle_notification(&self, notification: JsonRpcNotification) {
        match notification.method.as_str() {
            "initialized" | "notifications/initialized" => {
                let mut negotiation = self.negotiation.lock().await;
                negotiation.mark_initialized();
            }
            "notifications/cancelled" | "$/cancelRequest" => {
                // In-flight work runs to completion; the caller just stops waiting.
                tracing::info!("Received cancellation notification");
            }
            _ => {
                tracing::debug!("Unknown notification: {}", notification.method);
            }
        }
    }

    async fn handle_initialize(&self, params: Option<Value>) -> McpResult<Value> {
        let init_params: InitializeParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::InvalidParams(e.to_string()))?
            .ok_or_else(|| McpError::InvalidParams("Initialize params required".to_string()))?;

        let mut negotiation = self.negotiation.lock().await;
        let result = negotiation.negotiate(init_params)?;

        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    async fn handle_tools_list(&self) -> McpResult<Value> {
        let result = ToolListResult {
            tools: self.registry.list(),
            next_cursor: None,
        };
        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> McpResult<Value> {
        let call_params: ToolCallParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::InvalidParams(e.to_string()))?
            .ok_or_else(|| McpError::InvalidParams("Tool call params required".to_string()))?;

        let result = self
            .registry
            .call(&call_params.name, call_params.arguments, &self.session)
            .await?;

        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }
}

fn error_value(error: &McpError, id: RequestId) -> Value {
    serde_json::to_value(error.to_json_rpc_error(id)).unwrap_or_default()
}
