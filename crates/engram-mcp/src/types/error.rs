//! Error types and JSON-RPC error codes for the MCP server.

use serde_json::json;

use super::message::{JsonRpcError, JsonRpcErrorObject, RequestId, JSONRPC_VERSION};

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// MCP-specific error codes.
pub mod mcp_error_codes {
    pub const NOT_INITIALIZED: i32 = -32002;
    pub const REQUEST_CANCELLED: i32 = -32800;
    pub const TOOL_NOT_FOUND: i32 = -32803;
    pub const MEMORY_ERROR: i32 = -32850;
}

/// All errors that can occur in the MCP server.
#[derive(thiserror::Error, Debug)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    // The wire message is fixed by convention; detail travels in error.data.
    #[error("Invalid Request")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Server not initialized")]
    NotInitialized,

    #[error("Request cancelled")]
    RequestCancelled,

    #[error("Unknown tool: {0}")]
    ToolNotFound(String),

    #[error("Unsupported protocol version: {0}")]
    ProtocolVersionMismatch(String),

    #[error("Memory error: {0}")]
    Memory(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpError {
    pub fn code(&self) -> i32 {
        use error_codes::*;
        use mcp_error_codes::*;
        match self {
            McpError::ParseError(_) => PARSE_ERROR,
            McpError::InvalidRequest(_) => INVALID_REQUEST,
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams(_) => INVALID_PARAMS,
            McpError::InternalError(_) => INTERNAL_ERROR,
            McpError::NotInitialized => NOT_INITIALIZED,
            McpError::RequestCancelled => REQUEST_CANCELLED,
            McpError::ToolNotFound(_) => TOOL_NOT_FOUND,
            McpError::ProtocolVersionMismatch(_) => INVALID_PARAMS,
            McpError::Memory(_) => MEMORY_ERROR,
            McpError::Transport(_) | McpError::Io(_) => INTERNAL_ERROR,
            McpError::Json(_) => PARSE_ERROR,
        }
    }

    pub fn to_json_rpc_error(&self, id: RequestId) -> JsonRpcError {
        let data = match self {
            McpError::InvalidRequest(detail) if !detail.is_empty() => {
                Some(json!({ "detail": detail }))
            }
            McpError::ProtocolVersionMismatch(_) => Some(json!({
                "supported": super::capabilities::SUPPORTED_PROTOCOL_VERSIONS,
            })),
            _ => None,
        };
        JsonRpcError {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error: JsonRpcErrorObject {
                code: self.code(),
                message: self.to_string(),
                data,
            },
        }
    }
}

impl From<engram::MemoryError> for McpError {
    fn from(e: engram::MemoryError) -> Self {
        McpError::Memory(e.to_string())
    }
}

pub type McpResult<T> = Result<T, McpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_request_message_is_exact() {
        let err = McpError::InvalidRequest("missing method".to_string());
        assert_eq!(err.to_string(), "Invalid Request");

        let wire = err.to_json_rpc_error(RequestId::Null);
        assert_eq!(wire.error.code, -32600);
        assert_eq!(wire.error.data.unwrap()["detail"], "missing method");
    }

    #[test]
    fn version_mismatch_names_protocol_version() {
        let err = McpError::ProtocolVersionMismatch("0.0.1".to_string());
        let msg = err.to_string().to_lowercase();
        assert!(msg.contains("protocol version"), "got: {msg}");
    }

    #[test]
    fn unknown_tool_phrasing() {
        let err = McpError::ToolNotFound("bogus".to_string());
        assert!(err.to_string().to_lowercase().contains("unknown tool"));
    }
}
