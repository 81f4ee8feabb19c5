//! MCP protocol version negotiation during initialization.

use crate::types::{
    ClientCapabilities, InitializeParams, InitializeResult, McpError, McpResult,
    SUPPORTED_PROTOCOL_VERSIONS,
};

/// Negotiation state: unversioned until an `initialize` succeeds.
#[derive(Debug, Clone, Default)]
pub struct NegotiatedCapabilities {
    pub client: ClientCapabilities,
    pub protocol_version: Option<String>,
    pub initialized: bool,
}

impl NegotiatedCapabilities {
    /// Check the client's declared version against the supported set. A
    /// mismatch is an error and leaves the state untouched.
    pub fn negotiate(&mut self, params: InitializeParams) -> McpResult<InitializeResult> {
        if !SUPPORTED_PROTOCOL_VERSIONS.contains(&params.protocol_version.as_str()) {
            tracing::warn!(
                "Client {} v{} requested unsupported protocol version {}",
                params.client_info.name,
                params.client_info.version,
                params.protocol_version
            );
            return Err(McpError::ProtocolVersionMismatch(params.protocol_version));
        }

        self.client = params.capabilities;
        self.protocol_version = Some(params.protocol_version.clone());

        tracing::info!(
            "Negotiated protocol {} with client: {} v{}",
            params.protocol_version,
            params.client_info.name,
            params.client_info.version
        );

        Ok(InitializeResult::for_version(&params.protocol_version))
    }

    /// Whether `initialize` has succeeded on this connection.
    pub fn negotiated(&self) -> bool {
        self.protocol_version.is_some()
    }

    pub fn mark_initialized(&mut self) {
        self.initialized = true;
        tracing::info!("MCP handshake complete");
    }
}
