//! Engram MCP Server — knowledge-graph memory for LLM agents over JSON-RPC stdio.

pub mod config;
pub mod protocol;
pub mod repl;
pub mod session;
pub mod tools;
pub mod transport;
pub mod types;

pub use config::resolve_memory_path;
pub use protocol::ProtocolHandler;
pub use session::MemorySessionManager;
pub use transport::StdioTransport;
