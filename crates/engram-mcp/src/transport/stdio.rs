//! Stdio transport — reads JSON-RPC from stdin, writes to stdout.
//!
//! Each inbound line is dispatched on its own task, so slow tool calls do not
//! block ingestion; a single writer task owns stdout and emits every response
//! as one complete line, in completion order.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::protocol::ProtocolHandler;
use crate::types::{McpError, McpResult};

use super::framing;

const WRITE_QUEUE_DEPTH: usize = 64;

/// Stdio transport for desktop MCP clients.
pub struct StdioTransport {
    handler: Arc<ProtocolHandler>,
}

impl StdioTransport {
    pub fn new(handler: ProtocolHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Run the transport loop — reads from stdin until EOF, writes to stdout.
    pub async fn run(&self) -> McpResult<()> {
        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin);
        let mut line = String::new();

        let (tx, rx) = mpsc::channel::<String>(WRITE_QUEUE_DEPTH);
        let writer = tokio::spawn(write_loop(rx));

        // Supervisors gate traffic on this line.
        eprintln!("SERVER READY");
        tracing::info!("Stdio transport started");

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await.map_err(McpError::Io)?;

            if bytes_read == 0 {
                tracing::info!("EOF on stdin, shutting down");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let handler = Arc::clone(&self.handler);
            let tx = tx.clone();
            let raw = trimmed.to_string();
            tokio::spawn(async move {
                let Some(response) = handler.handle_line(&raw).await else {
                    return;
                };
                match framing::frame_message(&response) {
                    Ok(framed) => {
                        if tx.send(framed).await.is_err() {
                            tracing::error!("Response writer gone, dropping response");
                        }
                    }
                    Err(e) => tracing::error!("Failed to frame response: {e}"),
                }
            });
        }

        // In-flight tasks hold their own senders; the writer drains them all
        // before exiting.
        drop(tx);
        writer
            .await
            .map_err(|e| McpError::Transport(format!("writer task failed: {e}")))?;

        Ok(())
    }
}

async fn write_loop(mut rx: mpsc::Receiver<String>) {
    let mut stdout = tokio::io::stdout();
    while let Some(framed) = rx.recv().await {
        if let Err(e) = stdout.write_all(framed.as_bytes()).await {
            tracing::error!("Failed to write response: {e}");
            break;
        }
        if let Err(e) = stdout.flush().await {
            tracing::error!("Failed to flush stdout: {e}");
            break;
        }
    }
}
