//! Engram MCP Server — entry point.

use std::sync::Arc;
use tokio::sync::Mutex;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use engram_mcp::config::resolve_memory_path;
use engram_mcp::protocol::ProtocolHandler;
use engram_mcp::session::MemorySessionManager;
use engram_mcp::tools::ToolRegistry;
use engram_mcp::transport::StdioTransport;

#[derive(Parser)]
#[command(
    name = "engram-mcp",
    about = "MCP server for Engram — knowledge-graph memory for LLM agents",
    version
)]
struct Cli {
    /// Path to the .jsonl memory file.
    #[arg(short, long)]
    memory: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server over stdio (default).
    Serve {
        /// Path to the .jsonl memory file.
        #[arg(short, long)]
        memory: Option<String>,

        /// Reject requests until the client completes `initialize`.
        #[arg(long)]
        strict: bool,
    },

    /// Validate a memory file.
    Validate,

    /// Print server capabilities as JSON.
    Info,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   engram-mcp completions bash > ~/.local/share/bash-completion/completions/engram-mcp
    ///   engram-mcp completions zsh > ~/.zfunc/_engram-mcp
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },

    /// Launch interactive REPL mode.
    Repl,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Serve {
        memory: None,
        strict: false,
    }) {
        Commands::Serve { memory, strict } => {
            let effective_memory = memory.or(cli.memory);
            let memory_path = resolve_memory_path(effective_memory.as_deref());
            let session = MemorySessionManager::open(&memory_path)?;
            let session = Arc::new(Mutex::new(session));
            let handler = ProtocolHandler::new(session).require_initialize(strict);
            let transport = StdioTransport::new(handler);
            transport.run().await?;
        }

        Commands::Validate => {
            let memory_path = resolve_memory_path(cli.memory.as_deref());
            match MemorySessionManager::open(&memory_path) {
                Ok(session) => {
                    let store = session.store();
                    println!("Valid memory file: {memory_path}");
                    println!("  Entities:     {}", store.entity_count());
                    println!("  Relations:    {}", store.relation_count());
                    println!("  Observations: {}", store.observation_count());
                }
                Err(e) => {
                    eprintln!("Invalid memory file: {e}");
                    std::process::exit(1);
                }
            }
        }

        Commands::Info => {
            let capabilities = engram_mcp::types::InitializeResult::default_result();
            let tools = ToolRegistry::with_builtin_tools().list();
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "tools": tools.iter().map(|t| &t.name).collect::<Vec<_>>(),
                "tool_count": tools.len(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "engram-mcp", &mut std::io::stdout());
        }

        Commands::Repl => {
            engram_mcp::repl::run()?;
        }
    }

    Ok(())
}
