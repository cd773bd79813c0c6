//! helloworld MCP server
//!
//! Run with: helloworld-mcp-server --transport <stdio|sse|sse-simple>

use std::net::IpAddr;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use helloworld_mcp::config::{DEFAULT_HEARTBEAT_SECS, DEFAULT_MAX_SESSIONS, DEFAULT_PORT};
use helloworld_mcp::error::Result;
use helloworld_mcp::mcp::{HelloHandler, McpServer};
use helloworld_mcp::sse::{SimpleSseServer, SseServer};
use helloworld_mcp::ServerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    /// JSON-RPC over stdin/stdout
    Stdio,
    /// SSE push stream bound to a session, replies routed over the stream
    Sse,
    /// SSE heartbeats only, replies in the POST body
    SseSimple,
}

#[derive(Parser, Debug)]
#[command(name = "helloworld-mcp-server")]
#[command(about = "Hello-world MCP server")]
#[command(version)]
struct Args {
    /// Transport to serve
    #[arg(long, value_enum, env = "MCP_TRANSPORT", default_value = "sse")]
    transport: Transport,

    /// Bind address
    #[arg(long, env = "MCP_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Listening port
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Seconds between heartbeat comments on push streams
    #[arg(long, env = "MCP_HEARTBEAT_SECS", default_value_t = DEFAULT_HEARTBEAT_SECS)]
    heartbeat_secs: u64,

    /// Maximum number of concurrently open sessions
    #[arg(long, env = "MCP_MAX_SESSIONS", default_value_t = DEFAULT_MAX_SESSIONS)]
    max_sessions: usize,
}

impl Args {
    fn config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host,
            port: self.port,
            heartbeat_interval: Duration::from_secs(self.heartbeat_secs.max(1)),
            max_sessions: self.max_sessions,
            ..ServerConfig::default()
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging to stderr (stdout is for MCP protocol)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = args.config();

    match args.transport {
        Transport::Stdio => {
            let server = McpServer::new(HelloHandler::from_config(&config));
            tracing::info!("MCP stdio server starting...");
            server.run()?;
        }
        Transport::Sse => {
            // One event loop: sessions are interleaved, never run in parallel
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            rt.block_on(SseServer::new(config).start())?;
        }
        Transport::SseSimple => {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            rt.block_on(SimpleSseServer::new(config).start())?;
        }
    }

    Ok(())
}
