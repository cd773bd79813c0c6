//! Server configuration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Default listening port
pub const DEFAULT_PORT: u16 = 8787;

/// Default interval between heartbeat comments on open push streams
pub const DEFAULT_HEARTBEAT_SECS: u64 = 15;

/// Default cap on concurrently open sessions
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

/// Configuration shared by the HTTP transports
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: IpAddr,
    /// Listening port
    pub port: u16,
    /// Interval between `: heartbeat` comments on push streams
    pub heartbeat_interval: Duration,
    /// Delay before the simple transport pushes its `initialized` frame
    pub initialized_delay: Duration,
    /// Maximum number of open sessions (sessioned transport only)
    pub max_sessions: usize,
    /// Path of the request channel advertised in the `endpoint` event
    pub message_path: String,
    /// Name reported in `serverInfo` and by the health check
    pub server_name: String,
    /// Version reported in `serverInfo`
    pub server_version: String,
}

impl ServerConfig {
    /// Socket address to listen on
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            heartbeat_interval: Duration::from_secs(DEFAULT_HEARTBEAT_SECS),
            initialized_delay: Duration::from_millis(100),
            max_sessions: DEFAULT_MAX_SESSIONS,
            message_path: "/message".to_string(),
            server_name: "helloworld-mcp-remote".to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
