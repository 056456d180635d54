//! HTTP server configuration object.

use std::net::SocketAddr;
use std::time::Duration;

/// Listener and lifecycle settings for the HTTP server.
#[derive(Debug, Clone, Copy)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) shutdown_timeout: Duration,
}

impl ServerConfig {
    /// Bind to `bind_addr` with a 10 second graceful shutdown window.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            shutdown_timeout: Duration::from_secs(10),
        }
    }

    /// Override the graceful shutdown window.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}
