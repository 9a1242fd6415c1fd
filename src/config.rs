//! Startup configuration.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use tokio::sync::Semaphore;

use crate::sandbox::SandboxConfig;

/// Default listen address of the network transport.
pub const DEFAULT_BIND: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 8080));

/// Path the streamable HTTP service is mounted at.
pub const HTTP_ENDPOINT: &str = "/mcp";

/// How the MCP server talks to its client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    /// JSON-RPC over stdin/stdout.
    #[default]
    Stdio,
    /// Streamable HTTP on a listening socket.
    Http { bind: SocketAddr },
}

/// Complete server configuration, built once in `main`.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Transport binding.
    pub transport: Transport,
    /// Settings for every execution.
    pub sandbox: SandboxConfig,
}

impl ServerConfig {
    /// Creates a stdio configuration with default sandbox settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the transport.
    #[must_use]
    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    /// Sets the sandbox configuration.
    #[must_use]
    pub fn with_sandbox(mut self, sandbox: SandboxConfig) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// Checks values that cannot be expressed in the types.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for a zero timeout, a concurrency limit that is
    /// zero or above [`Semaphore::MAX_PERMITS`], or an empty runtime/image.
    pub fn validate(&self) -> crate::Result<()> {
        let sandbox = &self.sandbox;
        if sandbox.timeout.is_zero() {
            return Err(crate::Error::Config("timeout must be greater than zero".into()));
        }
        if sandbox.max_concurrent == Some(0) {
            return Err(crate::Error::Config(
                "max concurrent executions must be greater than zero".into(),
            ));
        }
        if sandbox
            .max_concurrent
            .is_some_and(|limit| limit > Semaphore::MAX_PERMITS)
        {
            return Err(crate::Error::Config(format!(
                "max concurrent executions must be at most {}",
                Semaphore::MAX_PERMITS
            )));
        }
        if sandbox.runtime.trim().is_empty() {
            return Err(crate::Error::Config("runtime must not be empty".into()));
        }
        if sandbox.image.trim().is_empty() {
            return Err(crate::Error::Config("image must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::new();
        assert_eq!(config.transport, Transport::Stdio);
        assert_eq!(DEFAULT_BIND.to_string(), "127.0.0.1:8080");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let config = ServerConfig::new()
            .with_sandbox(SandboxConfig::default().with_timeout(Duration::ZERO));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let config =
            ServerConfig::new().with_sandbox(SandboxConfig::default().with_max_concurrent(0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_concurrency_is_rejected() {
        let config = ServerConfig::new()
            .with_sandbox(SandboxConfig::default().with_max_concurrent(usize::MAX));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at most"), "{err}");

        let config = ServerConfig::new().with_sandbox(
            SandboxConfig::default().with_max_concurrent(Semaphore::MAX_PERMITS),
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_http_transport() {
        let config = ServerConfig::new().with_transport(Transport::Http { bind: DEFAULT_BIND });
        assert!(matches!(config.transport, Transport::Http { bind } if bind.port() == 8080));
    }
}
