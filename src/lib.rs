//! Python executor - an MCP server that runs untrusted Python code in
//! ephemeral containers.
//!
//! The server exposes a single tool, `execute-python`. Each call gets a fresh
//! workspace holding the script, one `<runtime> run --rm` of a fixed image
//! (optionally preceded by `pip install` of the requested modules), and a
//! text or error result. Failures never surface as protocol errors.
//!
//! # Platform Requirements
//!
//! - A Unix host
//! - A docker-compatible container runtime (`podman` by default)
//!
//! # Example
//!
//! ```no_run
//! use python_executor_mcp::{ServerConfig, server, system};
//!
//! #[tokio::main]
//! async fn main() -> miette::Result<()> {
//!     let config = ServerConfig::default();
//!
//!     // Make sure the container runtime answers
//!     system::check_runtime(&config.sandbox).await?;
//!
//!     // Serve over stdio
//!     server::run(&config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod sandbox;
pub mod server;
pub mod system;

// Re-export commonly used types
pub use config::{ServerConfig, Transport};
pub use error::{Error, ExecError, Result};
pub use sandbox::{Executor, SandboxConfig, ToolResult};
