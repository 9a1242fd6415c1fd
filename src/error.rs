//! Error types for the Python executor MCP server.
//!
//! Uses thiserror for deriving std::error::Error and miette for rich diagnostics.

use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the application.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Sandbox runtime is not usable
    #[error("Sandbox runtime check failed")]
    #[diagnostic(code(pyexec::system::runtime))]
    RuntimeCheck(#[from] RuntimeCheckError),

    /// MCP server error
    #[error("MCP server error")]
    #[diagnostic(code(pyexec::server))]
    Server(#[from] ServerError),

    /// Invalid startup configuration
    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(pyexec::config))]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    #[diagnostic(code(pyexec::io))]
    Io(#[from] std::io::Error),
}

/// Errors raised while probing the sandbox runtime at startup.
#[derive(Error, Debug, Diagnostic)]
pub enum RuntimeCheckError {
    /// Runtime binary could not be located
    #[error("Sandbox runtime `{runtime}` was not found")]
    #[diagnostic(
        code(pyexec::system::runtime_not_found),
        help("Install podman (or pass --runtime docker), or use --skip-checks")
    )]
    NotFound { runtime: String },

    /// `<runtime> --version` failed or did not answer in time
    #[error("Sandbox runtime `{runtime}` did not report a version: {reason}")]
    #[diagnostic(
        code(pyexec::system::runtime_version),
        help("Verify that `{runtime} --version` works for the current user")
    )]
    VersionProbeFailed { runtime: String, reason: String },
}

/// Errors related to the MCP server.
#[derive(Error, Debug, Diagnostic)]
pub enum ServerError {
    /// Failed to initialize server
    #[error("Failed to initialize MCP server: {0}")]
    #[diagnostic(code(pyexec::server::init))]
    InitializationFailed(String),

    /// Transport error
    #[error("Transport error: {0}")]
    #[diagnostic(code(pyexec::server::transport))]
    Transport(String),

    /// Network listener could not be bound
    #[error("Failed to bind {addr}: {source}")]
    #[diagnostic(
        code(pyexec::server::bind),
        help("Another process may already be listening on this address")
    )]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Coarse classification of [`ExecError`], used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecErrorKind {
    Validation,
    Workspace,
    Launch,
    Runtime,
    Timeout,
    Cancelled,
}

impl std::fmt::Display for ExecErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Validation => "validation",
            Self::Workspace => "workspace",
            Self::Launch => "launch",
            Self::Runtime => "runtime",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Failures of a single `execute-python` invocation.
///
/// The `Display` text of each variant is exactly what the caller sees in the
/// tool's error result, so it must never contain host paths.
#[derive(Error, Debug, Diagnostic)]
pub enum ExecError {
    /// `code` argument missing, not a string, or blank
    #[error("Invalid code parameter")]
    #[diagnostic(code(pyexec::exec::invalid_code))]
    InvalidCode,

    /// `modules` argument present but not a string
    #[error("Invalid modules parameter")]
    #[diagnostic(code(pyexec::exec::invalid_modules))]
    InvalidModules,

    /// A module name failed the allowlist
    #[error("Invalid module name: {0}")]
    #[diagnostic(code(pyexec::exec::invalid_module_name))]
    InvalidModuleName(String),

    /// More modules requested than allowed
    #[error("Too many modules requested: {count} (maximum {max})")]
    #[diagnostic(code(pyexec::exec::too_many_modules))]
    TooManyModules { count: usize, max: usize },

    /// Temporary workspace could not be created
    #[error("Failed to create temporary directory: {0}")]
    #[diagnostic(code(pyexec::exec::workspace_create))]
    WorkspaceCreate(std::io::Error),

    /// Script could not be written into the workspace
    #[error("Failed to write script to temporary file: {0}")]
    #[diagnostic(code(pyexec::exec::script_write))]
    ScriptWrite(std::io::Error),

    /// Sandbox runtime could not be started
    #[error("Failed to execute: {0}")]
    #[diagnostic(code(pyexec::exec::launch))]
    Launch(std::io::Error),

    /// Runtime started and reported a non-zero exit
    #[error("Python exited with code {exit_code}: {stderr}")]
    #[diagnostic(code(pyexec::exec::runtime))]
    Runtime { exit_code: i32, stderr: String },

    /// Execution exceeded the configured timeout
    #[error("Execution timed out after {timeout:?}")]
    #[diagnostic(code(pyexec::exec::timeout))]
    Timeout { timeout: Duration },

    /// Caller cancelled the request
    #[error("Execution cancelled")]
    #[diagnostic(code(pyexec::exec::cancelled))]
    Cancelled,
}

impl ExecError {
    /// Returns the taxonomy bucket of this error.
    #[must_use]
    pub fn kind(&self) -> ExecErrorKind {
        match self {
            Self::InvalidCode
            | Self::InvalidModules
            | Self::InvalidModuleName(_)
            | Self::TooManyModules { .. } => ExecErrorKind::Validation,
            Self::WorkspaceCreate(_) | Self::ScriptWrite(_) => ExecErrorKind::Workspace,
            Self::Launch(_) => ExecErrorKind::Launch,
            Self::Runtime { .. } => ExecErrorKind::Runtime,
            Self::Timeout { .. } => ExecErrorKind::Timeout,
            Self::Cancelled => ExecErrorKind::Cancelled,
        }
    }
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
