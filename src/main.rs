//! Python executor - Entry Point
//!
//! This is the main entry point for the MCP server binary.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tracing::{Level, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use python_executor_mcp::config::DEFAULT_BIND;
use python_executor_mcp::sandbox::config::{DEFAULT_IMAGE, DEFAULT_RUNTIME};
use python_executor_mcp::{SandboxConfig, ServerConfig, Transport, server, system};

/// Python executor - run Python code in ephemeral containers over MCP.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Serve over HTTP on --bind instead of stdio
    #[arg(long, visible_alias = "http", default_value = "false")]
    sse: bool,

    /// Listen address for the HTTP transport
    #[arg(long, default_value_t = DEFAULT_BIND)]
    bind: SocketAddr,

    /// Container runtime binary
    #[arg(long, env = "PYEXEC_RUNTIME", default_value = DEFAULT_RUNTIME)]
    runtime: String,

    /// Image the code runs in
    #[arg(long, env = "PYEXEC_IMAGE", default_value = DEFAULT_IMAGE)]
    image: String,

    /// Execution timeout in seconds, pip install included
    #[arg(long, env = "PYEXEC_TIMEOUT_SECS", default_value = "120")]
    timeout_secs: u64,

    /// Maximum simultaneous executions (unlimited when unset)
    #[arg(long, env = "PYEXEC_MAX_CONCURRENT")]
    max_concurrent: Option<usize>,

    /// Skip the container runtime check
    #[arg(long, default_value = "false")]
    skip_checks: bool,

    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        let mut sandbox = SandboxConfig::default()
            .with_runtime(self.runtime)
            .with_image(self.image)
            .with_timeout(Duration::from_secs(self.timeout_secs));
        sandbox.max_concurrent = self.max_concurrent;

        let transport = if self.sse {
            Transport::Http { bind: self.bind }
        } else {
            Transport::Stdio
        };

        ServerConfig::new()
            .with_transport(transport)
            .with_sandbox(sandbox)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    // MCP requires that logs go to stderr (stdout is for JSON-RPC)
    let filter = if args.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    info!("Python executor v{}", env!("CARGO_PKG_VERSION"));

    let skip_checks = args.skip_checks;
    let config = args.into_config();
    config.validate().into_diagnostic()?;

    if skip_checks {
        warn!("Skipping container runtime check (--skip-checks)");
    } else {
        info!("Checking container runtime...");

        match system::check_runtime(&config.sandbox).await {
            Ok(runtime) => {
                info!(path = %runtime.path.display(), "Container runtime available: {}", runtime.version);
            }
            Err(e) => {
                error!("Container runtime check failed");
                return Err(e).into_diagnostic();
            }
        }
    }

    server::run(&config).await.into_diagnostic()
}
