//! MCP server implementation.
//!
//! This module provides the MCP server that handles tool calls from AI agents,
//! over stdio or streamable HTTP.

mod handler;

use rmcp::{
    ServiceExt,
    transport::{
        stdio,
        streamable_http_server::{
            StreamableHttpService, session::local::LocalSessionManager,
        },
    },
};
use tracing::{debug, info};

pub use handler::{PythonExecutorServer, SERVER_NAME};

use crate::config::{HTTP_ENDPOINT, ServerConfig, Transport};
use crate::error::ServerError;
use crate::sandbox::Executor;

/// Run the MCP server until the client disconnects or the process is interrupted.
///
/// # Errors
///
/// Returns error if server initialization or transport fails.
pub async fn run(config: &ServerConfig) -> crate::error::Result<()> {
    info!(
        runtime = %config.sandbox.runtime,
        image = %config.sandbox.image,
        timeout_ms = %config.sandbox.timeout.as_millis(),
        "Starting Python executor server"
    );

    let executor = Executor::new(config.sandbox.clone());

    match config.transport {
        Transport::Stdio => serve_stdio(executor).await,
        Transport::Http { bind } => serve_http(executor, bind).await,
    }
}

async fn serve_stdio(executor: Executor) -> crate::error::Result<()> {
    debug!("Using stdio transport");

    let service = PythonExecutorServer::with_executor(executor)
        .serve(stdio())
        .await
        .map_err(|e| ServerError::InitializationFailed(e.to_string()))?;

    info!("Server initialized, waiting for requests");

    service
        .waiting()
        .await
        .map_err(|e| ServerError::Transport(e.to_string()))?;

    info!("Server shutdown complete");
    Ok(())
}

async fn serve_http(executor: Executor, bind: std::net::SocketAddr) -> crate::error::Result<()> {
    debug!(%bind, "Using streamable HTTP transport");

    // Every session shares one executor, so the admission limit is server-wide.
    let service = StreamableHttpService::new(
        move || Ok(PythonExecutorServer::with_executor(executor.clone())),
        LocalSessionManager::default().into(),
        Default::default(),
    );
    let router = axum::Router::new().nest_service(HTTP_ENDPOINT, service);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|source| ServerError::Bind { addr: bind, source })?;

    info!("Listening on http://{bind}{HTTP_ENDPOINT}");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Interrupt received, shutting down");
        })
        .await
        .map_err(|e| ServerError::Transport(e.to_string()))?;

    info!("Server shutdown complete");
    Ok(())
}
