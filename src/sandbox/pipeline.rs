//! The per-request execution pipeline.
//!
//! ```text
//! Received -> Validated -> WorkspacePrepared -> Invoked -> Succeeded | Failed
//!          -> WorkspaceReleased -> Responded
//! ```
//!
//! Validation happens before any resource is acquired. Once a workspace
//! exists it is released on every path: explicitly after the runner returns,
//! or by `Drop` on an early error return or when the future is cancelled.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use super::invocation::{SandboxInvocation, container_name};
use super::request::{ExecutePythonArgs, ExecutionRequest};
use super::result::{ToolResult, translate};
use super::runner::{self, ExecutionOutcome};
use super::{SandboxConfig, Workspace};
use crate::error::ExecError;

/// Runs one validated request end to end.
#[instrument(
    skip_all,
    fields(modules = request.modules.len(), code_bytes = request.code.len())
)]
pub async fn execute(config: &SandboxConfig, request: &ExecutionRequest) -> ToolResult {
    let start = Instant::now();

    match run_in_workspace(config, request).await {
        Ok(outcome) => {
            info!(
                outcome = outcome.label(),
                elapsed_ms = %start.elapsed().as_millis(),
                "Execution finished"
            );
            translate(outcome)
        }
        Err(e) => {
            warn!(kind = %e.kind(), error = %e, "Execution aborted before launch");
            e.into()
        }
    }
}

async fn run_in_workspace(
    config: &SandboxConfig,
    request: &ExecutionRequest,
) -> Result<ExecutionOutcome, ExecError> {
    let workspace = Workspace::acquire(config)?;
    workspace.write_script(&request.code)?;

    let invocation = SandboxInvocation::build(
        config,
        workspace.host_path(),
        &request.modules,
        container_name(),
    );
    debug!(container = %invocation.container_name, "Invocation built");

    let outcome = runner::run(&invocation, config.timeout).await;

    if let Err(e) = workspace.release() {
        warn!(error = %e, "Failed to remove workspace");
    }

    Ok(outcome)
}

/// Shared entry point used by the server: configuration plus optional
/// admission limit.
#[derive(Debug, Clone)]
pub struct Executor {
    config: Arc<SandboxConfig>,
    permits: Option<Arc<Semaphore>>,
}

impl Executor {
    /// Creates an executor; `config.max_concurrent` sizes the admission limit,
    /// clamped to what a tokio semaphore can hold.
    #[must_use]
    pub fn new(config: SandboxConfig) -> Self {
        let permits = config
            .max_concurrent
            .map(|limit| Arc::new(Semaphore::new(limit.clamp(1, Semaphore::MAX_PERMITS))));
        Self {
            config: Arc::new(config),
            permits,
        }
    }

    /// Validates raw tool arguments and runs them.
    ///
    /// Always yields a [`ToolResult`]; failures become [`ToolResult::Error`].
    pub async fn execute_args(&self, args: ExecutePythonArgs) -> ToolResult {
        match ExecutionRequest::from_args(args) {
            Ok(request) => self.execute(&request).await,
            Err(e) => {
                debug!(error = %e, "Rejected tool arguments");
                e.into()
            }
        }
    }

    /// Runs a validated request, waiting for an admission permit if limited.
    pub async fn execute(&self, request: &ExecutionRequest) -> ToolResult {
        let _permit = match &self.permits {
            Some(permits) => {
                if permits.available_permits() == 0 {
                    debug!("Waiting for an execution slot");
                }
                // The semaphore is never closed.
                permits.acquire().await.ok()
            }
            None => None,
        };

        execute(&self.config, request).await
    }
}
