//! MCP server handler implementation.

use rmcp::{
    ErrorData as McpError, RoleServer,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Implementation, ServerCapabilities, ServerInfo},
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use tracing::{debug, info};

use crate::error::ExecError;
use crate::sandbox::{ExecutePythonArgs, Executor, SandboxConfig, ToolResult};

/// Name advertised in `initialize`.
pub const SERVER_NAME: &str = "python-executor";

/// The MCP server exposing the `execute-python` tool.
#[derive(Clone)]
pub struct PythonExecutorServer {
    executor: Executor,
    tool_router: ToolRouter<Self>,
}

impl PythonExecutorServer {
    /// Create a new server around `config`.
    #[must_use]
    pub fn new(config: SandboxConfig) -> Self {
        Self::with_executor(Executor::new(config))
    }

    /// Create a server sharing an existing executor (and its admission limit).
    #[must_use]
    pub fn with_executor(executor: Executor) -> Self {
        Self {
            executor,
            tool_router: Self::tool_router(),
        }
    }

    /// Runs the tool body without a request context.
    pub async fn run_tool(&self, args: ExecutePythonArgs) -> ToolResult {
        self.executor.execute_args(args).await
    }
}

impl std::fmt::Debug for PythonExecutorServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PythonExecutorServer")
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

#[tool_router]
impl PythonExecutorServer {
    #[tool(
        name = "execute-python",
        description = "Execute Python code in an isolated environment"
    )]
    async fn execute_python(
        &self,
        Parameters(args): Parameters<ExecutePythonArgs>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        debug!(request_id = ?context.id, "execute-python called");

        // Dropping the pipeline future kills the runtime and removes the workspace.
        let result = tokio::select! {
            result = self.run_tool(args) => result,
            () = context.ct.cancelled() => {
                info!(request_id = ?context.id, "Execution cancelled by client");
                ToolResult::from(ExecError::Cancelled)
            }
        };

        Ok(result.into())
    }
}

#[tool_handler]
impl rmcp::ServerHandler for PythonExecutorServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Python executor - runs Python code in an ephemeral container. \
                 Pass `code` and optionally a comma-separated `modules` list to pip-install first."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }
}
