//! Sandboxed execution of untrusted Python code in ephemeral containers.
//!
//! Each request gets its own [`Workspace`], a [`SandboxInvocation`] built from
//! it, one run of the container runtime, and a [`ToolResult`] translated from
//! the [`ExecutionOutcome`].
//!
//! # Example
//!
//! ```no_run
//! use python_executor_mcp::sandbox::{ExecutionRequest, Executor, SandboxConfig};
//!
//! # async fn demo() {
//! let executor = Executor::new(SandboxConfig::default());
//! let request = ExecutionRequest {
//!     code: "print('ok')".to_string(),
//!     modules: Vec::new(),
//! };
//!
//! let result = executor.execute(&request).await;
//! assert_eq!(result.text(), "ok\n");
//! # }
//! ```

pub mod config;
mod invocation;
mod pipeline;
mod request;
mod result;
pub mod runner;
pub mod security;
mod workspace;

pub use config::SandboxConfig;
pub use invocation::{CONTAINER_NAME_PREFIX, SandboxInvocation, container_name};
pub use pipeline::{Executor, execute};
pub use request::{ExecutePythonArgs, ExecutionRequest};
pub use result::{ToolResult, translate};
pub use runner::{ExecutionOutcome, run};
pub use security::{ModuleName, parse_module_list, validate_module_name};
pub use workspace::{WORKSPACE_PREFIX, Workspace};
