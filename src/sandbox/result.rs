//! Mapping of execution outcomes onto tool results.

use rmcp::model::{CallToolResult, Content};

use super::ExecutionOutcome;
use crate::error::ExecError;

/// What the caller receives. Both variants travel in a successful
/// protocol response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolResult {
    /// Captured standard output.
    Text(String),
    /// Human-readable failure description.
    Error(String),
}

impl ToolResult {
    /// Returns `true` for [`ToolResult::Error`].
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Returns the text payload regardless of variant.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) | Self::Error(text) => text,
        }
    }
}

impl From<ExecError> for ToolResult {
    fn from(err: ExecError) -> Self {
        Self::Error(err.to_string())
    }
}

impl From<ToolResult> for CallToolResult {
    fn from(result: ToolResult) -> Self {
        match result {
            ToolResult::Text(text) => CallToolResult::success(vec![Content::text(text)]),
            ToolResult::Error(message) => CallToolResult::error(vec![Content::text(message)]),
        }
    }
}

/// Translates a runner outcome.
#[must_use]
pub fn translate(outcome: ExecutionOutcome) -> ToolResult {
    match outcome {
        ExecutionOutcome::Success(stdout) => {
            ToolResult::Text(String::from_utf8_lossy(&stdout).into_owned())
        }
        ExecutionOutcome::RuntimeFailure { exit_code, stderr } => ExecError::Runtime {
            exit_code,
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        }
        .into(),
        ExecutionOutcome::LaunchFailure(e) => ExecError::Launch(e).into(),
        ExecutionOutcome::TimedOut(timeout) => ExecError::Timeout { timeout }.into(),
    }
}
