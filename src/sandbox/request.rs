//! Typed execution requests and argument validation.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use super::security::{ModuleName, parse_module_list};
use crate::error::ExecError;

/// Raw arguments of the `execute-python` tool as they arrive on the wire.
///
/// Fields are kept as untyped JSON so that a missing or mistyped `code`
/// surfaces as a tool error result instead of a protocol-level fault. The
/// advertised schema still describes them as strings.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ExecutePythonArgs {
    /// Python code to execute
    #[schemars(with = "String")]
    pub code: Option<Value>,

    /// Comma-separated list of modules to import
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub modules: Option<Value>,
}

/// A validated request, ready for the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    /// Script body, written to the workspace verbatim.
    pub code: String,
    /// Packages to install before running, in caller order.
    pub modules: Vec<ModuleName>,
}

impl ExecutionRequest {
    /// Validates raw tool arguments.
    ///
    /// # Errors
    ///
    /// - `ExecError::InvalidCode` if `code` is missing, not a string, or blank
    /// - `ExecError::InvalidModules` if `modules` is neither a string nor null
    /// - `ExecError::InvalidModuleName` / `ExecError::TooManyModules` from the
    ///   module policy
    pub fn from_args(args: ExecutePythonArgs) -> Result<Self, ExecError> {
        let code = match args.code {
            Some(Value::String(code)) if !code.trim().is_empty() => code,
            _ => return Err(ExecError::InvalidCode),
        };

        let modules = match args.modules {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::String(raw)) => parse_module_list(&raw)?,
            Some(_) => return Err(ExecError::InvalidModules),
        };

        Ok(Self { code, modules })
    }
}
