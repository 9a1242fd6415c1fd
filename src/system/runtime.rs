//! Container runtime availability check.

use std::ffi::OsStr;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, instrument};

use crate::error::{Result, RuntimeCheckError};
use crate::sandbox::SandboxConfig;

/// Upper bound for `<runtime> --version`.
pub const VERSION_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// What the check found.
#[derive(Debug, Clone)]
pub struct RuntimeInfo {
    /// Resolved absolute path of the runtime binary.
    pub path: PathBuf,
    /// First line of `--version` output (e.g. "podman version 5.0.2")
    pub version: String,
}

/// Verifies that the configured runtime exists and answers `--version`.
///
/// # Errors
///
/// Returns `RuntimeCheckError::NotFound` if the binary cannot be resolved, or
/// `RuntimeCheckError::VersionProbeFailed` if the probe fails, exits non-zero,
/// or exceeds [`VERSION_PROBE_TIMEOUT`].
#[instrument(skip(config), fields(runtime = %config.runtime))]
pub async fn check_runtime(config: &SandboxConfig) -> Result<RuntimeInfo> {
    let path = resolve_runtime(&config.runtime, std::env::var_os("PATH").as_deref()).ok_or_else(
        || RuntimeCheckError::NotFound {
            runtime: config.runtime.clone(),
        },
    )?;
    debug!(path = %path.display(), "Resolved runtime path");

    let probe_failed = |reason: String| RuntimeCheckError::VersionProbeFailed {
        runtime: config.runtime.clone(),
        reason,
    };

    let mut cmd = Command::new(&path);
    cmd.arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = tokio::time::timeout(VERSION_PROBE_TIMEOUT, cmd.output())
        .await
        .map_err(|_| probe_failed(format!("no answer within {VERSION_PROBE_TIMEOUT:?}")))?
        .map_err(|e| probe_failed(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(probe_failed(format!(
            "exited with {}: {}",
            output.status,
            stderr.trim()
        ))
        .into());
    }

    let version = parse_version(&String::from_utf8_lossy(&output.stdout))
        .ok_or_else(|| probe_failed("empty version output".to_string()))?;

    Ok(RuntimeInfo { path, version })
}

/// Resolves `runtime` to an executable path.
///
/// Names containing `/` are taken as paths; bare names are searched in
/// `path_var` (a `PATH`-style list).
#[must_use]
pub fn resolve_runtime(runtime: &str, path_var: Option<&OsStr>) -> Option<PathBuf> {
    if runtime.is_empty() {
        return None;
    }

    if runtime.contains('/') {
        let path = PathBuf::from(runtime);
        return is_executable(&path).then_some(path);
    }

    std::env::split_paths(path_var?)
        .map(|dir| dir.join(runtime))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    path.metadata()
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

/// Extracts the first non-empty line of `--version` output.
#[must_use]
pub fn parse_version(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(String::from)
}
