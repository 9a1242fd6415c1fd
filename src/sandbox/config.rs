//! Configuration for sandbox executions.

use std::path::PathBuf;
use std::time::Duration;

/// Default container runtime binary.
pub const DEFAULT_RUNTIME: &str = "podman";

/// Default image the untrusted code runs in.
pub const DEFAULT_IMAGE: &str = "mcr.microsoft.com/playwright/python:v1.49.1-noble";

/// Default in-container mount point for the workspace.
pub const DEFAULT_MOUNT_POINT: &str = "/app";

/// Default name of the generated script inside the workspace.
pub const DEFAULT_SCRIPT_NAME: &str = "script.py";

/// Configuration shared by every execution.
///
/// Built once at startup and never modified afterwards; none of these values
/// are influenced by tool arguments.
///
/// # Example
///
/// ```
/// use python_executor_mcp::sandbox::SandboxConfig;
/// use std::time::Duration;
///
/// let config = SandboxConfig::default()
///     .with_runtime("docker")
///     .with_timeout(Duration::from_secs(60))
///     .with_max_concurrent(4);
/// ```
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Container runtime binary (name on `PATH` or absolute path).
    pub runtime: String,

    /// Image reference passed to `<runtime> run`.
    pub image: String,

    /// Where the workspace is bind-mounted inside the container.
    pub mount_point: String,

    /// File name of the script inside the workspace.
    pub script_name: String,

    /// Interpreter used for both `pip` and the script.
    pub interpreter: String,

    /// Maximum wall-clock time for one execution, install step included.
    pub timeout: Duration,

    /// Parent directory for workspaces. `None` uses the OS temp directory.
    pub workspace_root: Option<PathBuf>,

    /// Cap on simultaneous executions. `None` means unlimited.
    pub max_concurrent: Option<usize>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            runtime: String::from(DEFAULT_RUNTIME),
            image: String::from(DEFAULT_IMAGE),
            mount_point: String::from(DEFAULT_MOUNT_POINT),
            script_name: String::from(DEFAULT_SCRIPT_NAME),
            interpreter: String::from("python"),
            timeout: Duration::from_secs(120),
            workspace_root: None,
            max_concurrent: None,
        }
    }
}

impl SandboxConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the container runtime binary.
    #[must_use]
    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = runtime.into();
        self
    }

    /// Sets the container image.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Sets the execution timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Places workspaces under `root` instead of the OS temp directory.
    #[must_use]
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    /// Limits how many executions may run at once.
    #[must_use]
    pub fn with_max_concurrent(mut self, limit: usize) -> Self {
        self.max_concurrent = Some(limit);
        self
    }

    /// In-container path of the script.
    #[must_use]
    pub fn script_mount_path(&self) -> String {
        format!(
            "{}/{}",
            self.mount_point.trim_end_matches('/'),
            self.script_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SandboxConfig::default();
        assert_eq!(config.runtime, "podman");
        assert_eq!(config.image, DEFAULT_IMAGE);
        assert_eq!(config.mount_point, "/app");
        assert_eq!(config.script_name, "script.py");
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert!(config.workspace_root.is_none());
        assert!(config.max_concurrent.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let config = SandboxConfig::new()
            .with_runtime("docker")
            .with_image("python:3.12-slim")
            .with_timeout(Duration::from_secs(5))
            .with_workspace_root("/var/tmp/pyexec")
            .with_max_concurrent(2);

        assert_eq!(config.runtime, "docker");
        assert_eq!(config.image, "python:3.12-slim");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(
            config.workspace_root,
            Some(PathBuf::from("/var/tmp/pyexec"))
        );
        assert_eq!(config.max_concurrent, Some(2));
    }

    #[test]
    fn test_script_mount_path() {
        let mut config = SandboxConfig::default();
        assert_eq!(config.script_mount_path(), "/app/script.py");

        config.mount_point = "/work/".to_string();
        assert_eq!(config.script_mount_path(), "/work/script.py");
    }
}
