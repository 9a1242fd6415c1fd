//! Shared helpers for integration tests.
//!
//! [`FakeRuntime`] is a shell script that accepts the `run` / `rm -f` argument
//! convention of podman and docker. `run` evaluates the `sh -c` payload on the
//! host with a `python` shell function standing in for the interpreter:
//! `python -m pip install ...` is logged, and `python /app/<script>` prints the
//! script from the bind-mounted host directory (or fails like a traceback
//! when the script starts with `raise`). The mode of the mounted directory
//! is logged as seen by the runtime.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use python_executor_mcp::SandboxConfig;
use tempfile::TempDir;

const TEMPLATE: &str = r#"#!/bin/sh
LOG="__LOG__"
if [ "$1" = "rm" ]; then
    echo "rm $3" >> "$LOG"
    exit 0
fi
shift
while [ $# -gt 0 ]; do
    case "$1" in
        --rm) shift ;;
        --name) name="$2"; shift 2 ;;
        -v) host="${2%%:*}"; mount="${2#*:}"; shift 2 ;;
        sh) cmd="$3"; break ;;
        *) image="$1"; shift ;;
    esac
done
echo "run $name $image" >> "$LOG"
echo "mode $(stat -c %a "$host")" >> "$LOG"
python() {
    case "$1" in
        -m)
            shift 3
            echo "pip $*" >> "$LOG"
            __PIP__
            ;;
        *)
            script="$host/${1#"$mount"/}"
            if grep -q '^raise' "$script"; then
                echo "Traceback (most recent call last):" >&2
                sed -n 's/^raise //p' "$script" >&2
                return 1
            fi
            echo "workspace $host" >> "$LOG"
            cat "$script"
            ;;
    esac
}
__PRELUDE__
eval "$cmd"
"#;

/// A fake container runtime living in its own temporary directory.
pub struct FakeRuntime {
    dir: TempDir,
    pub path: PathBuf,
    pub log: PathBuf,
}

impl FakeRuntime {
    fn build(prelude: &str, pip: &str) -> Self {
        let dir = TempDir::new().expect("failed to create runtime dir");
        let path = dir.path().join("fake-runtime");
        let log = dir.path().join("calls.log");
        fs::write(&log, "").expect("failed to create log");

        let script = TEMPLATE
            .replace("__LOG__", &log.to_string_lossy())
            .replace("__PIP__", pip)
            .replace("__PRELUDE__", prelude);
        fs::write(&path, script).expect("failed to write fake runtime");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("failed to chmod fake runtime");

        Self { dir, path, log }
    }

    /// Runtime whose `pip install` always succeeds.
    pub fn python() -> Self {
        Self::build("", "return 0")
    }

    /// Runtime whose `pip install` always fails.
    pub fn failing_pip() -> Self {
        Self::build(
            "",
            r#"echo "ERROR: No matching distribution found for $*" >&2; return 1"#,
        )
    }

    /// Runtime that never finishes `run`.
    pub fn hanging() -> Self {
        Self::build("exec sleep 30", "return 0")
    }

    /// Runtime that logs start/end around a delay before running.
    pub fn slow(delay: Duration) -> Self {
        let prelude = format!(
            r#"echo "start $name" >> "$LOG"; sleep {:.3}; echo "end $name" >> "$LOG""#,
            delay.as_secs_f64()
        );
        Self::build(&prelude, "return 0")
    }

    /// Lines written to the call log so far.
    pub fn log_lines(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(String::from)
            .collect()
    }

    /// Lines of the call log starting with `prefix`.
    pub fn log_lines_with(&self, prefix: &str) -> Vec<String> {
        self.log_lines()
            .into_iter()
            .filter(|line| line.starts_with(prefix))
            .collect()
    }

    /// Polls the log until a line starting with `prefix` shows up.
    pub async fn wait_for_log(&self, prefix: &str, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if !self.log_lines_with(prefix).is_empty() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }

    /// Sandbox configuration using this runtime and workspaces under `root`.
    pub fn config(&self, root: &Path) -> SandboxConfig {
        SandboxConfig::default()
            .with_runtime(self.path.to_string_lossy())
            .with_image("test-image")
            .with_workspace_root(root)
            .with_timeout(Duration::from_secs(10))
    }
}

/// Number of entries directly under `dir`.
pub fn dir_entries(dir: &Path) -> usize {
    fs::read_dir(dir).expect("failed to read dir").count()
}
