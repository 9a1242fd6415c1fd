//! Execution of a [`SandboxInvocation`] as a child process.
//!
//! # Notes on stdout/stderr capture and timeouts
//!
//! Both pipes are drained concurrently with the wait (`wait_with_output`), so a
//! child that fills a pipe cannot deadlock against us.
//!
//! The wait is bounded by the configured timeout. When it expires the wait
//! future is dropped, which drops the `Child`; `kill_on_drop` then sends
//! SIGKILL to the runtime client. Killing the client does not necessarily stop
//! the container it started, so a [`ContainerGuard`] force-removes the named
//! container whenever a run does not end with the child's own exit. The same
//! path covers cancellation, where the whole future is dropped mid-wait.

use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Output, Stdio};
use std::time::{Duration, Instant};

use tokio::process::Command;
use tracing::{debug, instrument, trace, warn};

use super::SandboxInvocation;

/// Upper bound for the background `rm -f` of an abandoned container.
pub const CLEANUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything the runner can report about one invocation.
#[derive(Debug)]
pub enum ExecutionOutcome {
    /// Exit status 0; the captured stdout.
    Success(Vec<u8>),
    /// The child ran and exited non-zero.
    RuntimeFailure { exit_code: i32, stderr: Vec<u8> },
    /// The runtime could not be started or its pipes failed.
    LaunchFailure(std::io::Error),
    /// The child was still running when the timeout expired.
    TimedOut(Duration),
}

impl ExecutionOutcome {
    /// Short label for logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::RuntimeFailure { .. } => "runtime_failure",
            Self::LaunchFailure(_) => "launch_failure",
            Self::TimedOut(_) => "timed_out",
        }
    }
}

/// Runs `invocation` once, waiting at most `timeout`.
///
/// No retry is attempted.
#[instrument(
    skip(invocation),
    fields(
        program = %invocation.program,
        container = %invocation.container_name,
        timeout_ms = %timeout.as_millis(),
    )
)]
pub async fn run(invocation: &SandboxInvocation, timeout: Duration) -> ExecutionOutcome {
    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    trace!("Spawning sandbox runtime");
    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            debug!(error = %e, "Failed to spawn sandbox runtime");
            return ExecutionOutcome::LaunchFailure(e);
        }
    };

    let mut guard = ContainerGuard::new(&invocation.program, &invocation.container_name);
    let start = Instant::now();

    let outcome = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => {
            guard.disarm();
            classify(output)
        }
        Ok(Err(e)) => {
            debug!(error = %e, "Failed to collect sandbox runtime output");
            ExecutionOutcome::LaunchFailure(e)
        }
        Err(_) => {
            warn!(elapsed_ms = %start.elapsed().as_millis(), "Execution timed out, killing runtime");
            ExecutionOutcome::TimedOut(timeout)
        }
    };

    debug!(
        outcome = outcome.label(),
        elapsed_ms = %start.elapsed().as_millis(),
        "Sandbox runtime finished"
    );
    outcome
}

fn classify(output: Output) -> ExecutionOutcome {
    if output.status.success() {
        ExecutionOutcome::Success(output.stdout)
    } else {
        ExecutionOutcome::RuntimeFailure {
            exit_code: exit_code(output.status),
            stderr: output.stderr,
        }
    }
}

/// Exit code of `status`, mapping death by signal N to `128 + N`.
#[must_use]
pub fn exit_code(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(-1)
}

/// Force-removes a named container on drop unless disarmed.
#[derive(Debug)]
pub struct ContainerGuard {
    program: String,
    container_name: String,
    armed: bool,
}

impl ContainerGuard {
    /// Creates an armed guard for `container_name`.
    #[must_use]
    pub fn new(program: &str, container_name: &str) -> Self {
        Self {
            program: program.to_string(),
            container_name: container_name.to_string(),
            armed: true,
        }
    }

    /// Marks the container as gone; dropping the guard becomes a no-op.
    pub fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for ContainerGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(container = %self.container_name, "No async runtime, container not removed");
            return;
        };

        let program = std::mem::take(&mut self.program);
        let name = std::mem::take(&mut self.container_name);
        handle.spawn(async move {
            let mut cmd = Command::new(&program);
            cmd.args(["rm", "-f", name.as_str()])
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .kill_on_drop(true);

            match tokio::time::timeout(CLEANUP_TIMEOUT, cmd.status()).await {
                Ok(Ok(status)) if status.success() => debug!(container = %name, "Container removed"),
                Ok(Ok(status)) => {
                    warn!(container = %name, exit_code = exit_code(status), "Container removal failed");
                }
                Ok(Err(e)) => warn!(container = %name, error = %e, "Container removal failed"),
                Err(_) => warn!(container = %name, "Container removal timed out"),
            }
        });
    }
}
