//! Disposable per-request workspaces.
//!
//! A [`Workspace`] is a freshly created, uniquely named directory that holds
//! exactly one file: the caller's script. It is bind-mounted into the
//! container and removed when the request ends.
//!
//! # Lifecycle
//!
//! Removal is tied to ownership. [`Workspace::release`] removes the directory
//! and reports failures; if the value is dropped instead (early return,
//! cancellation, panic) the directory is removed by `Drop`. Either way a
//! workspace is removed exactly once.

use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, instrument, trace};

use super::SandboxConfig;
use crate::error::ExecError;

/// Name prefix of every workspace directory.
pub const WORKSPACE_PREFIX: &str = "python_repl";

/// Mode of the workspace directory.
const WORKSPACE_MODE: u32 = 0o700;

/// Mode of the script file; the container user must be able to read it.
const SCRIPT_MODE: u32 = 0o644;

/// An exclusively owned temporary directory for one execution.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    script_name: String,
}

impl Workspace {
    /// Creates a new, uniquely named workspace.
    ///
    /// The directory is created under `config.workspace_root` when set,
    /// otherwise under the OS temp directory. It is owner-only (`0700`)
    /// regardless of the process umask.
    ///
    /// # Errors
    ///
    /// Returns `ExecError::WorkspaceCreate` if the directory cannot be created.
    #[instrument(skip(config))]
    pub fn acquire(config: &SandboxConfig) -> Result<Self, ExecError> {
        let mut builder = tempfile::Builder::new();
        builder
            .prefix(WORKSPACE_PREFIX)
            .permissions(fs::Permissions::from_mode(WORKSPACE_MODE));

        let dir = match &config.workspace_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| {
            // tempfile errors embed the host path; callers only get the kind.
            debug!(error = %e, "Failed to create workspace");
            ExecError::WorkspaceCreate(std::io::Error::from(e.kind()))
        })?;

        debug!(path = %dir.path().display(), "Workspace created");
        Ok(Self {
            dir,
            script_name: config.script_name.clone(),
        })
    }

    /// Host path of the workspace directory.
    #[must_use]
    pub fn host_path(&self) -> &Path {
        self.dir.path()
    }

    /// Host path of the script file.
    #[must_use]
    pub fn script_path(&self) -> PathBuf {
        self.dir.path().join(&self.script_name)
    }

    /// Writes `code` verbatim as the workspace script.
    ///
    /// # Errors
    ///
    /// Returns `ExecError::ScriptWrite` if the file cannot be created or written.
    #[instrument(skip(self, code), fields(bytes = code.len()))]
    pub fn write_script(&self, code: &str) -> Result<(), ExecError> {
        let path = self.script_path();
        let mut file = fs::File::create(&path).map_err(ExecError::ScriptWrite)?;
        file.write_all(code.as_bytes())
            .map_err(ExecError::ScriptWrite)?;
        file.sync_all().map_err(ExecError::ScriptWrite)?;
        fs::set_permissions(&path, fs::Permissions::from_mode(SCRIPT_MODE))
            .map_err(ExecError::ScriptWrite)?;

        trace!("Script written");
        Ok(())
    }

    /// Recursively removes the workspace.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from the removal. The directory is not retried.
    #[instrument(skip(self), fields(path = %self.dir.path().display()))]
    pub fn release(self) -> std::io::Result<()> {
        self.dir.close()?;
        debug!("Workspace released");
        Ok(())
    }
}
