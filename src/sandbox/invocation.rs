//! Construction of the container runtime command line.
//!
//! The resulting argument list follows the `docker`/`podman` convention:
//!
//! ```text
//! <runtime> run --rm --name <name> -v <host>:<mount> <image> sh -c "<install> && <run>"
//! ```
//!
//! Nothing here performs I/O; [`SandboxInvocation::build`] is a pure function of
//! its inputs.

use std::path::Path;

use uuid::Uuid;

use super::SandboxConfig;
use super::security::{ModuleName, shell_quote};

/// Prefix of generated container names.
pub const CONTAINER_NAME_PREFIX: &str = "python-executor";

/// Generates a unique container name.
#[must_use]
pub fn container_name() -> String {
    format!("{CONTAINER_NAME_PREFIX}-{}", Uuid::new_v4().simple())
}

/// Immutable description of one runtime subprocess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxInvocation {
    /// Runtime binary to launch.
    pub program: String,
    /// Full argument list passed to `program`.
    pub args: Vec<String>,
    /// Name given to the container, used for forced removal.
    pub container_name: String,
    /// `pip install` argv, if any modules were requested.
    pub install_step: Option<Vec<String>>,
    /// Interpreter argv that runs the script.
    pub run_step: Vec<String>,
    /// The `sh -c` command line executed inside the container.
    pub shell_command: String,
}

impl SandboxInvocation {
    /// Builds the invocation for a workspace at `host_path`.
    ///
    /// The install step, when present, is joined to the run step with `&&` so
    /// a failed install never runs the script.
    #[must_use]
    pub fn build(
        config: &SandboxConfig,
        host_path: &Path,
        modules: &[ModuleName],
        container_name: String,
    ) -> Self {
        let install_step = (!modules.is_empty()).then(|| {
            let mut step: Vec<String> = [
                config.interpreter.as_str(),
                "-m",
                "pip",
                "install",
                "--quiet",
                "--no-input",
            ]
            .into_iter()
            .map(String::from)
            .collect();
            step.extend(modules.iter().map(ModuleName::shell_word));
            step
        });

        let run_step = vec![
            config.interpreter.clone(),
            shell_quote(&config.script_mount_path()),
        ];

        let shell_command = match &install_step {
            Some(install) => format!("{} && {}", install.join(" "), run_step.join(" ")),
            None => run_step.join(" "),
        };

        let volume = format!("{}:{}", host_path.display(), config.mount_point);

        let args = vec![
            "run".to_string(),
            "--rm".to_string(),
            "--name".to_string(),
            container_name.clone(),
            "-v".to_string(),
            volume,
            config.image.clone(),
            "sh".to_string(),
            "-c".to_string(),
            shell_command.clone(),
        ];

        Self {
            program: config.runtime.clone(),
            args,
            container_name,
            install_step,
            run_step,
            shell_command,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::security::parse_module_list;

    fn build(modules: &str) -> SandboxInvocation {
        let modules = parse_module_list(modules).unwrap();
        SandboxInvocation::build(
            &SandboxConfig::default(),
            Path::new("/tmp/python_repl1234"),
            &modules,
            "python-executor-test".to_string(),
        )
    }

    #[test]
    fn test_no_modules_has_no_install_step() {
        let inv = build("");
        assert!(inv.install_step.is_none());
        assert_eq!(inv.shell_command, "python /app/script.py");
        assert!(!inv.shell_command.contains("pip"));
        assert!(!inv.shell_command.contains("&&"));
    }

    #[test]
    fn test_argument_convention() {
        let inv = build("");
        assert_eq!(inv.program, "podman");
        assert_eq!(
            inv.args,
            [
                "run",
                "--rm",
                "--name",
                "python-executor-test",
                "-v",
                "/tmp/python_repl1234:/app",
                crate::sandbox::config::DEFAULT_IMAGE,
                "sh",
                "-c",
                "python /app/script.py",
            ]
        );
    }

    #[test]
    fn test_modules_install_before_run() {
        let inv = build("requests,numpy");
        let install = inv.install_step.as_ref().unwrap();
        assert_eq!(
            install,
            &["python", "-m", "pip", "install", "--quiet", "--no-input", "requests", "numpy"]
        );
        assert_eq!(
            inv.shell_command,
            "python -m pip install --quiet --no-input requests numpy && python /app/script.py"
        );
        assert_eq!(inv.args.last(), Some(&inv.shell_command));
    }

    #[test]
    fn test_specifiers_are_quoted() {
        let inv = build("numpy>=1.26");
        assert!(
            inv.shell_command
                .starts_with("python -m pip install --quiet --no-input 'numpy>=1.26' && ")
        );
    }

    #[test]
    fn test_image_and_mount_come_from_config() {
        let config = SandboxConfig::default()
            .with_runtime("docker")
            .with_image("python:3.12-slim");
        let inv = SandboxInvocation::build(&config, Path::new("/w"), &[], container_name());
        assert_eq!(inv.program, "docker");
        assert!(inv.args.contains(&"python:3.12-slim".to_string()));
        assert!(inv.args.contains(&"/w:/app".to_string()));
    }

    #[test]
    fn test_container_names_are_unique() {
        let a = container_name();
        let b = container_name();
        assert_ne!(a, b);
        assert!(a.starts_with("python-executor-"));
    }
}
