// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Wrapping of commands so that they are executed inside a docker or singularity container.

use std::path::Path;

use crate::auxiliary::{file_name, path2string};
use crate::config::GmxProperties;
use crate::errors::ConfigError;
use crate::runner::command::GmxCommand;

/// Supported container runtimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerRuntime {
    Docker,
    Singularity,
}

impl ContainerRuntime {
    /// Identify the container runtime from the path to its executable.
    ///
    /// ## Returns
    /// `ConfigError::UnknownContainer` if the executable is neither docker nor singularity.
    pub fn from_path(path: &str) -> Result<Self, ConfigError> {
        let name = file_name(path);
        if name.ends_with("docker") {
            Ok(ContainerRuntime::Docker)
        } else if name.ends_with("singularity") {
            Ok(ContainerRuntime::Singularity)
        } else {
            Err(ConfigError::UnknownContainer(path.to_owned()))
        }
    }
}

/// Wrap `command` so that it is run inside the container specified in `gmx`
/// with `scratch` mounted at `container_volume_path`.
///
/// The standard input of `command` is passed to the container runtime.
/// Environment variables of `command` (e.g. `GMXLIB`) are forwarded into the container,
/// so their values must be valid paths inside the container.
pub fn containerize(
    command: &GmxCommand,
    gmx: &GmxProperties,
    scratch: &Path,
) -> Result<GmxCommand, ConfigError> {
    let container_path = gmx
        .container_path
        .as_deref()
        .ok_or_else(|| ConfigError::MissingProperty("container_path".to_owned()))?;

    let runtime = ContainerRuntime::from_path(container_path)?;
    let mount = format!("{}:{}", path2string(scratch), gmx.container_volume_path);
    let working_dir = gmx
        .container_working_dir
        .as_deref()
        .unwrap_or(&gmx.container_volume_path);

    let mut wrapped = GmxCommand::new(container_path);
    match runtime {
        ContainerRuntime::Docker => {
            wrapped.arg("run");
            if command.get_stdin().is_some() {
                wrapped.arg("-i");
            }
            wrapped.option("-w", working_dir).option("-v", mount);
            if let Some(user) = &gmx.container_user_id {
                wrapped.option("--user", user);
            }
            for (key, value) in command.get_env() {
                wrapped.option("-e", format!("{}={}", key, value));
            }
        }
        ContainerRuntime::Singularity => {
            wrapped
                .arg("exec")
                .option("--bind", mount)
                .option("--pwd", working_dir);
            for (key, value) in command.get_env() {
                wrapped.option("--env", format!("{}={}", key, value));
            }
        }
    }

    for (key, value) in command.get_env() {
        log::debug!("Forwarding '{}={}' into the container.", key, value);
    }

    wrapped
        .arg(&gmx.container_image)
        .arg(&gmx.container_shell_path)
        .option("-c", command.command_line());

    if let Some(input) = command.get_stdin() {
        wrapped.stdin(input);
    }

    Ok(wrapped)
}
