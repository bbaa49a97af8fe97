// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Reading and validating the properties of building blocks.
//!
//! Properties are provided as a YAML (or JSON) mapping, either in a file or as a string.
//! Each building block has its own properties structure which flattens
//! the [`GmxProperties`] and [`StepProperties`] shared by all blocks.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::errors::ConfigError;
use crate::structures::mdp::MdpParameters;

/// Properties controlling the invocation of the Gromacs binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GmxProperties {
    /// Path to the Gromacs binary. May contain leading arguments separated by whitespace.
    pub gmx_path: String,
    /// Path to the Gromacs library (exported as `GMXLIB`).
    pub gmx_lib: Option<String>,
    /// Do not create backups of overwritten files.
    pub gmx_nobackup: bool,
    /// Do not print the Gromacs copyright.
    pub gmx_nocopyright: bool,
    /// Path to the docker or singularity executable.
    pub container_path: Option<String>,
    /// Container image to use.
    pub container_image: String,
    /// Path at which the scratch directory is mounted inside the container.
    pub container_volume_path: String,
    /// Working directory inside the container.
    pub container_working_dir: Option<String>,
    /// User id used inside the docker container.
    pub container_user_id: Option<String>,
    /// Shell used to run the command inside the container.
    pub container_shell_path: String,
}

impl Default for GmxProperties {
    fn default() -> Self {
        GmxProperties {
            gmx_path: "gmx".to_owned(),
            gmx_lib: None,
            gmx_nobackup: true,
            gmx_nocopyright: true,
            container_path: None,
            container_image: "gromacs/gromacs:latest".to_owned(),
            container_volume_path: "/data".to_owned(),
            container_working_dir: None,
            container_user_id: None,
            container_shell_path: "/bin/bash".to_owned(),
        }
    }
}

impl GmxProperties {
    const KEYS: &'static [&'static str] = &[
        "gmx_path",
        "gmx_lib",
        "gmx_nobackup",
        "gmx_nocopyright",
        "container_path",
        "container_image",
        "container_volume_path",
        "container_working_dir",
        "container_user_id",
        "container_shell_path",
    ];

    /// Check whether the commands should be run inside a container.
    pub fn in_container(&self) -> bool {
        self.container_path.is_some()
    }
}

/// Properties controlling the execution of a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepProperties {
    /// Skip the step if all its outputs already exist.
    pub restart: bool,
    /// Remove temporary files after the step is finished.
    pub remove_tmp: bool,
    /// Directory in which temporary directories are created.
    pub sandbox_path: PathBuf,
    /// Directory into which the log files are written.
    pub path: PathBuf,
    /// Prefix of the names of the log files and generated files.
    pub prefix: Option<String>,
    /// Name of the step. Used in the names of the log files and generated files.
    pub step: Option<String>,
}

impl Default for StepProperties {
    fn default() -> Self {
        StepProperties {
            restart: false,
            remove_tmp: true,
            sandbox_path: PathBuf::from("."),
            path: PathBuf::from("."),
            prefix: None,
            step: None,
        }
    }
}

impl StepProperties {
    const KEYS: &'static [&'static str] = &[
        "restart",
        "remove_tmp",
        "sandbox_path",
        "path",
        "prefix",
        "step",
    ];

    /// Construct the name of a file generated by this step.
    pub fn create_name(&self, name: &str) -> String {
        crate::auxiliary::create_name(self.prefix.as_deref(), self.step.as_deref(), name)
    }
}

/// Properties of a building block.
pub trait Properties: DeserializeOwned + Default {
    /// Names of the properties specific to the building block.
    const KEYS: &'static [&'static str];

    /// Check that the values of the properties are valid.
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// Read properties from a configuration.
///
/// `config` is either a path to a YAML/JSON file or a YAML/JSON string.
/// A top-level `properties` mapping is unwrapped. Unknown properties are reported
/// as warnings. Missing configuration produces default properties.
///
/// ## Returns
/// Validated properties or `ConfigError`.
pub fn read_properties<T: Properties>(config: Option<&str>) -> Result<T, ConfigError> {
    let value = match config {
        None => Value::Mapping(Mapping::new()),
        Some(string) => parse_config(string)?,
    };

    let mut mapping = match value {
        Value::Mapping(x) => x,
        Value::Null => Mapping::new(),
        _ => return Err(ConfigError::NotAMapping),
    };

    if let Some(Value::Mapping(inner)) = mapping.get("properties") {
        mapping = inner.clone();
    }

    for key in mapping.keys() {
        match key.as_str() {
            Some(name)
                if T::KEYS.contains(&name)
                    || GmxProperties::KEYS.contains(&name)
                    || StepProperties::KEYS.contains(&name) => {}
            Some(name) => log::warn!("Unrecognized property '{}' will be ignored.", name),
            None => log::warn!("Unrecognized property '{:?}' will be ignored.", key),
        }
    }

    let properties: T = serde_yaml::from_value(Value::Mapping(mapping))
        .map_err(|e| ConfigError::ParseErr(e.to_string()))?;
    properties.validate()?;

    Ok(properties)
}

/// Parse configuration from a file or from a string.
fn parse_config(config: &str) -> Result<Value, ConfigError> {
    let path = Path::new(config);

    let text = if path.is_file() {
        std::fs::read_to_string(path).map_err(|_| ConfigError::CouldNotRead(Box::from(path)))?
    } else {
        config.to_owned()
    };

    serde_yaml::from_str(&text).map_err(|e| ConfigError::ParseErr(e.to_string()))
}

/// Convert mdp parameters provided in the configuration into `MdpParameters`.
///
/// Booleans are converted to `yes`/`no`, sequences are joined using spaces.
pub fn mdp_from_config(mdp: &indexmap::IndexMap<String, Value>) -> MdpParameters {
    let mut parameters = MdpParameters::new();
    for (key, value) in mdp {
        parameters.set(key, value_to_string(value));
    }

    parameters
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "yes".to_owned(),
        Value::Bool(false) => "no".to_owned(),
        Value::Number(x) => x.to_string(),
        Value::String(x) => x.clone(),
        Value::Sequence(x) => x
            .iter()
            .map(value_to_string)
            .collect::<Vec<String>>()
            .join(" "),
        Value::Mapping(_) | Value::Tagged(_) => serde_yaml::to_string(value)
            .unwrap_or_default()
            .trim()
            .to_owned(),
    }
}

/// Check that `value` of property `name` lies inside the closed interval `[min, max]`.
pub(crate) fn check_range<T: PartialOrd + ToString>(
    name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<(), ConfigError> {
    if value < min || value > max {
        Err(ConfigError::InvalidValue(name.to_owned(), value.to_string()))
    } else {
        Ok(())
    }
}

/// Check that `value` of property `name` is one of the `allowed` values.
pub(crate) fn check_allowed(name: &str, value: &str, allowed: &[&str]) -> Result<(), ConfigError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(name.to_owned(), value.to_owned()))
    }
}
