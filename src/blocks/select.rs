// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Wrapper of `gmx select` writing atoms matching a selection into an index file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{GmxProperties, Properties, StepProperties};
use crate::errors::{BlockError, ConfigError};
use crate::files::{FileType, STRUCTURE_FORMATS};
use crate::runner::block::{ensure_gmx_version, execute, gmx_command, BuildingBlock};
use crate::runner::command::GmxCommand;
use crate::runner::stage::Stage;

/// Default selection of `Select` and `GmxSelect`.
pub(crate) const DEFAULT_SELECTION: &str = "a CA C N O";

/// Properties of the [`Select`] building block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectProperties {
    /// Selection in the Gromacs selection syntax.
    pub selection: String,
    #[serde(flatten)]
    pub gmx: GmxProperties,
    #[serde(flatten)]
    pub step: StepProperties,
}

impl Default for SelectProperties {
    fn default() -> Self {
        SelectProperties {
            selection: DEFAULT_SELECTION.to_owned(),
            gmx: GmxProperties::default(),
            step: StepProperties::default(),
        }
    }
}

impl Properties for SelectProperties {
    const KEYS: &'static [&'static str] = &["selection"];

    fn validate(&self) -> Result<(), ConfigError> {
        validate_selection(&self.selection)
    }
}

pub(crate) fn validate_selection(selection: &str) -> Result<(), ConfigError> {
    if selection.trim().is_empty() {
        Err(ConfigError::InvalidValue(
            "selection".to_owned(),
            selection.to_owned(),
        ))
    } else {
        Ok(())
    }
}

/// Input and output files of `gmx select`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectPaths {
    pub input_structure_path: PathBuf,
    pub output_ndx_path: PathBuf,
    pub input_ndx_path: Option<PathBuf>,
}

impl SelectPaths {
    pub(crate) fn check(&self) -> Result<(), ConfigError> {
        FileType::check(&self.input_structure_path, STRUCTURE_FORMATS)?;
        FileType::check(&self.output_ndx_path, &[FileType::NDX])?;
        if let Some(ndx) = &self.input_ndx_path {
            FileType::check(ndx, &[FileType::NDX])?;
        }

        Ok(())
    }
}

/// Construct the `gmx select` command.
pub(crate) fn select_command(
    paths: &SelectPaths,
    selection: &str,
    gmx: &GmxProperties,
    stage: &mut Stage,
) -> Result<GmxCommand, BlockError> {
    let mut command = gmx_command(gmx, "select")?;
    command
        .option("-s", stage.input(&paths.input_structure_path)?)
        .option("-on", stage.output(&paths.output_ndx_path)?);

    if let Some(ndx) = stage.optional_input(paths.input_ndx_path.as_ref())? {
        command.option("-n", ndx);
    }

    command.option("-select", selection);
    Ok(command)
}

/// Selects atoms using the Gromacs selection syntax.
#[derive(Debug, Clone)]
pub struct Select {
    paths: SelectPaths,
    properties: SelectProperties,
}

impl Select {
    pub fn new(paths: SelectPaths, properties: SelectProperties) -> Result<Self, ConfigError> {
        properties.validate()?;
        paths.check()?;

        Ok(Select { paths, properties })
    }
}

impl BuildingBlock for Select {
    const NAME: &'static str = "Select";

    fn step(&self) -> &StepProperties {
        &self.properties.step
    }

    fn output_paths(&self) -> Vec<&Path> {
        vec![self.paths.output_ndx_path.as_path()]
    }

    fn run(&mut self) -> Result<i32, BlockError> {
        let gmx = &self.properties.gmx;
        ensure_gmx_version(gmx, Self::NAME)?;

        let mut stage = Stage::new(gmx, &self.properties.step)?;
        let command = select_command(&self.paths, &self.properties.selection, gmx, &mut stage)?;
        let code = execute(command, gmx, &self.properties.step, &stage)?;
        stage.finish();

        Ok(code)
    }
}

/// Write atoms matching a selection into an index file using `gmx select`.
pub fn select(paths: SelectPaths, properties: SelectProperties) -> Result<i32, BlockError> {
    Select::new(paths, properties)?.launch()
}
