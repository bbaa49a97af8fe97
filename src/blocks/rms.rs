// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Wrapper of `gmx rms` calculating RMSD of a trajectory against a reference structure.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{check_allowed, GmxProperties, Properties, StepProperties};
use crate::errors::{BlockError, ConfigError};
use crate::files::{FileType, STRUCTURE_FORMATS, TRAJECTORY_FORMATS};
use crate::runner::block::{ensure_gmx_version, execute, gmx_command, BuildingBlock};
use crate::runner::command::GmxCommand;
use crate::runner::stage::Stage;

/// Formats of the xvg output supported by Gromacs.
pub const XVG_FORMATS: &[&str] = &["xmgrace", "xmgr", "none"];

/// Properties of the [`Rms`] building block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RmsProperties {
    /// Group used both for fitting and for the calculation.
    pub selection: String,
    pub xvg: String,
    #[serde(flatten)]
    pub gmx: GmxProperties,
    #[serde(flatten)]
    pub step: StepProperties,
}

impl Default for RmsProperties {
    fn default() -> Self {
        RmsProperties {
            selection: "Protein-H".to_owned(),
            xvg: "none".to_owned(),
            gmx: GmxProperties::default(),
            step: StepProperties::default(),
        }
    }
}

impl Properties for RmsProperties {
    const KEYS: &'static [&'static str] = &["selection", "xvg"];

    fn validate(&self) -> Result<(), ConfigError> {
        check_allowed("xvg", &self.xvg, XVG_FORMATS)
    }
}

/// Input and output files of the [`Rms`] building block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RmsPaths {
    pub input_structure_path: PathBuf,
    pub input_traj_path: PathBuf,
    pub output_xvg_path: PathBuf,
    pub input_index_path: Option<PathBuf>,
}

/// Calculates RMSD of a trajectory.
#[derive(Debug, Clone)]
pub struct Rms {
    paths: RmsPaths,
    properties: RmsProperties,
}

impl Rms {
    pub fn new(paths: RmsPaths, properties: RmsProperties) -> Result<Self, ConfigError> {
        properties.validate()?;
        FileType::check(&paths.input_structure_path, STRUCTURE_FORMATS)?;
        FileType::check(&paths.input_traj_path, TRAJECTORY_FORMATS)?;
        FileType::check(&paths.output_xvg_path, &[FileType::XVG])?;
        if let Some(ndx) = &paths.input_index_path {
            FileType::check(ndx, &[FileType::NDX])?;
        }

        Ok(Rms { paths, properties })
    }

    fn command(&self, stage: &mut Stage) -> Result<GmxCommand, BlockError> {
        let props = &self.properties;

        let mut command = gmx_command(&props.gmx, "rms")?;
        command
            .option("-s", stage.input(&self.paths.input_structure_path)?)
            .option("-f", stage.input(&self.paths.input_traj_path)?)
            .option("-o", stage.output(&self.paths.output_xvg_path)?)
            .option("-xvg", &props.xvg);

        if let Some(ndx) = stage.optional_input(self.paths.input_index_path.as_ref())? {
            command.option("-n", ndx);
        }

        command.stdin(&format!("{0}\n{0}\n", props.selection));
        Ok(command)
    }
}

impl BuildingBlock for Rms {
    const NAME: &'static str = "Rms";

    fn step(&self) -> &StepProperties {
        &self.properties.step
    }

    fn output_paths(&self) -> Vec<&Path> {
        vec![self.paths.output_xvg_path.as_path()]
    }

    fn run(&mut self) -> Result<i32, BlockError> {
        let gmx = &self.properties.gmx;
        ensure_gmx_version(gmx, Self::NAME)?;

        let mut stage = Stage::new(gmx, &self.properties.step)?;
        let command = self.command(&mut stage)?;
        let code = execute(command, gmx, &self.properties.step, &stage)?;
        stage.finish();

        Ok(code)
    }
}

/// Calculate RMSD of a trajectory using `gmx rms`.
pub fn rms(paths: RmsPaths, properties: RmsProperties) -> Result<i32, BlockError> {
    Rms::new(paths, properties)?.launch()
}
