// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Wrapper of `gmx solvate` filling the simulation box with solvent.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{GmxProperties, Properties, StepProperties};
use crate::errors::{BlockError, ConfigError};
use crate::files::{FileType, STRUCTURE_FORMATS};
use crate::io::zip_io::TopologyBundle;
use crate::runner::block::{ensure_gmx_version, execute, gmx_command, BuildingBlock};
use crate::runner::command::GmxCommand;
use crate::runner::stage::Stage;

/// Properties of the [`Solvate`] building block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolvateProperties {
    /// Structure of the solvent. Either a path to a file or a name of a file
    /// from the Gromacs library.
    pub input_solvent_gro_path: String,
    #[serde(flatten)]
    pub gmx: GmxProperties,
    #[serde(flatten)]
    pub step: StepProperties,
}

impl Default for SolvateProperties {
    fn default() -> Self {
        SolvateProperties {
            input_solvent_gro_path: "spc216.gro".to_owned(),
            gmx: GmxProperties::default(),
            step: StepProperties::default(),
        }
    }
}

impl Properties for SolvateProperties {
    const KEYS: &'static [&'static str] = &["input_solvent_gro_path"];
}

/// Input and output files of the [`Solvate`] building block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolvatePaths {
    pub input_solute_gro_path: PathBuf,
    pub output_gro_path: PathBuf,
    pub input_top_zip_path: PathBuf,
    pub output_top_zip_path: PathBuf,
}

/// Solvates a system.
#[derive(Debug, Clone)]
pub struct Solvate {
    paths: SolvatePaths,
    properties: SolvateProperties,
}

impl Solvate {
    pub fn new(paths: SolvatePaths, properties: SolvateProperties) -> Result<Self, ConfigError> {
        properties.validate()?;
        FileType::check(&paths.input_solute_gro_path, STRUCTURE_FORMATS)?;
        FileType::check(&paths.output_gro_path, &[FileType::GRO, FileType::PDB])?;
        FileType::check(&paths.input_top_zip_path, &[FileType::ZIP])?;
        FileType::check(&paths.output_top_zip_path, &[FileType::ZIP])?;

        Ok(Solvate { paths, properties })
    }

    fn command(&self, stage: &mut Stage, topology: &TopologyBundle) -> Result<GmxCommand, BlockError> {
        let solvent = Path::new(&self.properties.input_solvent_gro_path);
        let solvent = if solvent.is_file() {
            stage.input(solvent)?
        } else {
            self.properties.input_solvent_gro_path.clone()
        };

        let mut command = gmx_command(&self.properties.gmx, "solvate")?;
        command
            .option("-cp", stage.input(&self.paths.input_solute_gro_path)?)
            .option("-cs", solvent)
            .option("-o", stage.output(&self.paths.output_gro_path)?)
            .option("-p", stage.internal(topology.top_path())?);

        Ok(command)
    }
}

impl BuildingBlock for Solvate {
    const NAME: &'static str = "Solvate";

    fn step(&self) -> &StepProperties {
        &self.properties.step
    }

    fn output_paths(&self) -> Vec<&Path> {
        vec![
            self.paths.output_gro_path.as_path(),
            self.paths.output_top_zip_path.as_path(),
        ]
    }

    fn run(&mut self) -> Result<i32, BlockError> {
        let gmx = &self.properties.gmx;
        ensure_gmx_version(gmx, Self::NAME)?;

        let mut stage = Stage::new(gmx, &self.properties.step)?;
        let topology = TopologyBundle::unzip(&self.paths.input_top_zip_path, stage.scratch())?;

        let command = self.command(&mut stage, &topology)?;
        let code = execute(command, gmx, &self.properties.step, &stage)?;

        if code == 0 {
            topology.zip(&self.paths.output_top_zip_path)?;
        }

        stage.finish_with(topology);
        Ok(code)
    }
}

/// Fill the simulation box with solvent using `gmx solvate`.
pub fn solvate(paths: SolvatePaths, properties: SolvateProperties) -> Result<i32, BlockError> {
    Solvate::new(paths, properties)?.launch()
}

/******************************/
/*         UNIT TESTS         */
/******************************/
