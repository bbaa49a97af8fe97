// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Wrapper of `gmx genrestr` generating position restraints for a group of atoms.
//!
//! The restraints are written into `output_itp_path` and/or spliced into a zipped topology
//! replacing the file included by the `#ifdef POSRES` directive of the top file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::auxiliary::DEFAULT_FORCE_CONSTANTS;
use crate::config::{GmxProperties, Properties, StepProperties};
use crate::errors::{BlockError, ConfigError, StageError, TopologyError};
use crate::files::{FileType, STRUCTURE_FORMATS};
use crate::io::zip_io::TopologyBundle;
use crate::runner::block::{ensure_gmx_version, execute, gmx_command, BuildingBlock};
use crate::runner::command::GmxCommand;
use crate::runner::stage::Stage;
use crate::structures::restraint::ForceConstants;
use crate::structures::topology::Topology;

/// Properties of the [`Genrestr`] building block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenrestrProperties {
    /// Index group to restrain.
    pub restrained_group: String,
    /// Force constants of the restraints.
    pub force_constants: String,
    #[serde(flatten)]
    pub gmx: GmxProperties,
    #[serde(flatten)]
    pub step: StepProperties,
}

impl Default for GenrestrProperties {
    fn default() -> Self {
        GenrestrProperties {
            restrained_group: "system".to_owned(),
            force_constants: DEFAULT_FORCE_CONSTANTS.to_owned(),
            gmx: GmxProperties::default(),
            step: StepProperties::default(),
        }
    }
}

impl Properties for GenrestrProperties {
    const KEYS: &'static [&'static str] = &["restrained_group", "force_constants"];

    fn validate(&self) -> Result<(), ConfigError> {
        self.force_constants.parse::<ForceConstants>().map_err(|_| {
            ConfigError::InvalidValue("force_constants".to_owned(), self.force_constants.clone())
        })?;

        Ok(())
    }
}

/// Input and output files of the [`Genrestr`] building block.
///
/// At least one of `output_itp_path` and `output_top_zip_path` must be provided.
/// `output_top_zip_path` requires `input_top_zip_path`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenrestrPaths {
    pub input_structure_path: PathBuf,
    pub input_ndx_path: Option<PathBuf>,
    pub input_top_zip_path: Option<PathBuf>,
    pub output_itp_path: Option<PathBuf>,
    pub output_top_zip_path: Option<PathBuf>,
}

/// Generates position restraints.
#[derive(Debug, Clone)]
pub struct Genrestr {
    paths: GenrestrPaths,
    properties: GenrestrProperties,
}

impl Genrestr {
    pub fn new(paths: GenrestrPaths, properties: GenrestrProperties) -> Result<Self, ConfigError> {
        properties.validate()?;
        FileType::check(&paths.input_structure_path, STRUCTURE_FORMATS)?;

        if let Some(ndx) = &paths.input_ndx_path {
            FileType::check(ndx, &[FileType::NDX])?;
        }
        if let Some(itp) = &paths.output_itp_path {
            FileType::check(itp, &[FileType::ITP])?;
        }

        match (&paths.input_top_zip_path, &paths.output_top_zip_path) {
            (Some(input), Some(output)) => {
                FileType::check(input, &[FileType::ZIP])?;
                FileType::check(output, &[FileType::ZIP])?;
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingPath("input_top_zip_path".to_owned()))
            }
            (Some(_), None) => {
                return Err(ConfigError::MissingPath("output_top_zip_path".to_owned()))
            }
            (None, None) if paths.output_itp_path.is_none() => {
                return Err(ConfigError::MissingPath("output_itp_path".to_owned()))
            }
            (None, None) => (),
        }

        Ok(Genrestr { paths, properties })
    }

    /// Construct the `gmx genrestr` command writing the restraints into `itp` (host path).
    fn command(&self, stage: &mut Stage, itp: &Path) -> Result<GmxCommand, BlockError> {
        let itp = match &self.paths.output_itp_path {
            Some(output) => stage.output(output)?,
            None => stage.internal(itp)?,
        };

        let mut command = gmx_command(&self.properties.gmx, "genrestr")?;
        command
            .option("-f", stage.input(&self.paths.input_structure_path)?)
            .option("-o", itp)
            .arg("-fc")
            .args(self.properties.force_constants.split_whitespace());

        if let Some(ndx) = stage.optional_input(self.paths.input_ndx_path.as_ref())? {
            command.option("-n", ndx);
        }

        command.stdin(&format!("{}\n", self.properties.restrained_group));
        Ok(command)
    }

    /// Replace the position restraints included by the top file of `topology` with `itp`.
    fn splice(topology: &TopologyBundle, itp: &Path) -> Result<(), BlockError> {
        let top = Topology::from_file(topology.top_path())?;
        let included = top.find_posres_include().ok_or_else(|| {
            TopologyError::PosresIncludeNotFound(Box::from(topology.top_path()))
        })?;

        let target = topology.dir().join(&included);
        log::info!("Replacing position restraints in '{}'.", included);
        std::fs::copy(itp, &target).map_err(|_| StageError::CouldNotCopy(Box::from(itp)))?;

        Ok(())
    }
}

impl BuildingBlock for Genrestr {
    const NAME: &'static str = "Genrestr";

    fn step(&self) -> &StepProperties {
        &self.properties.step
    }

    fn output_paths(&self) -> Vec<&Path> {
        [&self.paths.output_itp_path, &self.paths.output_top_zip_path]
            .into_iter()
            .flatten()
            .map(PathBuf::as_path)
            .collect()
    }

    fn run(&mut self) -> Result<i32, BlockError> {
        let gmx = &self.properties.gmx;
        ensure_gmx_version(gmx, Self::NAME)?;

        let mut stage = Stage::new(gmx, &self.properties.step)?;
        let itp = match &self.paths.output_itp_path {
            Some(output) => output.clone(),
            None => stage.scratch().join("genrestr.itp"),
        };

        let command = self.command(&mut stage, &itp)?;
        let code = execute(command, gmx, &self.properties.step, &stage)?;

        if code == 0 {
            if let (Some(input), Some(output)) =
                (&self.paths.input_top_zip_path, &self.paths.output_top_zip_path)
            {
                let topology = TopologyBundle::unzip(input, stage.scratch())?;
                Genrestr::splice(&topology, &itp)?;
                topology.zip(output)?;
                stage.finish_with(topology);
                return Ok(code);
            }
        }

        stage.finish();
        Ok(code)
    }
}

/// Generate position restraints using `gmx genrestr`.
pub fn genrestr(paths: GenrestrPaths, properties: GenrestrProperties) -> Result<i32, BlockError> {
    Genrestr::new(paths, properties)?.launch()
}

/******************************/
/*         UNIT TESTS         */
/******************************/
