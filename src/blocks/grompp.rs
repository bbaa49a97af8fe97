// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Wrapper of `gmx grompp` preprocessing a system into a portable run input file.
//!
//! The molecular dynamics parameters are created by merging the preset for `simulation_type`,
//! the input mdp file (if provided) and the `mdp` property.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::{check_range, mdp_from_config, GmxProperties, Properties, StepProperties};
use crate::errors::{BlockError, ConfigError};
use crate::files::{FileType, STRUCTURE_FORMATS};
use crate::io::mdp_io::create_mdp;
use crate::io::zip_io::TopologyBundle;
use crate::runner::block::{ensure_gmx_version, execute, gmx_command, BuildingBlock};
use crate::runner::command::GmxCommand;
use crate::runner::stage::Stage;
use crate::structures::mdp::SimulationType;

/// Properties of the [`Grompp`] building block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GromppProperties {
    /// Name of the mdp file created from the parameters.
    pub output_mdp_path: String,
    /// Preset of the mdp parameters.
    pub simulation_type: Option<SimulationType>,
    /// Maximal number of allowed warnings. Defaults to 10 if a `simulation_type`
    /// other than `index` is set, else 0.
    pub maxwarn: Option<u32>,
    /// Explicit mdp parameters overriding the preset and the input mdp file.
    pub mdp: IndexMap<String, serde_yaml::Value>,
    #[serde(flatten)]
    pub gmx: GmxProperties,
    #[serde(flatten)]
    pub step: StepProperties,
}

impl Default for GromppProperties {
    fn default() -> Self {
        GromppProperties {
            output_mdp_path: "grompp.mdp".to_owned(),
            simulation_type: None,
            maxwarn: None,
            mdp: IndexMap::new(),
            gmx: GmxProperties::default(),
            step: StepProperties::default(),
        }
    }
}

impl Properties for GromppProperties {
    const KEYS: &'static [&'static str] = &["output_mdp_path", "simulation_type", "maxwarn", "mdp"];

    fn validate(&self) -> Result<(), ConfigError> {
        check_range("maxwarn", self.maxwarn(), 0, 1000)?;

        if self.output_mdp_path.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "output_mdp_path".to_owned(),
                self.output_mdp_path.clone(),
            ));
        }

        Ok(())
    }
}

impl GromppProperties {
    /// Get the effective maximal number of allowed warnings.
    pub fn maxwarn(&self) -> u32 {
        match (self.maxwarn, self.simulation_type) {
            (Some(x), _) => x,
            (None, Some(simulation)) if simulation != SimulationType::Index => 10,
            (None, _) => 0,
        }
    }
}

/// Input and output files of the [`Grompp`] building block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GromppPaths {
    pub input_gro_path: PathBuf,
    pub input_top_zip_path: PathBuf,
    pub output_tpr_path: PathBuf,
    pub input_cpt_path: Option<PathBuf>,
    pub input_ndx_path: Option<PathBuf>,
    pub input_mdp_path: Option<PathBuf>,
}

/// Creates a portable binary run input file (tpr).
#[derive(Debug, Clone)]
pub struct Grompp {
    paths: GromppPaths,
    properties: GromppProperties,
}

impl Grompp {
    pub fn new(paths: GromppPaths, properties: GromppProperties) -> Result<Self, ConfigError> {
        properties.validate()?;
        FileType::check(&paths.input_gro_path, STRUCTURE_FORMATS)?;
        FileType::check(&paths.input_top_zip_path, &[FileType::ZIP])?;
        FileType::check(&paths.output_tpr_path, &[FileType::TPR])?;
        if let Some(cpt) = &paths.input_cpt_path {
            FileType::check(cpt, &[FileType::CPT])?;
        }
        if let Some(ndx) = &paths.input_ndx_path {
            FileType::check(ndx, &[FileType::NDX])?;
        }
        if let Some(mdp) = &paths.input_mdp_path {
            FileType::check(mdp, &[FileType::MDP])?;
        }

        Ok(Grompp { paths, properties })
    }

    /// Construct the `gmx grompp` command. The topology and the mdp file are
    /// created inside the scratch directory of `stage`.
    fn command(&self, stage: &mut Stage, topology: &TopologyBundle) -> Result<GmxCommand, BlockError> {
        let mdp_path = stage
            .scratch()
            .join(crate::auxiliary::file_name(&self.properties.output_mdp_path));
        create_mdp(
            &mdp_path,
            self.paths.input_mdp_path.as_deref(),
            self.properties.simulation_type,
            &mdp_from_config(&self.properties.mdp),
        )?;

        let structure = stage.input(&self.paths.input_gro_path)?;

        let mut command = gmx_command(&self.properties.gmx, "grompp")?;
        command
            .option("-f", stage.internal(&mdp_path)?)
            .option("-c", &structure)
            .option("-r", &structure)
            .option("-p", stage.internal(topology.top_path())?)
            .option("-o", stage.output(&self.paths.output_tpr_path)?)
            .option("-po", stage.internal(stage.scratch().join("mdout.mdp"))?)
            .option("-maxwarn", self.properties.maxwarn());

        if let Some(cpt) = stage.optional_input(self.paths.input_cpt_path.as_ref())? {
            command.option("-t", cpt);
        }

        if let Some(ndx) = stage.optional_input(self.paths.input_ndx_path.as_ref())? {
            command.option("-n", ndx);
        }

        Ok(command)
    }
}

impl BuildingBlock for Grompp {
    const NAME: &'static str = "Grompp";

    fn step(&self) -> &StepProperties {
        &self.properties.step
    }

    fn output_paths(&self) -> Vec<&Path> {
        vec![self.paths.output_tpr_path.as_path()]
    }

    fn run(&mut self) -> Result<i32, BlockError> {
        let gmx = &self.properties.gmx;
        ensure_gmx_version(gmx, Self::NAME)?;

        let mut stage = Stage::new(gmx, &self.properties.step)?;
        let topology = TopologyBundle::unzip(&self.paths.input_top_zip_path, stage.scratch())?;

        let command = self.command(&mut stage, &topology)?;
        let code = execute(command, gmx, &self.properties.step, &stage)?;

        stage.finish_with(topology);
        Ok(code)
    }
}

/// Create a run input file using `gmx grompp`.
pub fn grompp(paths: GromppPaths, properties: GromppProperties) -> Result<i32, BlockError> {
    Grompp::new(paths, properties)?.launch()
}

/******************************/
/*         UNIT TESTS         */
/******************************/
