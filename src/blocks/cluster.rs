// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Wrapper of `gmx cluster` clustering structures of a trajectory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{check_allowed, GmxProperties, Properties, StepProperties};
use crate::errors::{BlockError, ConfigError};
use crate::files::{FileType, STRUCTURE_FORMATS, TRAJECTORY_FORMATS};
use crate::runner::block::{ensure_gmx_version, execute, gmx_command, BuildingBlock};
use crate::runner::command::GmxCommand;
use crate::runner::stage::Stage;

/// Clustering methods supported by `gmx cluster`.
pub const CLUSTER_METHODS: &[&str] = &[
    "linkage",
    "jarvis-patrick",
    "monte-carlo",
    "diagonalization",
    "gromos",
];

/// Properties of the [`Cluster`] building block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterProperties {
    /// Group used for least squares fitting.
    pub fit_selection: String,
    /// Group written into the output structure.
    pub output_selection: String,
    /// Use RMSD of distances instead of RMSD deviation.
    pub dista: bool,
    pub method: String,
    /// RMSD cut-off (nm) of two neighboring structures.
    pub cutoff: f64,
    #[serde(flatten)]
    pub gmx: GmxProperties,
    #[serde(flatten)]
    pub step: StepProperties,
}

impl Default for ClusterProperties {
    fn default() -> Self {
        ClusterProperties {
            fit_selection: "1".to_owned(),
            output_selection: "1".to_owned(),
            dista: false,
            method: "linkage".to_owned(),
            cutoff: 0.1,
            gmx: GmxProperties::default(),
            step: StepProperties::default(),
        }
    }
}

impl Properties for ClusterProperties {
    const KEYS: &'static [&'static str] = &[
        "fit_selection",
        "output_selection",
        "dista",
        "method",
        "cutoff",
    ];

    fn validate(&self) -> Result<(), ConfigError> {
        check_allowed("method", &self.method, CLUSTER_METHODS)?;

        if self.cutoff <= 0.0 {
            return Err(ConfigError::InvalidValue(
                "cutoff".to_owned(),
                self.cutoff.to_string(),
            ));
        }

        Ok(())
    }
}

/// Input and output files of the [`Cluster`] building block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterPaths {
    pub input_structure_path: PathBuf,
    pub input_traj_path: PathBuf,
    pub output_pdb_path: PathBuf,
    pub input_index_path: Option<PathBuf>,
}

/// Clusters structures of a trajectory.
#[derive(Debug, Clone)]
pub struct Cluster {
    paths: ClusterPaths,
    properties: ClusterProperties,
}

impl Cluster {
    pub fn new(paths: ClusterPaths, properties: ClusterProperties) -> Result<Self, ConfigError> {
        properties.validate()?;
        FileType::check(&paths.input_structure_path, STRUCTURE_FORMATS)?;
        FileType::check(&paths.input_traj_path, TRAJECTORY_FORMATS)?;
        FileType::check(&paths.output_pdb_path, &[FileType::PDB])?;
        if let Some(ndx) = &paths.input_index_path {
            FileType::check(ndx, &[FileType::NDX])?;
        }

        Ok(Cluster { paths, properties })
    }

    fn command(&self, stage: &mut Stage) -> Result<GmxCommand, BlockError> {
        let props = &self.properties;

        let mut command = gmx_command(&props.gmx, "cluster")?;
        command
            .option("-s", stage.input(&self.paths.input_structure_path)?)
            .option("-f", stage.input(&self.paths.input_traj_path)?)
            .option("-cl", stage.output(&self.paths.output_pdb_path)?);

        if let Some(ndx) = stage.optional_input(self.paths.input_index_path.as_ref())? {
            command.option("-n", ndx);
        }

        command
            .option("-cutoff", props.cutoff)
            .option("-method", &props.method);

        if props.dista {
            command.arg("-dista");
        }

        command.stdin(&format!("{}\n{}\n", props.fit_selection, props.output_selection));
        Ok(command)
    }
}

impl BuildingBlock for Cluster {
    const NAME: &'static str = "Cluster";

    fn step(&self) -> &StepProperties {
        &self.properties.step
    }

    fn output_paths(&self) -> Vec<&Path> {
        vec![self.paths.output_pdb_path.as_path()]
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

/// Cluster structures of a trajectory using `gmx cluster`.
pub fn cluster(paths: ClusterPaths, properties: ClusterProperties) -> Result<i32, BlockError> {
    Cluster::new(paths, properties)?.launch()
}
