// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Preprocessing and running a simulation in a single step.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::blocks::grompp::{Grompp, GromppPaths, GromppProperties};
use crate::blocks::mdrun::{Mdrun, MdrunOptions, MdrunPaths, MdrunProperties};
use crate::config::{GmxProperties, Properties, StepProperties};
use crate::errors::{BlockError, ConfigError, StageError};
use crate::runner::block::BuildingBlock;
use crate::structures::mdp::SimulationType;

/// Properties of the [`GromppMdrun`] building block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GromppMdrunProperties {
    pub output_mdp_path: String,
    pub simulation_type: Option<SimulationType>,
    pub maxwarn: Option<u32>,
    pub mdp: IndexMap<String, serde_yaml::Value>,
    #[serde(flatten)]
    pub options: MdrunOptions,
    #[serde(flatten)]
    pub gmx: GmxProperties,
    #[serde(flatten)]
    pub step: StepProperties,
}

impl Default for GromppMdrunProperties {
    fn default() -> Self {
        let grompp = GromppProperties::default();
        GromppMdrunProperties {
            output_mdp_path: grompp.output_mdp_path,
            simulation_type: grompp.simulation_type,
            maxwarn: grompp.maxwarn,
            mdp: grompp.mdp,
            options: MdrunOptions::default(),
            gmx: GmxProperties::default(),
            step: StepProperties::default(),
        }
    }
}

impl Properties for GromppMdrunProperties {
    const KEYS: &'static [&'static str] = &[
        "output_mdp_path",
        "simulation_type",
        "maxwarn",
        "mdp",
        "mpi_bin",
        "mpi_np",
        "mpi_flags",
        "num_threads",
        "num_threads_mpi",
        "num_threads_omp",
        "num_threads_omp_pme",
        "use_gpu",
        "gpu_id",
        "gpu_tasks",
        "checkpoint_time",
        "dev",
    ];

    fn validate(&self) -> Result<(), ConfigError> {
        self.grompp_properties().validate()?;
        self.options.validate()
    }
}

impl GromppMdrunProperties {
    /// Properties of the preprocessing part.
    pub fn grompp_properties(&self) -> GromppProperties {
        GromppProperties {
            output_mdp_path: self.output_mdp_path.clone(),
            simulation_type: self.simulation_type,
            maxwarn: self.maxwarn,
            mdp: self.mdp.clone(),
            gmx: self.gmx.clone(),
            step: self.step.clone(),
        }
    }

    /// Properties of the simulation part.
    pub fn mdrun_properties(&self) -> MdrunProperties {
        MdrunProperties {
            options: self.options.clone(),
            gmx: self.gmx.clone(),
            step: self.step.clone(),
        }
    }
}

/// Input and output files of the [`GromppMdrun`] building block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GromppMdrunPaths {
    pub input_gro_path: PathBuf,
    pub input_top_zip_path: PathBuf,
    pub output_trr_path: PathBuf,
    pub output_gro_path: PathBuf,
    pub output_edr_path: PathBuf,
    pub output_log_path: PathBuf,
    pub input_cpt_path: Option<PathBuf>,
    pub input_ndx_path: Option<PathBuf>,
    pub input_mdp_path: Option<PathBuf>,
    pub output_xtc_path: Option<PathBuf>,
    pub output_cpt_path: Option<PathBuf>,
    pub output_dhdl_path: Option<PathBuf>,
}

impl GromppMdrunPaths {
    /// Paths of the preprocessing part writing the run input file into `tpr`.
    fn grompp_paths(&self, tpr: &Path) -> GromppPaths {
        GromppPaths {
            input_gro_path: self.input_gro_path.clone(),
            input_top_zip_path: self.input_top_zip_path.clone(),
            output_tpr_path: tpr.to_path_buf(),
            input_cpt_path: self.input_cpt_path.clone(),
            input_ndx_path: self.input_ndx_path.clone(),
            input_mdp_path: self.input_mdp_path.clone(),
        }
    }

    /// Paths of the simulation part reading the run input file from `tpr`.
    fn mdrun_paths(&self, tpr: &Path) -> MdrunPaths {
        MdrunPaths {
            input_tpr_path: tpr.to_path_buf(),
            output_trr_path: self.output_trr_path.clone(),
            output_gro_path: self.output_gro_path.clone(),
            output_edr_path: self.output_edr_path.clone(),
            output_log_path: self.output_log_path.clone(),
            input_cpt_path: None,
            output_xtc_path: self.output_xtc_path.clone(),
            output_cpt_path: self.output_cpt_path.clone(),
            output_dhdl_path: self.output_dhdl_path.clone(),
        }
    }
}

/// Creates a run input file and immediately runs the simulation.
#[derive(Debug, Clone)]
pub struct GromppMdrun {
    paths: GromppMdrunPaths,
    properties: GromppMdrunProperties,
}

impl GromppMdrun {
    pub fn new(
        paths: GromppMdrunPaths,
        properties: GromppMdrunProperties,
    ) -> Result<Self, ConfigError> {
        properties.validate()?;

        // construct both parts to check all the files
        let placeholder = Path::new("internal.tpr");
        Grompp::new(paths.grompp_paths(placeholder), properties.grompp_properties())?;
        Mdrun::new(paths.mdrun_paths(placeholder), properties.mdrun_properties())?;

        Ok(GromppMdrun { paths, properties })
    }
}

impl BuildingBlock for GromppMdrun {
    const NAME: &'static str = "GromppMdrun";

    fn step(&self) -> &StepProperties {
        &self.properties.step
    }

    fn output_paths(&self) -> Vec<&Path> {
        let mut outputs = vec![
            self.paths.output_trr_path.as_path(),
            self.paths.output_gro_path.as_path(),
            self.paths.output_edr_path.as_path(),
            self.paths.output_log_path.as_path(),
        ];

        outputs.extend(
            [
                &self.paths.output_xtc_path,
                &self.paths.output_cpt_path,
                &self.paths.output_dhdl_path,
            ]
            .into_iter()
            .flatten()
            .map(PathBuf::as_path),
        );

        outputs
    }

    fn run(&mut self) -> Result<i32, BlockError> {
        let sandbox = &self.properties.step.sandbox_path;
        std::fs::create_dir_all(sandbox)
            .map_err(|_| StageError::CouldNotCreateDir(Box::from(sandbox.as_path())))?;

        let internal = tempfile::Builder::new()
            .prefix("gmxbb_tpr_")
            .tempdir_in(sandbox)
            .map_err(|_| StageError::CouldNotCreateDir(Box::from(sandbox.as_path())))?;
        let tpr = internal.path().join("internal.tpr");

        let mut grompp = Grompp::new(
            self.paths.grompp_paths(&tpr),
            self.properties.grompp_properties(),
        )?;

        let code = grompp.run()?;
        if code != 0 {
            log::error!(
                "Preprocessing failed with return code {}. Simulation will not be run.",
                code
            );
            return Ok(1);
        }

        let mut mdrun = Mdrun::new(
            self.paths.mdrun_paths(&tpr),
            self.properties.mdrun_properties(),
        )?;

        mdrun.run()
    }
}

/// Preprocess the system using `gmx grompp` and run the simulation using `gmx mdrun`.
pub fn grompp_mdrun(
    paths: GromppMdrunPaths,
    properties: GromppMdrunProperties,
) -> Result<i32, BlockError> {
    GromppMdrun::new(paths, properties)?.launch()
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utilities::utilities::{fake_gmx, fake_gmx_calls, zip_topology};
    use tempfile::TempDir;

    fn setup(dir: &Path) -> GromppMdrunPaths {
        std::fs::write(dir.join("system.gro"), "structure").unwrap();
        zip_topology("test_files/topology_single/topol.top", dir.join("topology.zip"));

        GromppMdrunPaths {
            input_gro_path: dir.join("system.gro"),
            input_top_zip_path: dir.join("topology.zip"),
            output_trr_path: dir.join("output.trr"),
            output_gro_path: dir.join("output.gro"),
            output_edr_path: dir.join("output.edr"),
            output_log_path: dir.join("output.log"),
            ..Default::default()
        }
    }

    fn properties(dir: &Path) -> GromppMdrunProperties {
        GromppMdrunProperties {
            step: StepProperties {
                sandbox_path: dir.to_path_buf(),
                path: dir.to_path_buf(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn split_properties() {
        let props: GromppMdrunProperties = crate::config::read_properties(Some(
            "simulation_type: nvt\nnum_threads_omp: 4\nstep: md\nmdp:\n  nsteps: 5000\n",
        ))
        .unwrap();

        let grompp = props.grompp_properties();
        assert_eq!(grompp.simulation_type, Some(SimulationType::Nvt));
        assert_eq!(grompp.maxwarn(), 10);
        assert_eq!(grompp.step.step.as_deref(), Some("md"));
        assert_eq!(grompp.mdp.len(), 1);

        let mdrun = props.mdrun_properties();
        assert_eq!(mdrun.options.num_threads_omp, Some(4));
        assert_eq!(mdrun.step.step.as_deref(), Some("md"));
    }

    #[test]
    fn invalid_paths() {
        let dir = TempDir::new().unwrap();
        let mut paths = setup(dir.path());
        paths.output_log_path = dir.path().join("output.txt");

        assert_eq!(
            GromppMdrun::new(paths.clone(), properties(dir.path())).unwrap_err(),
            ConfigError::UnsupportedFormat(Box::from(paths.output_log_path.as_path()))
        );
    }

    #[cfg(unix)]
    #[test]
    fn launch() {
        let dir = TempDir::new().unwrap();
        let paths = setup(dir.path());

        let mut props = properties(dir.path());
        props.gmx.gmx_path = fake_gmx(dir.path(), "2024", 0);
        props.simulation_type = Some(SimulationType::Npt);

        assert_eq!(grompp_mdrun(paths.clone(), props), Ok(0));
        assert!(paths.output_gro_path.is_file());
        assert!(paths.output_log_path.is_file());

        let calls = fake_gmx_calls(dir.path());
        assert_eq!(calls.len(), 4);
        assert!(calls[1].contains("grompp"));
        assert!(calls[3].contains("mdrun"));
        assert!(calls[3].contains("internal.tpr"));
    }

    #[cfg(unix)]
    #[test]
    fn grompp_failure() {
        let dir = TempDir::new().unwrap();
        let paths = setup(dir.path());

        let mut props = properties(dir.path());
        props.gmx.gmx_path = fake_gmx(dir.path(), "2024", 3);

        assert_eq!(grompp_mdrun(paths.clone(), props), Ok(1));
        assert!(!paths.output_gro_path.exists());

        let calls = fake_gmx_calls(dir.path());
        assert_eq!(calls.len(), 2);
        assert!(calls[1].contains("grompp"));
    }
}
