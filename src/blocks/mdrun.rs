// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Wrapper of `gmx mdrun` running a simulation from a portable run input file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{GmxProperties, Properties, StepProperties};
use crate::errors::{BlockError, ConfigError};
use crate::files::{FileType, TRAJECTORY_FORMATS};
use crate::runner::block::{ensure_gmx_version, execute, gmx_command, BuildingBlock};
use crate::runner::command::GmxCommand;
use crate::runner::stage::Stage;

/// Options of the simulation engine.
/// Shared by [`MdrunProperties`] and the properties of `GromppMdrun`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MdrunOptions {
    /// MPI launcher (e.g. `mpirun` or `srun`). Gromacs version is not checked if set.
    pub mpi_bin: Option<String>,
    /// Number of MPI processes.
    pub mpi_np: Option<u32>,
    /// Additional flags of the MPI launcher.
    pub mpi_flags: Option<String>,
    pub num_threads: Option<u32>,
    pub num_threads_mpi: Option<u32>,
    pub num_threads_omp: Option<u32>,
    pub num_threads_omp_pme: Option<u32>,
    /// Run nonbonded interactions and PME on GPU.
    pub use_gpu: bool,
    pub gpu_id: Option<String>,
    pub gpu_tasks: Option<String>,
    /// Checkpoint interval in minutes. Only used if a checkpoint output is requested.
    pub checkpoint_time: Option<f64>,
    /// Additional arguments of `gmx mdrun`.
    pub dev: Option<String>,
}

impl MdrunOptions {
    pub(crate) const KEYS: &'static [&'static str] = &[
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

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if let Some(time) = self.checkpoint_time {
            if time <= 0.0 {
                return Err(ConfigError::InvalidValue(
                    "checkpoint_time".to_owned(),
                    time.to_string(),
                ));
            }
        }

        if self.mpi_bin.as_deref().is_some_and(|x| x.trim().is_empty()) {
            return Err(ConfigError::InvalidValue(
                "mpi_bin".to_owned(),
                String::new(),
            ));
        }

        Ok(())
    }

    /// Add the parallelization and hardware options to the `gmx mdrun` command.
    fn add_hardware_options(&self, command: &mut GmxCommand) {
        let threads = [
            ("-nt", self.num_threads),
            ("-ntmpi", self.num_threads_mpi),
            ("-ntomp", self.num_threads_omp),
            ("-ntomp_pme", self.num_threads_omp_pme),
        ];

        for (flag, value) in threads {
            if let Some(n) = value {
                command.option(flag, n);
            }
        }

        if self.use_gpu {
            command.option("-nb", "gpu").option("-pme", "gpu");
        }

        if let Some(id) = &self.gpu_id {
            command.option("-gpu_id", id);
        }

        if let Some(tasks) = &self.gpu_tasks {
            command.option("-gputasks", tasks);
        }

        if let Some(dev) = &self.dev {
            command.args(dev.split_whitespace());
        }
    }

    /// Wrap the command into the MPI launcher, if requested.
    fn wrap_mpi(&self, command: &mut GmxCommand) {
        let Some(bin) = &self.mpi_bin else {
            return;
        };

        let mut launcher = GmxCommand::new(bin.trim());
        if let Some(np) = self.mpi_np {
            launcher.option("-n", np);
        }
        if let Some(flags) = &self.mpi_flags {
            launcher.args(flags.split_whitespace());
        }

        command.prepend(&launcher);
    }
}

/// Properties of the [`Mdrun`] building block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MdrunProperties {
    #[serde(flatten)]
    pub options: MdrunOptions,
    #[serde(flatten)]
    pub gmx: GmxProperties,
    #[serde(flatten)]
    pub step: StepProperties,
}

impl Properties for MdrunProperties {
    const KEYS: &'static [&'static str] = MdrunOptions::KEYS;

    fn validate(&self) -> Result<(), ConfigError> {
        self.options.validate()
    }
}

/// Input and output files of the [`Mdrun`] building block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MdrunPaths {
    pub input_tpr_path: PathBuf,
    pub output_trr_path: PathBuf,
    pub output_gro_path: PathBuf,
    pub output_edr_path: PathBuf,
    pub output_log_path: PathBuf,
    pub input_cpt_path: Option<PathBuf>,
    pub output_xtc_path: Option<PathBuf>,
    pub output_cpt_path: Option<PathBuf>,
    pub output_dhdl_path: Option<PathBuf>,
}

impl MdrunPaths {
    /// Check the formats of the files.
    pub(crate) fn check(&self) -> Result<(), ConfigError> {
        FileType::check(&self.input_tpr_path, &[FileType::TPR])?;
        FileType::check(&self.output_trr_path, &[FileType::TRR])?;
        FileType::check(&self.output_gro_path, &[FileType::GRO, FileType::PDB])?;
        FileType::check(&self.output_edr_path, &[FileType::EDR])?;
        FileType::check(&self.output_log_path, &[FileType::LOG])?;

        if let Some(cpt) = &self.input_cpt_path {
            FileType::check(cpt, &[FileType::CPT])?;
        }
        if let Some(xtc) = &self.output_xtc_path {
            FileType::check(xtc, TRAJECTORY_FORMATS)?;
        }
        if let Some(cpt) = &self.output_cpt_path {
            FileType::check(cpt, &[FileType::CPT])?;
        }
        if let Some(dhdl) = &self.output_dhdl_path {
            FileType::check(dhdl, &[FileType::XVG])?;
        }

        Ok(())
    }

    /// Get all the output files.
    pub(crate) fn outputs(&self) -> Vec<&Path> {
        let mut outputs = vec![
            self.output_trr_path.as_path(),
            self.output_gro_path.as_path(),
            self.output_edr_path.as_path(),
            self.output_log_path.as_path(),
        ];

        outputs.extend(
            [
                &self.output_xtc_path,
                &self.output_cpt_path,
                &self.output_dhdl_path,
            ]
            .into_iter()
            .flatten()
            .map(PathBuf::as_path),
        );

        outputs
    }
}

/// Construct the `gmx mdrun` command reading the run input file `tpr` (as seen by the command).
fn mdrun_command(
    tpr: &str,
    paths: &MdrunPaths,
    options: &MdrunOptions,
    gmx: &GmxProperties,
    stage: &mut Stage,
) -> Result<GmxCommand, BlockError> {
    let mut command = gmx_command(gmx, "mdrun")?;
    command
        .option("-s", tpr)
        .option("-o", stage.output(&paths.output_trr_path)?)
        .option("-c", stage.output(&paths.output_gro_path)?)
        .option("-e", stage.output(&paths.output_edr_path)?)
        .option("-g", stage.output(&paths.output_log_path)?);

    if let Some(cpt) = stage.optional_input(paths.input_cpt_path.as_ref())? {
        command.option("-cpi", cpt);
    }

    if let Some(xtc) = stage.optional_output(paths.output_xtc_path.as_ref())? {
        command.option("-x", xtc);
    }

    if let Some(cpt) = stage.optional_output(paths.output_cpt_path.as_ref())? {
        command.option("-cpo", cpt);
        if let Some(time) = options.checkpoint_time {
            command.option("-cpt", time);
        }
    }

    if let Some(dhdl) = stage.optional_output(paths.output_dhdl_path.as_ref())? {
        command.option("-dhdl", dhdl);
    }

    options.add_hardware_options(&mut command);
    options.wrap_mpi(&mut command);

    Ok(command)
}

/// Runs a simulation.
#[derive(Debug, Clone)]
pub struct Mdrun {
    paths: MdrunPaths,
    properties: MdrunProperties,
}

impl Mdrun {
    pub fn new(paths: MdrunPaths, properties: MdrunProperties) -> Result<Self, ConfigError> {
        properties.validate()?;
        paths.check()?;

        Ok(Mdrun { paths, properties })
    }

    fn command(&self, stage: &mut Stage) -> Result<GmxCommand, BlockError> {
        let tpr = stage.input(&self.paths.input_tpr_path)?;
        mdrun_command(
            &tpr,
            &self.paths,
            &self.properties.options,
            &self.properties.gmx,
            stage,
        )
    }
}

impl BuildingBlock for Mdrun {
    const NAME: &'static str = "Mdrun";

    fn step(&self) -> &StepProperties {
        &self.properties.step
    }

    fn output_paths(&self) -> Vec<&Path> {
        self.paths.outputs()
    }

    fn run(&mut self) -> Result<i32, BlockError> {
        let gmx = &self.properties.gmx;
        if self.properties.options.mpi_bin.is_none() {
            ensure_gmx_version(gmx, Self::NAME)?;
        }

        let mut stage = Stage::new(gmx, &self.properties.step)?;
        let command = self.command(&mut stage)?;
        let code = execute(command, gmx, &self.properties.step, &stage)?;
        stage.finish();

        Ok(code)
    }
}

/// Run a simulation using `gmx mdrun`.
pub fn mdrun(paths: MdrunPaths, properties: MdrunProperties) -> Result<i32, BlockError> {
    Mdrun::new(paths, properties)?.launch()
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auxiliary::path2string;
    use crate::test_utilities::utilities::{fake_gmx, fake_gmx_calls};
    use tempfile::TempDir;

    fn setup(dir: &Path) -> MdrunPaths {
        std::fs::write(dir.join("input.tpr"), "run input").unwrap();

        MdrunPaths {
            input_tpr_path: dir.join("input.tpr"),
            output_trr_path: dir.join("output.trr"),
            output_gro_path: dir.join("output.gro"),
            output_edr_path: dir.join("output.edr"),
            output_log_path: dir.join("output.log"),
            ..Default::default()
        }
    }

    fn properties(dir: &Path) -> MdrunProperties {
        MdrunProperties {
            step: StepProperties {
                sandbox_path: dir.to_path_buf(),
                path: dir.to_path_buf(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn string_args(args: &[&str]) -> Vec<String> {
        args.iter().map(|x| (*x).to_owned()).collect()
    }

    #[test]
    fn command_basic() {
        let dir = TempDir::new().unwrap();
        let paths = setup(dir.path());
        let block = Mdrun::new(paths.clone(), properties(dir.path())).unwrap();

        let mut stage = Stage::new(&block.properties.gmx, &block.properties.step).unwrap();
        let command = block.command(&mut stage).unwrap();

        assert_eq!(command.get_program(), "gmx");
        assert_eq!(
            &command.get_args()[3..],
            &[
                "-s".to_owned(),
                path2string(&paths.input_tpr_path),
                "-o".to_owned(),
                path2string(&paths.output_trr_path),
                "-c".to_owned(),
                path2string(&paths.output_gro_path),
                "-e".to_owned(),
                path2string(&paths.output_edr_path),
                "-g".to_owned(),
                path2string(&paths.output_log_path),
            ]
        );
    }

    #[test]
    fn command_full() {
        let dir = TempDir::new().unwrap();
        let mut paths = setup(dir.path());
        paths.output_xtc_path = Some(dir.path().join("traj.xtc"));
        paths.output_cpt_path = Some(dir.path().join("state.cpt"));

        let mut props = properties(dir.path());
        props.gmx.container_path = Some("docker".to_owned());
        props.options = MdrunOptions {
            mpi_bin: Some("mpirun".to_owned()),
            mpi_np: Some(4),
            mpi_flags: Some("--oversubscribe --bind-to none".to_owned()),
            num_threads_omp: Some(8),
            use_gpu: true,
            gpu_id: Some("01".to_owned()),
            checkpoint_time: Some(15.0),
            dev: Some("-pin on".to_owned()),
            ..Default::default()
        };

        let block = Mdrun::new(paths, props).unwrap();
        let mut stage = Stage::new(&block.properties.gmx, &block.properties.step).unwrap();
        let command = block.command(&mut stage).unwrap();

        assert_eq!(command.get_program(), "mpirun");
        assert_eq!(
            command.get_args(),
            string_args(&[
                "-n",
                "4",
                "--oversubscribe",
                "--bind-to",
                "none",
                "gmx",
                "-nobackup",
                "-nocopyright",
                "mdrun",
                "-s",
                "/data/input.tpr",
                "-o",
                "/data/output.trr",
                "-c",
                "/data/output.gro",
                "-e",
                "/data/output.edr",
                "-g",
                "/data/output.log",
                "-x",
                "/data/traj.xtc",
                "-cpo",
                "/data/state.cpt",
                "-cpt",
                "15",
                "-ntomp",
                "8",
                "-nb",
                "gpu",
                "-pme",
                "gpu",
                "-gpu_id",
                "01",
                "-pin",
                "on",
            ])
        );
    }

    #[test]
    fn properties_from_yaml() {
        let props: MdrunProperties = crate::config::read_properties(Some(
            "{\"num_threads\": 4, \"use_gpu\": true, \"dev\": \"-v\", \"step\": \"md\"}",
        ))
        .unwrap();

        assert_eq!(props.options.num_threads, Some(4));
        assert!(props.options.use_gpu);
        assert_eq!(props.options.dev.as_deref(), Some("-v"));
        assert_eq!(props.step.step.as_deref(), Some("md"));
        assert_eq!(props.gmx.gmx_path, "gmx");
    }

    #[test]
    fn invalid_checkpoint_time() {
        let dir = TempDir::new().unwrap();
        let mut props = properties(dir.path());
        props.options.checkpoint_time = Some(-1.0);

        assert_eq!(
            Mdrun::new(setup(dir.path()), props).unwrap_err(),
            ConfigError::InvalidValue("checkpoint_time".to_owned(), "-1".to_owned())
        );
    }

    #[test]
    fn invalid_output_format() {
        let dir = TempDir::new().unwrap();
        let mut paths = setup(dir.path());
        paths.output_edr_path = dir.path().join("output.xvg");

        assert_eq!(
            Mdrun::new(paths.clone(), properties(dir.path())).unwrap_err(),
            ConfigError::UnsupportedFormat(Box::from(paths.output_edr_path.as_path()))
        );
    }

    #[test]
    fn output_paths() {
        let dir = TempDir::new().unwrap();
        let mut paths = setup(dir.path());
        paths.output_dhdl_path = Some(dir.path().join("dhdl.xvg"));

        let block = Mdrun::new(paths, properties(dir.path())).unwrap();
        let outputs = block.output_paths();
        assert_eq!(outputs.len(), 5);
        assert_eq!(outputs[4], dir.path().join("dhdl.xvg"));
    }

    #[cfg(unix)]
    #[test]
    fn launch() {
        let dir = TempDir::new().unwrap();
        let paths = setup(dir.path());

        let mut props = properties(dir.path());
        props.gmx.gmx_path = fake_gmx(dir.path(), "2023.1", 0);

        assert_eq!(mdrun(paths.clone(), props), Ok(0));
        for output in [
            &paths.output_trr_path,
            &paths.output_gro_path,
            &paths.output_edr_path,
            &paths.output_log_path,
        ] {
            assert!(output.is_file());
        }

        let calls = fake_gmx_calls(dir.path());
        assert_eq!(calls.len(), 2);
        assert!(calls[0].contains("-version"));
        assert!(calls[1].contains("mdrun"));
    }

    #[cfg(unix)]
    #[test]
    fn launch_mpi_skips_version() {
        let dir = TempDir::new().unwrap();
        let paths = setup(dir.path());

        let mut props = properties(dir.path());
        props.gmx.gmx_path = fake_gmx(dir.path(), "4.6.7", 0);
        // `env` runs the wrapped command unchanged
        props.options.mpi_bin = Some("env".to_owned());

        assert_eq!(mdrun(paths.clone(), props), Ok(0));

        let calls = fake_gmx_calls(dir.path());
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains("mdrun"));
    }
}
