// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Common behavior of the building blocks.

use std::path::Path;

use crate::auxiliary::outputs_complete;
use crate::config::{GmxProperties, StepProperties};
use crate::errors::{BlockError, StageError};
use crate::io::zip_io::TopologyBundle;
use crate::runner::command::{GmxCommand, StepLogs};
use crate::runner::container::containerize;
use crate::runner::stage::Stage;
use crate::runner::version::check_gmx_version;

/// Building block wrapping a Gromacs tool.
pub trait BuildingBlock {
    /// Name of the building block.
    const NAME: &'static str;

    /// Properties of the step.
    fn step(&self) -> &StepProperties;

    /// Paths to all output files produced by the block.
    fn output_paths(&self) -> Vec<&Path>;

    /// Run the block unconditionally.
    ///
    /// ## Returns
    /// Return code of the wrapped tool or `BlockError`.
    fn run(&mut self) -> Result<i32, BlockError>;

    /// Run the block unless it can be skipped.
    ///
    /// The block is skipped (returning 0) if `restart` is set and all its
    /// outputs already exist and are not empty.
    fn launch(&mut self) -> Result<i32, BlockError> {
        if self.step().restart && outputs_complete(&self.output_paths()) {
            log::warn!(
                "Restart is enabled, this step: {} will be skipped.",
                Self::NAME
            );
            return Ok(0);
        }

        log::info!("Running {}.", Self::NAME);
        let code = self.run()?;
        log::info!("{} finished with return code {}.", Self::NAME, code);

        Ok(code)
    }
}

/// Construct the command `gmx [-nobackup] [-nocopyright] <subcommand>`.
/// `GMXLIB` is set if `gmx_lib` is provided.
pub fn gmx_command(gmx: &GmxProperties, subcommand: &str) -> Result<GmxCommand, BlockError> {
    let mut command = GmxCommand::from_line(&gmx.gmx_path)?;

    if gmx.gmx_nobackup {
        command.arg("-nobackup");
    }
    if gmx.gmx_nocopyright {
        command.arg("-nocopyright");
    }
    command.arg(subcommand);

    if let Some(lib) = &gmx.gmx_lib {
        command.env("GMXLIB", lib);
    }

    Ok(command)
}

/// Check the version of Gromacs unless the command is run inside a container.
pub fn ensure_gmx_version(gmx: &GmxProperties, name: &str) -> Result<(), BlockError> {
    if gmx.in_container() {
        log::debug!("Running {} in a container. Skipping Gromacs version check.", name);
        return Ok(());
    }

    let version = check_gmx_version(gmx)?;
    log::info!("GROMACS {} {} version detected", name, version);
    Ok(())
}

/// Run `command` on the host or inside the container, appending its output
/// into the log files of the step. Outputs are copied to the host afterwards.
///
/// On the host, the command is run inside the scratch directory of `stage`
/// unless it already has a working directory set.
pub fn execute(
    mut command: GmxCommand,
    gmx: &GmxProperties,
    step: &StepProperties,
    stage: &Stage,
) -> Result<i32, BlockError> {
    let logs = StepLogs::new(step);

    let code = if stage.in_container() {
        containerize(&command, gmx, stage.scratch())?.launch(&logs)?
    } else {
        if command.get_current_dir().is_none() {
            command.current_dir(stage.scratch());
        }
        command.launch(&logs)?
    };

    stage.copy_to_host()?;
    Ok(code)
}

/// Unpack a topology archive into a new directory inside the sandbox of the step.
/// Used by blocks editing the topology without running Gromacs.
pub fn unpack_topology(
    archive: impl AsRef<Path>,
    step: &StepProperties,
) -> Result<TopologyBundle, BlockError> {
    std::fs::create_dir_all(&step.sandbox_path)
        .map_err(|_| StageError::CouldNotCreateDir(Box::from(step.sandbox_path.as_path())))?;

    Ok(TopologyBundle::unzip(archive, &step.sandbox_path)?)
}

/// Remove the unpacked topology or keep it if temporary files should not be removed.
pub fn finish_topology(topology: TopologyBundle, step: &StepProperties) {
    if !step.remove_tmp {
        let kept = topology.keep();
        log::info!("Temporary files kept in '{}'.", kept.display());
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Touch {
        output: PathBuf,
        step: StepProperties,
        runs: usize,
    }

    impl BuildingBlock for Touch {
        const NAME: &'static str = "Touch";

        fn step(&self) -> &StepProperties {
            &self.step
        }

        fn output_paths(&self) -> Vec<&Path> {
            vec![self.output.as_path()]
        }

        fn run(&mut self) -> Result<i32, BlockError> {
            self.runs += 1;
            std::fs::write(&self.output, "content").unwrap();
            Ok(0)
        }
    }

    #[test]
    fn command_flags() {
        let gmx = GmxProperties {
            gmx_path: "mpirun -np 2 gmx_mpi".to_owned(),
            gmx_lib: Some("/opt/top".to_owned()),
            ..Default::default()
        };

        let command = gmx_command(&gmx, "editconf").unwrap();
        assert_eq!(command.get_program(), "mpirun");
        assert_eq!(
            command.get_args(),
            &["-np", "2", "gmx_mpi", "-nobackup", "-nocopyright", "editconf"]
        );
        assert_eq!(
            command.get_env(),
            &[("GMXLIB".to_owned(), "/opt/top".to_owned())]
        );
    }

    #[test]
    fn command_no_flags() {
        let gmx = GmxProperties {
            gmx_nobackup: false,
            gmx_nocopyright: false,
            ..Default::default()
        };

        let command = gmx_command(&gmx, "solvate").unwrap();
        assert_eq!(command.get_program(), "gmx");
        assert_eq!(command.get_args(), &["solvate"]);
        assert!(command.get_env().is_empty());
    }

    #[test]
    fn restart_skips() {
        let dir = TempDir::new().unwrap();
        let mut block = Touch {
            output: dir.path().join("output.gro"),
            step: StepProperties {
                restart: true,
                ..Default::default()
            },
            runs: 0,
        };

        assert_eq!(block.launch(), Ok(0));
        assert_eq!(block.runs, 1);

        assert_eq!(block.launch(), Ok(0));
        assert_eq!(block.runs, 1);
    }

    #[test]
    fn no_restart_reruns() {
        let dir = TempDir::new().unwrap();
        let mut block = Touch {
            output: dir.path().join("output.gro"),
            step: StepProperties::default(),
            runs: 0,
        };

        block.launch().unwrap();
        block.launch().unwrap();
        assert_eq!(block.runs, 2);
    }

    #[test]
    fn topology_unpacked_in_sandbox() {
        let dir = TempDir::new().unwrap();
        crate::test_utilities::utilities::zip_topology(
            "test_files/topology_single/topol.top",
            dir.path().join("topology.zip"),
        );

        let step = StepProperties {
            sandbox_path: dir.path().join("sandbox"),
            remove_tmp: false,
            ..Default::default()
        };

        let topology = unpack_topology(dir.path().join("topology.zip"), &step).unwrap();
        assert!(topology.top_path().starts_with(dir.path().join("sandbox")));
        let top = topology.top_path().to_path_buf();

        finish_topology(topology, &step);
        assert!(top.is_file());
    }

    #[test]
    fn version_not_checked_in_container() {
        let gmx = GmxProperties {
            gmx_path: "nonexistent_gromacs_binary_Xhfguiedhq".to_owned(),
            container_path: Some("docker".to_owned()),
            ..Default::default()
        };

        assert!(ensure_gmx_version(&gmx, "Editconf").is_ok());
    }
}
