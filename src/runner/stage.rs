// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Staging of input and output files of a building block.
//!
//! Every building block owns a scratch directory created inside `sandbox_path`.
//! When running on the host, the command receives absolute host paths.
//! When running inside a container, input files are copied into the scratch directory
//! which is mounted into the container and outputs are copied back to the host afterwards.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::auxiliary::{absolute, file_name, path2string};
use crate::config::{GmxProperties, StepProperties};
use crate::errors::StageError;
use crate::io::zip_io::TopologyBundle;

/// Scratch directory and mapping of host paths to the paths seen by the command.
#[derive(Debug)]
pub struct Stage {
    scratch: TempDir,
    volume: Option<String>,
    outputs: Vec<(PathBuf, PathBuf)>,
    remove_tmp: bool,
}

impl Stage {
    /// Create a new scratch directory for a step.
    pub fn new(gmx: &GmxProperties, step: &StepProperties) -> Result<Self, StageError> {
        if !step.sandbox_path.exists() {
            std::fs::create_dir_all(&step.sandbox_path)
                .map_err(|_| StageError::CouldNotCreateDir(Box::from(step.sandbox_path.as_path())))?;
        }

        let scratch = tempfile::Builder::new()
            .prefix("gmxbb_")
            .tempdir_in(&step.sandbox_path)
            .map_err(|_| StageError::CouldNotCreateDir(Box::from(step.sandbox_path.as_path())))?;

        log::debug!("Created scratch directory '{}'.", scratch.path().display());

        Ok(Stage {
            scratch,
            volume: gmx
                .container_path
                .as_ref()
                .map(|_| gmx.container_volume_path.clone()),
            outputs: Vec::new(),
            remove_tmp: step.remove_tmp,
        })
    }

    /// Get the path to the scratch directory on the host.
    pub fn scratch(&self) -> &Path {
        self.scratch.path()
    }

    /// Check whether the files are staged for a container.
    pub fn in_container(&self) -> bool {
        self.volume.is_some()
    }

    /// Stage an input file.
    ///
    /// ## Returns
    /// Path to the file as seen by the command or `StageError::FileNotFound`
    /// if the file does not exist.
    pub fn input(&mut self, path: impl AsRef<Path>) -> Result<String, StageError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(StageError::FileNotFound(Box::from(path)));
        }

        match &self.volume {
            None => host_path(path),
            Some(volume) => {
                let name = file_name(path);
                let target = self.scratch.path().join(&name);
                if target != path {
                    std::fs::copy(path, &target)
                        .map_err(|_| StageError::CouldNotCopy(Box::from(path)))?;
                }
                Ok(format!("{}/{}", volume.trim_end_matches('/'), name))
            }
        }
    }

    /// Stage an optional input file.
    pub fn optional_input(
        &mut self,
        path: Option<impl AsRef<Path>>,
    ) -> Result<Option<String>, StageError> {
        path.map(|p| self.input(p)).transpose()
    }

    /// Stage an output file.
    ///
    /// ## Returns
    /// Path to the file as seen by the command. When running inside a container,
    /// the file is copied to `path` by [`Stage::copy_to_host`].
    pub fn output(&mut self, path: impl AsRef<Path>) -> Result<String, StageError> {
        let path = path.as_ref();

        match &self.volume {
            None => host_path(path),
            Some(volume) => {
                let name = file_name(path);
                self.outputs
                    .push((path.to_path_buf(), self.scratch.path().join(&name)));
                Ok(format!("{}/{}", volume.trim_end_matches('/'), name))
            }
        }
    }

    /// Stage an optional output file.
    pub fn optional_output(
        &mut self,
        path: Option<impl AsRef<Path>>,
    ) -> Result<Option<String>, StageError> {
        path.map(|p| self.output(p)).transpose()
    }

    /// Get the path to a file located inside the scratch directory as seen by the command.
    ///
    /// ## Returns
    /// `StageError::InvalidPath` if the file is not located inside the scratch directory.
    pub fn internal(&self, path: impl AsRef<Path>) -> Result<String, StageError> {
        let path = path.as_ref();
        let relative = path
            .strip_prefix(self.scratch.path())
            .map_err(|_| StageError::InvalidPath(Box::from(path)))?;

        match &self.volume {
            None => host_path(path),
            Some(volume) => Ok(format!(
                "{}/{}",
                volume.trim_end_matches('/'),
                path2string(relative)
            )),
        }
    }

    /// Copy the outputs produced inside the container to their host paths.
    /// Does nothing when running on the host.
    pub fn copy_to_host(&self) -> Result<(), StageError> {
        for (host, staged) in &self.outputs {
            if !staged.is_file() {
                log::warn!("Output '{}' was not produced.", host.display());
                continue;
            }

            std::fs::copy(staged, host).map_err(|_| StageError::CouldNotCopy(Box::from(host.as_path())))?;
        }

        Ok(())
    }

    /// Remove the scratch directory or keep it if temporary files should not be removed.
    pub fn finish(self) {
        if self.remove_tmp {
            log::debug!("Removing scratch directory '{}'.", self.scratch.path().display());
        } else {
            let kept = self.scratch.into_path();
            log::info!("Temporary files kept in '{}'.", kept.display());
        }
    }

    /// Same as [`Stage::finish`] but also handles a topology unpacked into the scratch directory.
    pub fn finish_with(self, topology: TopologyBundle) {
        if !self.remove_tmp {
            topology.keep();
        }
        self.finish();
    }
}

/// Absolute host path of a file.
fn host_path(path: &Path) -> Result<String, StageError> {
    absolute(path)
        .map(path2string)
        .map_err(|_| StageError::InvalidPath(Box::from(path)))
}

/******************************/
/*         UNIT TESTS         */
/******************************/
