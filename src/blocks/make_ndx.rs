// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Wrapper of `gmx make_ndx` creating index groups.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{GmxProperties, Properties, StepProperties};
use crate::errors::{BlockError, ConfigError};
use crate::files::{FileType, STRUCTURE_FORMATS};
use crate::runner::block::{ensure_gmx_version, execute, gmx_command, BuildingBlock};
use crate::runner::command::GmxCommand;
use crate::runner::stage::Stage;

/// Properties of the [`MakeNdx`] building block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MakeNdxProperties {
    /// Selection in the `make_ndx` syntax.
    pub selection: String,
    #[serde(flatten)]
    pub gmx: GmxProperties,
    #[serde(flatten)]
    pub step: StepProperties,
}

impl Default for MakeNdxProperties {
    fn default() -> Self {
        MakeNdxProperties {
            selection: "a CA C N O".to_owned(),
            gmx: GmxProperties::default(),
            step: StepProperties::default(),
        }
    }
}

impl Properties for MakeNdxProperties {
    const KEYS: &'static [&'static str] = &["selection"];
}

/// Creates an index file.
#[derive(Debug, Clone)]
pub struct MakeNdx {
    input_structure_path: PathBuf,
    output_ndx_path: PathBuf,
    input_ndx_path: Option<PathBuf>,
    properties: MakeNdxProperties,
}

impl MakeNdx {
    pub fn new(
        input_structure_path: impl AsRef<Path>,
        output_ndx_path: impl AsRef<Path>,
        input_ndx_path: Option<impl AsRef<Path>>,
        properties: MakeNdxProperties,
    ) -> Result<Self, ConfigError> {
        properties.validate()?;
        FileType::check(&input_structure_path, STRUCTURE_FORMATS)?;
        FileType::check(&output_ndx_path, &[FileType::NDX])?;
        if let Some(ndx) = &input_ndx_path {
            FileType::check(ndx, &[FileType::NDX])?;
        }

        Ok(MakeNdx {
            input_structure_path: input_structure_path.as_ref().to_path_buf(),
            output_ndx_path: output_ndx_path.as_ref().to_path_buf(),
            input_ndx_path: input_ndx_path.map(|x| x.as_ref().to_path_buf()),
            properties,
        })
    }

    fn command(&self, stage: &mut Stage) -> Result<GmxCommand, BlockError> {
        let mut command = gmx_command(&self.properties.gmx, "make_ndx")?;
        command
            .option("-f", stage.input(&self.input_structure_path)?)
            .option("-o", stage.output(&self.output_ndx_path)?);

        if let Some(ndx) = stage.optional_input(self.input_ndx_path.as_ref())? {
            command.option("-n", ndx);
        }

        command.stdin(&format!("{}\nq\n", self.properties.selection));
        Ok(command)
    }
}

impl BuildingBlock for MakeNdx {
    const NAME: &'static str = "MakeNdx";

    fn step(&self) -> &StepProperties {
        &self.properties.step
    }

    fn output_paths(&self) -> Vec<&Path> {
        vec![self.output_ndx_path.as_path()]
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

/// Create an index file using `gmx make_ndx`.
pub fn make_ndx(
    input_structure_path: impl AsRef<Path>,
    output_ndx_path: impl AsRef<Path>,
    input_ndx_path: Option<impl AsRef<Path>>,
    properties: MakeNdxProperties,
) -> Result<i32, BlockError> {
    MakeNdx::new(input_structure_path, output_ndx_path, input_ndx_path, properties)?.launch()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auxiliary::path2string;
    use crate::test_utilities::utilities::{fake_gmx, fake_gmx_stdin};
    use tempfile::TempDir;

    fn properties(dir: &Path) -> MakeNdxProperties {
        MakeNdxProperties {
            step: StepProperties {
                sandbox_path: dir.to_path_buf(),
                path: dir.to_path_buf(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn command_with_input_ndx() {
        let dir = TempDir::new().unwrap();
        let structure = dir.path().join("system.gro");
        std::fs::write(&structure, "structure").unwrap();
        let output = dir.path().join("index.ndx");

        let mut props = properties(dir.path());
        props.selection = "r 1-10 & a CA".to_owned();

        let block = MakeNdx::new(&structure, &output, Some("test_files/ndx2resttop.ndx"), props).unwrap();
        let mut stage = Stage::new(&block.properties.gmx, &block.properties.step).unwrap();
        let command = block.command(&mut stage).unwrap();

        let args = command.get_args();
        assert_eq!(args[3..7], [
            "-f".to_owned(),
            path2string(&structure),
            "-o".to_owned(),
            path2string(&output),
        ]);
        assert_eq!(args[7], "-n");
        assert!(args[8].ends_with("test_files/ndx2resttop.ndx"));
        assert_eq!(command.get_stdin(), Some("r 1-10 & a CA\nq\n"));
    }

    #[test]
    fn output_must_be_ndx() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            MakeNdx::new("system.gro", "index.txt", None::<&Path>, properties(dir.path())).unwrap_err(),
            ConfigError::UnsupportedFormat(Box::from(Path::new("index.txt")))
        );
    }

    #[cfg(unix)]
    #[test]
    fn launch() {
        let dir = TempDir::new().unwrap();
        let structure = dir.path().join("system.gro");
        std::fs::write(&structure, "structure").unwrap();
        let output = dir.path().join("index.ndx");

        let mut props = properties(dir.path());
        props.gmx.gmx_path = fake_gmx(dir.path(), "2021.4", 0);

        assert_eq!(make_ndx(&structure, &output, None::<&Path>, props), Ok(0));
        assert!(output.is_file());
        assert_eq!(fake_gmx_stdin(dir.path()), "a CA C N O\nq\n");
    }
}
