// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Wrapper of `gmx editconf` creating a simulation box around a structure.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{check_allowed, GmxProperties, Properties, StepProperties};
use crate::errors::{BlockError, ConfigError};
use crate::files::{FileType, STRUCTURE_FORMATS};
use crate::runner::block::{ensure_gmx_version, execute, gmx_command, BuildingBlock};
use crate::runner::command::GmxCommand;
use crate::runner::stage::Stage;

/// Types of simulation boxes supported by `gmx editconf`.
pub const BOX_TYPES: &[&str] = &["cubic", "triclinic", "dodecahedron", "octahedron"];

/// Properties of the [`Editconf`] building block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditconfProperties {
    /// Distance (in nm) between the solute and the box.
    pub distance_to_molecule: f64,
    /// Type of the box.
    pub box_type: String,
    /// Center the molecule in the box.
    pub center_molecule: bool,
    #[serde(flatten)]
    pub gmx: GmxProperties,
    #[serde(flatten)]
    pub step: StepProperties,
}

impl Default for EditconfProperties {
    fn default() -> Self {
        EditconfProperties {
            distance_to_molecule: 1.0,
            box_type: "cubic".to_owned(),
            center_molecule: true,
            gmx: GmxProperties::default(),
            step: StepProperties::default(),
        }
    }
}

impl Properties for EditconfProperties {
    const KEYS: &'static [&'static str] = &["distance_to_molecule", "box_type", "center_molecule"];

    fn validate(&self) -> Result<(), ConfigError> {
        check_allowed("box_type", &self.box_type, BOX_TYPES)?;

        if self.distance_to_molecule < 0.0 {
            return Err(ConfigError::InvalidValue(
                "distance_to_molecule".to_owned(),
                self.distance_to_molecule.to_string(),
            ));
        }

        Ok(())
    }
}

/// Creates a simulation box around the input structure.
#[derive(Debug, Clone)]
pub struct Editconf {
    input_gro_path: PathBuf,
    output_gro_path: PathBuf,
    properties: EditconfProperties,
}

impl Editconf {
    pub fn new(
        input_gro_path: impl AsRef<Path>,
        output_gro_path: impl AsRef<Path>,
        properties: EditconfProperties,
    ) -> Result<Self, ConfigError> {
        properties.validate()?;
        FileType::check(&input_gro_path, STRUCTURE_FORMATS)?;
        FileType::check(&output_gro_path, &[FileType::GRO, FileType::PDB])?;

        Ok(Editconf {
            input_gro_path: input_gro_path.as_ref().to_path_buf(),
            output_gro_path: output_gro_path.as_ref().to_path_buf(),
            properties,
        })
    }

    fn command(&self, stage: &mut Stage) -> Result<GmxCommand, BlockError> {
        let mut command = gmx_command(&self.properties.gmx, "editconf")?;
        command
            .option("-f", stage.input(&self.input_gro_path)?)
            .option("-o", stage.output(&self.output_gro_path)?)
            .option("-d", self.properties.distance_to_molecule)
            .option("-bt", &self.properties.box_type);

        if self.properties.center_molecule {
            command.arg("-c");
        }

        Ok(command)
    }
}

impl BuildingBlock for Editconf {
    const NAME: &'static str = "Editconf";

    fn step(&self) -> &StepProperties {
        &self.properties.step
    }

    fn output_paths(&self) -> Vec<&Path> {
        vec![self.output_gro_path.as_path()]
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

/// Create a simulation box around the structure in `input_gro_path` using `gmx editconf`.
pub fn editconf(
    input_gro_path: impl AsRef<Path>,
    output_gro_path: impl AsRef<Path>,
    properties: EditconfProperties,
) -> Result<i32, BlockError> {
    Editconf::new(input_gro_path, output_gro_path, properties)?.launch()
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

    fn properties(dir: &Path) -> EditconfProperties {
        EditconfProperties {
            step: StepProperties {
                sandbox_path: dir.to_path_buf(),
                path: dir.to_path_buf(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn command() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input.gro");
        std::fs::write(&input, "structure").unwrap();
        let output = dir.path().join("output.gro");

        let mut props = properties(dir.path());
        props.distance_to_molecule = 1.5;
        props.box_type = "dodecahedron".to_owned();

        let block = Editconf::new(&input, &output, props).unwrap();
        let mut stage = Stage::new(&block.properties.gmx, &block.properties.step).unwrap();
        let command = block.command(&mut stage).unwrap();

        assert_eq!(command.get_program(), "gmx");
        assert_eq!(
            command.get_args(),
            &[
                "-nobackup".to_owned(),
                "-nocopyright".to_owned(),
                "editconf".to_owned(),
                "-f".to_owned(),
                path2string(&input),
                "-o".to_owned(),
                path2string(&output),
                "-d".to_owned(),
                "1.5".to_owned(),
                "-bt".to_owned(),
                "dodecahedron".to_owned(),
                "-c".to_owned(),
            ]
        );
    }

    #[test]
    fn invalid_box_type() {
        let dir = TempDir::new().unwrap();
        let mut props = properties(dir.path());
        props.box_type = "sphere".to_owned();

        match Editconf::new("input.gro", "output.gro", props) {
            Err(ConfigError::InvalidValue(name, value)) => {
                assert_eq!(name, "box_type");
                assert_eq!(value, "sphere");
            }
            Ok(_) => panic!("Construction should have failed, but it succeeded."),
            Err(e) => panic!("Incorrect error type `{:?}` was returned.", e),
        }
    }

    #[test]
    fn unsupported_format() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            Editconf::new("input.xyz", "output.gro", properties(dir.path())).unwrap_err(),
            ConfigError::UnsupportedFormat(Box::from(Path::new("input.xyz")))
        );
    }

    #[test]
    fn missing_input() {
        let dir = TempDir::new().unwrap();
        let mut props = properties(dir.path());
        props.gmx.container_path = Some("docker".to_owned());

        let result = editconf(
            dir.path().join("missing.gro"),
            dir.path().join("output.gro"),
            props,
        );

        assert!(matches!(
            result,
            Err(BlockError::Stage(crate::errors::StageError::FileNotFound(_)))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn launch() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input.gro");
        std::fs::write(&input, "structure").unwrap();
        let output = dir.path().join("output.gro");

        let mut props = properties(dir.path());
        props.gmx.gmx_path = fake_gmx(dir.path(), "2021.4", 0);
        props.step.step = Some("box".to_owned());

        assert_eq!(editconf(&input, &output, props.clone()), Ok(0));
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "fake -o output\n"
        );
        assert!(dir.path().join("box_log.out").is_file());
        assert_eq!(fake_gmx_calls(dir.path()).len(), 2);

        // restart skips the step
        props.step.restart = true;
        assert_eq!(editconf(&input, &output, props), Ok(0));
        assert_eq!(fake_gmx_calls(dir.path()).len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn launch_failure_code() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input.gro");
        std::fs::write(&input, "structure").unwrap();

        let mut props = properties(dir.path());
        props.gmx.gmx_path = fake_gmx(dir.path(), "2021.4", 2);

        assert_eq!(editconf(&input, dir.path().join("output.gro"), props), Ok(2));
    }
}
