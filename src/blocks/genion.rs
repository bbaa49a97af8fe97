// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Wrapper of `gmx genion` replacing solvent molecules with ions.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{GmxProperties, Properties, StepProperties};
use crate::errors::{BlockError, ConfigError};
use crate::files::FileType;
use crate::io::zip_io::TopologyBundle;
use crate::runner::block::{ensure_gmx_version, execute, gmx_command, BuildingBlock};
use crate::runner::command::GmxCommand;
use crate::runner::stage::Stage;

/// Properties of the [`Genion`] building block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenionProperties {
    /// Group of solvent molecules to replace with ions.
    pub replaced_group: String,
    /// Neutralize the charge of the system.
    pub neutral: bool,
    /// Salt concentration (mol/liter). Not used if zero.
    pub concentration: f64,
    /// Seed of the random number generator. Random seed is used if not provided.
    pub seed: Option<i64>,
    #[serde(flatten)]
    pub gmx: GmxProperties,
    #[serde(flatten)]
    pub step: StepProperties,
}

impl Default for GenionProperties {
    fn default() -> Self {
        GenionProperties {
            replaced_group: "SOL".to_owned(),
            neutral: false,
            concentration: 0.05,
            seed: Some(1993),
            gmx: GmxProperties::default(),
            step: StepProperties::default(),
        }
    }
}

impl Properties for GenionProperties {
    const KEYS: &'static [&'static str] = &["replaced_group", "neutral", "concentration", "seed"];

    fn validate(&self) -> Result<(), ConfigError> {
        if self.concentration < 0.0 {
            return Err(ConfigError::InvalidValue(
                "concentration".to_owned(),
                self.concentration.to_string(),
            ));
        }

        Ok(())
    }
}

/// Input and output files of the [`Genion`] building block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenionPaths {
    pub input_tpr_path: PathBuf,
    pub input_top_zip_path: PathBuf,
    pub output_gro_path: PathBuf,
    pub output_top_zip_path: PathBuf,
    pub input_ndx_path: Option<PathBuf>,
}

/// Adds ions to a solvated system.
#[derive(Debug, Clone)]
pub struct Genion {
    paths: GenionPaths,
    properties: GenionProperties,
}

impl Genion {
    pub fn new(paths: GenionPaths, properties: GenionProperties) -> Result<Self, ConfigError> {
        properties.validate()?;
        FileType::check(&paths.input_tpr_path, &[FileType::TPR])?;
        FileType::check(&paths.input_top_zip_path, &[FileType::ZIP])?;
        FileType::check(&paths.output_gro_path, &[FileType::GRO, FileType::PDB])?;
        FileType::check(&paths.output_top_zip_path, &[FileType::ZIP])?;
        if let Some(ndx) = &paths.input_ndx_path {
            FileType::check(ndx, &[FileType::NDX])?;
        }

        Ok(Genion { paths, properties })
    }

    fn command(&self, stage: &mut Stage, topology: &TopologyBundle) -> Result<GmxCommand, BlockError> {
        let props = &self.properties;

        let mut command = gmx_command(&props.gmx, "genion")?;
        command
            .option("-s", stage.input(&self.paths.input_tpr_path)?)
            .option("-o", stage.output(&self.paths.output_gro_path)?)
            .option("-p", stage.internal(topology.top_path())?);

        if let Some(ndx) = stage.optional_input(self.paths.input_ndx_path.as_ref())? {
            command.option("-n", ndx);
        }

        if props.neutral {
            command.arg("-neutral");
        }

        if props.concentration != 0.0 {
            command.option("-conc", props.concentration);
        }

        if let Some(seed) = props.seed {
            command.option("-seed", seed);
        }

        command.stdin(&format!("{}\n", props.replaced_group));
        Ok(command)
    }
}

impl BuildingBlock for Genion {
    const NAME: &'static str = "Genion";

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

/// Replace solvent molecules with ions using `gmx genion`.
pub fn genion(paths: GenionPaths, properties: GenionProperties) -> Result<i32, BlockError> {
    Genion::new(paths, properties)?.launch()
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::zip_io::unzip_top;
    use crate::test_utilities::utilities::{fake_gmx, fake_gmx_stdin, zip_topology};
    use tempfile::TempDir;

    fn setup(dir: &Path) -> GenionPaths {
        std::fs::write(dir.join("input.tpr"), "run input").unwrap();
        zip_topology("test_files/topology_single/topol.top", dir.join("input.zip"));

        GenionPaths {
            input_tpr_path: dir.join("input.tpr"),
            input_top_zip_path: dir.join("input.zip"),
            output_gro_path: dir.join("ions.gro"),
            output_top_zip_path: dir.join("ions.zip"),
            input_ndx_path: None,
        }
    }

    fn properties(dir: &Path) -> GenionProperties {
        GenionProperties {
            step: StepProperties {
                sandbox_path: dir.to_path_buf(),
                path: dir.to_path_buf(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn flags_after_topology(command: &GmxCommand) -> Vec<String> {
        let args = command.get_args();
        let p = args.iter().position(|x| x == "-p").unwrap();
        args[p + 2..].to_vec()
    }

    #[test]
    fn command_defaults() {
        let dir = TempDir::new().unwrap();
        let paths = setup(dir.path());
        let block = Genion::new(paths.clone(), properties(dir.path())).unwrap();

        let mut stage = Stage::new(&block.properties.gmx, &block.properties.step).unwrap();
        let topology = TopologyBundle::unzip(&paths.input_top_zip_path, stage.scratch()).unwrap();
        let command = block.command(&mut stage, &topology).unwrap();

        assert_eq!(
            flags_after_topology(&command),
            vec!["-conc", "0.05", "-seed", "1993"]
        );
        assert_eq!(command.get_stdin(), Some("SOL\n"));
    }

    #[test]
    fn command_neutral_without_concentration() {
        let dir = TempDir::new().unwrap();
        let paths = setup(dir.path());

        let props: GenionProperties = crate::config::read_properties(Some(&format!(
            "properties:\n  neutral: true\n  concentration: 0\n  seed: null\n  replaced_group: Water\n  sandbox_path: {}\n",
            dir.path().display()
        )))
        .unwrap();

        let block = Genion::new(paths.clone(), props).unwrap();
        let mut stage = Stage::new(&block.properties.gmx, &block.properties.step).unwrap();
        let topology = TopologyBundle::unzip(&paths.input_top_zip_path, stage.scratch()).unwrap();
        let command = block.command(&mut stage, &topology).unwrap();

        assert_eq!(flags_after_topology(&command), vec!["-neutral"]);
        assert_eq!(command.get_stdin(), Some("Water\n"));
    }

    #[test]
    fn negative_concentration() {
        let dir = TempDir::new().unwrap();
        let mut props = properties(dir.path());
        props.concentration = -0.1;

        assert_eq!(
            Genion::new(setup(dir.path()), props).unwrap_err(),
            ConfigError::InvalidValue("concentration".to_owned(), "-0.1".to_owned())
        );
    }

    #[cfg(unix)]
    #[test]
    fn launch() {
        let dir = TempDir::new().unwrap();
        let paths = setup(dir.path());

        let mut props = properties(dir.path());
        props.gmx.gmx_path = fake_gmx(dir.path(), "2019.6", 0);

        assert_eq!(genion(paths.clone(), props), Ok(0));
        assert!(paths.output_gro_path.is_file());
        assert_eq!(fake_gmx_stdin(dir.path()), "SOL\n");

        let extracted = dir.path().join("extracted");
        std::fs::create_dir(&extracted).unwrap();
        let top = unzip_top(&paths.output_top_zip_path, &extracted).unwrap();
        let content = std::fs::read_to_string(top).unwrap();
        assert!(content.ends_with("; modified by fake gmx\n"));
        assert!(extracted.join("posre.itp").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn launch_failure_keeps_no_topology() {
        let dir = TempDir::new().unwrap();
        let paths = setup(dir.path());

        let mut props = properties(dir.path());
        props.gmx.gmx_path = fake_gmx(dir.path(), "2019.6", 1);

        assert_eq!(genion(paths.clone(), props), Ok(1));
        assert!(!paths.output_top_zip_path.exists());
    }
}
