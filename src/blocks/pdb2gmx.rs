// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Wrapper of `gmx pdb2gmx` creating a topology from a structure.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::auxiliary::file_name;
use crate::config::{check_allowed, GmxProperties, Properties, StepProperties};
use crate::errors::{BlockError, ConfigError};
use crate::files::FileType;
use crate::io::zip_io::zip_top;
use crate::runner::block::{ensure_gmx_version, execute, gmx_command, BuildingBlock};
use crate::runner::command::GmxCommand;
use crate::runner::stage::Stage;

/// Water models accepted by `gmx pdb2gmx`.
pub const WATER_TYPES: &[&str] = &["none", "spc", "spce", "tip3p", "tip4p", "tip5p", "tips3p"];

/// Properties of the [`Pdb2gmx`] building block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pdb2gmxProperties {
    pub water_type: String,
    pub force_field: String,
    /// Ignore hydrogen atoms of the input structure.
    pub ignh: bool,
    /// Name of the top file inside the output archive.
    pub output_top_path: String,
    /// Name of the position restraint file inside the output archive.
    pub output_itp_path: String,
    #[serde(flatten)]
    pub gmx: GmxProperties,
    #[serde(flatten)]
    pub step: StepProperties,
}

impl Default for Pdb2gmxProperties {
    fn default() -> Self {
        Pdb2gmxProperties {
            water_type: "spce".to_owned(),
            force_field: "amber99sb-ildn".to_owned(),
            ignh: false,
            output_top_path: "p2g.top".to_owned(),
            output_itp_path: "p2g.itp".to_owned(),
            gmx: GmxProperties::default(),
            step: StepProperties::default(),
        }
    }
}

impl Properties for Pdb2gmxProperties {
    const KEYS: &'static [&'static str] = &[
        "water_type",
        "force_field",
        "ignh",
        "output_top_path",
        "output_itp_path",
    ];

    fn validate(&self) -> Result<(), ConfigError> {
        check_allowed("water_type", &self.water_type, WATER_TYPES)?;

        if self.force_field.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "force_field".to_owned(),
                self.force_field.clone(),
            ));
        }

        FileType::check(&self.output_top_path, &[FileType::TOP])?;
        FileType::check(&self.output_itp_path, &[FileType::ITP])?;
        Ok(())
    }
}

/// Creates a topology of a protein.
#[derive(Debug, Clone)]
pub struct Pdb2gmx {
    input_pdb_path: PathBuf,
    output_gro_path: PathBuf,
    output_top_zip_path: PathBuf,
    properties: Pdb2gmxProperties,
}

impl Pdb2gmx {
    pub fn new(
        input_pdb_path: impl AsRef<Path>,
        output_gro_path: impl AsRef<Path>,
        output_top_zip_path: impl AsRef<Path>,
        properties: Pdb2gmxProperties,
    ) -> Result<Self, ConfigError> {
        properties.validate()?;
        FileType::check(&input_pdb_path, &[FileType::PDB, FileType::GRO])?;
        FileType::check(&output_gro_path, &[FileType::GRO, FileType::PDB])?;
        FileType::check(&output_top_zip_path, &[FileType::ZIP])?;

        Ok(Pdb2gmx {
            input_pdb_path: input_pdb_path.as_ref().to_path_buf(),
            output_gro_path: output_gro_path.as_ref().to_path_buf(),
            output_top_zip_path: output_top_zip_path.as_ref().to_path_buf(),
            properties,
        })
    }

    /// Path to the created top file inside the scratch directory.
    fn top_path(&self, stage: &Stage) -> PathBuf {
        stage.scratch().join(file_name(&self.properties.output_top_path))
    }

    /// Construct the `gmx pdb2gmx` command. All topology files are written
    /// into the scratch directory.
    fn command(&self, stage: &mut Stage) -> Result<GmxCommand, BlockError> {
        let props = &self.properties;
        let top = self.top_path(stage);
        let itp = stage.scratch().join(file_name(&props.output_itp_path));

        let mut command = gmx_command(&props.gmx, "pdb2gmx")?;
        command
            .option("-f", stage.input(&self.input_pdb_path)?)
            .option("-o", stage.output(&self.output_gro_path)?)
            .option("-p", stage.internal(&top)?)
            .option("-water", &props.water_type)
            .option("-ff", &props.force_field)
            .option("-i", stage.internal(&itp)?);

        if props.ignh {
            command.arg("-ignh");
        }

        // chain topologies are written into the working directory
        command.current_dir(stage.scratch());

        Ok(command)
    }
}

impl BuildingBlock for Pdb2gmx {
    const NAME: &'static str = "Pdb2gmx";

    fn step(&self) -> &StepProperties {
        &self.properties.step
    }

    fn output_paths(&self) -> Vec<&Path> {
        vec![
            self.output_gro_path.as_path(),
            self.output_top_zip_path.as_path(),
        ]
    }

    fn run(&mut self) -> Result<i32, BlockError> {
        let gmx = &self.properties.gmx;
        ensure_gmx_version(gmx, Self::NAME)?;

        let mut stage = Stage::new(gmx, &self.properties.step)?;
        let command = self.command(&mut stage)?;
        let code = execute(command, gmx, &self.properties.step, &stage)?;

        if code == 0 {
            zip_top(self.top_path(&stage), &self.output_top_zip_path)?;
        }

        stage.finish();
        Ok(code)
    }
}

/// Create a topology of the structure in `input_pdb_path` using `gmx pdb2gmx`.
pub fn pdb2gmx(
    input_pdb_path: impl AsRef<Path>,
    output_gro_path: impl AsRef<Path>,
    output_top_zip_path: impl AsRef<Path>,
    properties: Pdb2gmxProperties,
) -> Result<i32, BlockError> {
    Pdb2gmx::new(input_pdb_path, output_gro_path, output_top_zip_path, properties)?.launch()
}

/******************************/
/*         UNIT TESTS         */
/******************************/
