// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Appending a ligand to a topology.
//!
//! The ligand itp file (and optionally its position restraints) is included right
//! after the force field include and one molecule of the ligand is registered
//! in the `[ molecules ]` section after the last protein molecule.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::auxiliary::file_name;
use crate::config::{Properties, StepProperties};
use crate::errors::{BlockError, ConfigError, StageError, TopologyError};
use crate::files::FileType;
use crate::runner::block::{finish_topology, unpack_topology, BuildingBlock};
use crate::structures::topology::Topology;

/// Properties of the [`AppendLigand`] building block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppendLigandProperties {
    /// Name of the define guarding the ligand position restraints.
    pub posres_name: String,
    #[serde(flatten)]
    pub step: StepProperties,
}

impl Default for AppendLigandProperties {
    fn default() -> Self {
        AppendLigandProperties {
            posres_name: "POSRES_LIGAND".to_owned(),
            step: StepProperties::default(),
        }
    }
}

impl Properties for AppendLigandProperties {
    const KEYS: &'static [&'static str] = &["posres_name"];

    fn validate(&self) -> Result<(), ConfigError> {
        let name = self.posres_name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidValue(
                "posres_name".to_owned(),
                self.posres_name.clone(),
            ));
        }

        Ok(())
    }
}

/// Lines including the ligand files into the system topology.
fn include_lines(itp: &str, posres: Option<&str>, posres_name: &str) -> Vec<String> {
    let mut lines = vec![
        "\n".to_owned(),
        "; Including ligand ITP\n".to_owned(),
        format!("#include \"{}\"\n", itp),
        "\n".to_owned(),
    ];

    if let Some(posres) = posres {
        lines.extend([
            "; Ligand position restraints\n".to_owned(),
            format!("#ifdef {}\n", posres_name),
            format!("#include \"{}\"\n", posres),
            "#endif\n".to_owned(),
            "\n".to_owned(),
        ]);
    }

    lines
}

/// Appends a ligand to a zipped topology.
#[derive(Debug, Clone)]
pub struct AppendLigand {
    input_top_zip_path: PathBuf,
    input_itp_path: PathBuf,
    input_posres_itp_path: Option<PathBuf>,
    output_top_zip_path: PathBuf,
    properties: AppendLigandProperties,
}

impl AppendLigand {
    pub fn new(
        input_top_zip_path: impl AsRef<Path>,
        input_itp_path: impl AsRef<Path>,
        input_posres_itp_path: Option<impl AsRef<Path>>,
        output_top_zip_path: impl AsRef<Path>,
        properties: AppendLigandProperties,
    ) -> Result<Self, ConfigError> {
        properties.validate()?;
        FileType::check(&input_top_zip_path, &[FileType::ZIP])?;
        FileType::check(&input_itp_path, &[FileType::ITP])?;
        if let Some(posres) = &input_posres_itp_path {
            FileType::check(posres, &[FileType::ITP])?;
        }
        FileType::check(&output_top_zip_path, &[FileType::ZIP])?;

        Ok(AppendLigand {
            input_top_zip_path: input_top_zip_path.as_ref().to_path_buf(),
            input_itp_path: input_itp_path.as_ref().to_path_buf(),
            input_posres_itp_path: input_posres_itp_path.map(|x| x.as_ref().to_path_buf()),
            output_top_zip_path: output_top_zip_path.as_ref().to_path_buf(),
            properties,
        })
    }

    /// Copy a ligand file into the topology directory.
    fn copy_into(file: &Path, dir: &Path) -> Result<String, StageError> {
        let name = file_name(file);
        std::fs::copy(file, dir.join(&name)).map_err(|_| StageError::CouldNotCopy(Box::from(file)))?;
        Ok(name)
    }
}

impl BuildingBlock for AppendLigand {
    const NAME: &'static str = "AppendLigand";

    fn step(&self) -> &StepProperties {
        &self.properties.step
    }

    fn output_paths(&self) -> Vec<&Path> {
        vec![self.output_top_zip_path.as_path()]
    }

    fn run(&mut self) -> Result<i32, BlockError> {
        let step = &self.properties.step;

        let ligand = Topology::from_file(&self.input_itp_path)?;
        let molecule = ligand
            .moleculetype_name()
            .ok_or_else(|| TopologyError::MoleculeTypeNotFound(Box::from(self.input_itp_path.as_path())))?;

        let mut bundle = unpack_topology(&self.input_top_zip_path, step)?;
        let mut topology = Topology::from_file(bundle.top_path())?;

        if topology.is_empty() {
            log::error!(
                "Topology file '{}' from archive '{}' is empty.",
                file_name(bundle.top_path()),
                self.input_top_zip_path.display()
            );
            return Ok(1);
        }

        let Some(anchor) = topology.find_forcefield_include() else {
            log::error!(
                "Force field include was not found in topology file '{}' from archive '{}'.",
                file_name(bundle.top_path()),
                self.input_top_zip_path.display()
            );
            return Ok(1);
        };

        let itp_name = file_name(&self.input_itp_path);
        if topology.includes().contains(&itp_name.as_str()) {
            log::warn!(
                "Topology file '{}' already includes '{}'. Ligand '{}' will be added again.",
                file_name(bundle.top_path()),
                itp_name,
                molecule
            );
        }

        let itp = Self::copy_into(&self.input_itp_path, bundle.dir())?;
        let posres = self
            .input_posres_itp_path
            .as_deref()
            .map(|path| Self::copy_into(path, bundle.dir()))
            .transpose()?;

        let lines = include_lines(&itp, posres.as_deref(), &self.properties.posres_name);
        topology.insert_lines(
            anchor + 1,
            &lines.iter().map(String::as_str).collect::<Vec<&str>>(),
        );
        topology.add_molecule(&molecule, 1);
        log::info!("Ligand '{}' added to the topology.", molecule);

        let old_top = bundle.top_path().to_path_buf();
        let new_name = step.create_name("ligand.top");
        bundle.set_top_name(&new_name);
        topology.write_file(bundle.top_path())?;

        if old_top != bundle.top_path() {
            std::fs::remove_file(&old_top)
                .map_err(|_| TopologyError::CouldNotWrite(Box::from(old_top.as_path())))?;
        }

        bundle.zip(&self.output_top_zip_path)?;
        finish_topology(bundle, step);

        Ok(0)
    }
}

/// Append a ligand described by `input_itp_path` to the zipped topology `input_top_zip_path`.
pub fn append_ligand(
    input_top_zip_path: impl AsRef<Path>,
    input_itp_path: impl AsRef<Path>,
    input_posres_itp_path: Option<impl AsRef<Path>>,
    output_top_zip_path: impl AsRef<Path>,
    properties: AppendLigandProperties,
) -> Result<i32, BlockError> {
    AppendLigand::new(
        input_top_zip_path,
        input_itp_path,
        input_posres_itp_path,
        output_top_zip_path,
        properties,
    )?
    .launch()
}

/******************************/
/*         UNIT TESTS         */
/******************************/
