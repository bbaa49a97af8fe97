// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Generating position restraints from index groups and including them into chain topologies.
//!
//! For every `(reference, restrain, chain)` triplet, atoms of the `restrain` group are
//! renumbered relative to the `reference` group and written into a new restraint itp file.
//! The file is then included (guarded by `CUSTOM_POSRES`) into all itp files of the `chain`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{Properties, StepProperties};
use crate::errors::{BlockError, ConfigError};
use crate::files::FileType;
use crate::io::itp_io::{append_posres_include, find_chain_itps};
use crate::runner::block::{finish_topology, unpack_topology, BuildingBlock};
use crate::structures::index::IndexFile;
use crate::structures::restraint::{ForceConstants, PositionRestraints, RestraintTriplet};

/// Properties of the [`Ndx2Resttop`] building block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ndx2ResttopProperties {
    /// Force constants of the restraints in the x, y and z dimension.
    pub force_constants: String,
    /// Triplets `( reference, restrain, chain ), ...`.
    pub ref_rest_chain_triplet_list: Option<String>,
    #[serde(flatten)]
    pub step: StepProperties,
}

impl Default for Ndx2ResttopProperties {
    fn default() -> Self {
        Ndx2ResttopProperties {
            force_constants: crate::auxiliary::DEFAULT_FORCE_CONSTANTS.to_owned(),
            ref_rest_chain_triplet_list: None,
            step: StepProperties::default(),
        }
    }
}

impl Properties for Ndx2ResttopProperties {
    const KEYS: &'static [&'static str] = &["force_constants", "ref_rest_chain_triplet_list"];

    fn validate(&self) -> Result<(), ConfigError> {
        self.parse_force_constants()?;
        self.parse_triplets()?;
        Ok(())
    }
}

impl Ndx2ResttopProperties {
    /// Parse the force constants. Exactly three values are required.
    fn parse_force_constants(&self) -> Result<ForceConstants, ConfigError> {
        let invalid = || {
            ConfigError::InvalidValue("force_constants".to_owned(), self.force_constants.clone())
        };

        let fc: ForceConstants = self.force_constants.parse().map_err(|_| invalid())?;
        if !fc.is_per_axis() {
            return Err(invalid());
        }

        Ok(fc)
    }

    fn parse_triplets(&self) -> Result<Vec<RestraintTriplet>, ConfigError> {
        let list = self
            .ref_rest_chain_triplet_list
            .as_deref()
            .ok_or_else(|| ConfigError::MissingProperty("ref_rest_chain_triplet_list".to_owned()))?;

        RestraintTriplet::parse_list(list).map_err(|e| {
            ConfigError::InvalidValue("ref_rest_chain_triplet_list".to_owned(), e.to_string())
        })
    }
}

/// Creates position restraints for chains of a topology from index groups.
#[derive(Debug, Clone)]
pub struct Ndx2Resttop {
    input_ndx_path: PathBuf,
    input_top_zip_path: PathBuf,
    output_top_zip_path: PathBuf,
    properties: Ndx2ResttopProperties,
}

impl Ndx2Resttop {
    pub fn new(
        input_ndx_path: impl AsRef<Path>,
        input_top_zip_path: impl AsRef<Path>,
        output_top_zip_path: impl AsRef<Path>,
        properties: Ndx2ResttopProperties,
    ) -> Result<Self, ConfigError> {
        properties.validate()?;
        FileType::check(&input_ndx_path, &[FileType::NDX])?;
        FileType::check(&input_top_zip_path, &[FileType::ZIP])?;
        FileType::check(&output_top_zip_path, &[FileType::ZIP])?;

        Ok(Ndx2Resttop {
            input_ndx_path: input_ndx_path.as_ref().to_path_buf(),
            input_top_zip_path: input_top_zip_path.as_ref().to_path_buf(),
            output_top_zip_path: output_top_zip_path.as_ref().to_path_buf(),
            properties,
        })
    }
}

impl BuildingBlock for Ndx2Resttop {
    const NAME: &'static str = "Ndx2resttop";

    fn step(&self) -> &StepProperties {
        &self.properties.step
    }

    fn output_paths(&self) -> Vec<&Path> {
        vec![self.output_top_zip_path.as_path()]
    }

    fn run(&mut self) -> Result<i32, BlockError> {
        let step = &self.properties.step;
        let force_constants = self.properties.parse_force_constants()?;
        let triplets = self.properties.parse_triplets()?;

        let index = IndexFile::from_ndx(&self.input_ndx_path)?;
        let topology = unpack_topology(&self.input_top_zip_path, step)?;

        let mut generated: Vec<String> = Vec::with_capacity(triplets.len());
        for triplet in &triplets {
            let restraints =
                PositionRestraints::from_triplet(&index, triplet, force_constants.clone())?;

            let itp_name = step.create_name(&format!("{}.itp", triplet.restrain()));
            restraints.write_itp(topology.dir().join(&itp_name))?;
            log::info!(
                "Restraining {} atoms of group {} relative to group {} in '{}'.",
                restraints.local_indices().len(),
                triplet.restrain(),
                triplet.reference(),
                itp_name
            );
            generated.push(itp_name.clone());

            for chain_itp in find_chain_itps(topology.dir(), triplet.chain(), &generated)? {
                log::info!(
                    "Including '{}' into '{}'.",
                    itp_name,
                    crate::auxiliary::file_name(&chain_itp)
                );
                append_posres_include(&chain_itp, &itp_name)?;
            }
        }

        topology.zip(&self.output_top_zip_path)?;
        finish_topology(topology, step);

        Ok(0)
    }
}

/// Create position restraints from index groups and include them into the chains of a topology.
pub fn ndx2resttop(
    input_ndx_path: impl AsRef<Path>,
    input_top_zip_path: impl AsRef<Path>,
    output_top_zip_path: impl AsRef<Path>,
    properties: Ndx2ResttopProperties,
) -> Result<i32, BlockError> {
    Ndx2Resttop::new(
        input_ndx_path,
        input_top_zip_path,
        output_top_zip_path,
        properties,
    )?
    .launch()
}

/******************************/
/*         UNIT TESTS         */
/******************************/
