// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Wrapper of `gmx select` optionally appending the groups of the input index file
//! to the created index file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::blocks::select::{select_command, validate_selection, SelectPaths, DEFAULT_SELECTION};
use crate::config::{GmxProperties, Properties, StepProperties};
use crate::errors::{BlockError, ConfigError, ParseNdxError, StageError};
use crate::runner::block::{ensure_gmx_version, execute, BuildingBlock};
use crate::runner::stage::Stage;

/// Properties of the [`GmxSelect`] building block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GmxSelectProperties {
    pub selection: String,
    /// Append the groups of the input index file to the output index file.
    pub append: bool,
    #[serde(flatten)]
    pub gmx: GmxProperties,
    #[serde(flatten)]
    pub step: StepProperties,
}

impl Default for GmxSelectProperties {
    fn default() -> Self {
        GmxSelectProperties {
            selection: DEFAULT_SELECTION.to_owned(),
            append: false,
            gmx: GmxProperties::default(),
            step: StepProperties::default(),
        }
    }
}

impl Properties for GmxSelectProperties {
    const KEYS: &'static [&'static str] = &["selection", "append"];

    fn validate(&self) -> Result<(), ConfigError> {
        validate_selection(&self.selection)
    }
}

/// Selects atoms and merges them with an existing index file.
#[derive(Debug, Clone)]
pub struct GmxSelect {
    paths: SelectPaths,
    properties: GmxSelectProperties,
}

impl GmxSelect {
    pub fn new(paths: SelectPaths, properties: GmxSelectProperties) -> Result<Self, ConfigError> {
        properties.validate()?;
        paths.check()?;

        if properties.append && paths.input_ndx_path.is_none() {
            log::warn!("Nothing to append: input index file was not provided.");
        }

        Ok(GmxSelect { paths, properties })
    }

    /// Append the content of `input` to `output` separated by an empty line.
    fn append_ndx(input: &Path, output: &Path) -> Result<(), BlockError> {
        let content = std::fs::read_to_string(input)
            .map_err(|_| ParseNdxError::FileNotFound(Box::from(input)))?;

        let error = || StageError::CouldNotWrite(Box::from(output));

        let mut file = OpenOptions::new()
            .append(true)
            .open(output)
            .map_err(|_| error())?;

        write!(file, "\n{}", content).map_err(|_| error())?;
        Ok(())
    }
}

impl BuildingBlock for GmxSelect {
    const NAME: &'static str = "GmxSelect";

    fn step(&self) -> &StepProperties {
        &self.properties.step
    }

    fn output_paths(&self) -> Vec<&Path> {
        vec![self.paths.output_ndx_path.as_path()]
    }

    fn run(&mut self) -> Result<i32, BlockError> {
        let gmx = &self.properties.gmx;
        ensure_gmx_version(gmx, Self::NAME)?;

        let mut stage = Stage::new(gmx, &self.properties.step)?;
        let command = select_command(&self.paths, &self.properties.selection, gmx, &mut stage)?;
        let code = execute(command, gmx, &self.properties.step, &stage)?;
        stage.finish();

        if code == 0 && self.properties.append {
            if let Some(input) = &self.paths.input_ndx_path {
                log::info!("Appending groups from '{}'.", input.display());
                GmxSelect::append_ndx(input, &self.paths.output_ndx_path)?;
            }
        }

        Ok(code)
    }
}

/// Select atoms using `gmx select`, optionally appending the groups of the input index file.
pub fn gmxselect(paths: SelectPaths, properties: GmxSelectProperties) -> Result<i32, BlockError> {
    GmxSelect::new(paths, properties)?.launch()
}
