// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Implementation of functions for reading, writing and creating mdp files.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use regex::Regex;

use crate::errors::MdpError;
use crate::structures::mdp::{MdpParameters, SimulationType};

/// ## Methods for reading and writing mdp files.
impl MdpParameters {
    /// Read parameters from an mdp file.
    ///
    /// ## Notes
    /// - Lines starting with `;` and lines without `=` are skipped.
    /// - Trailing comments are removed from the values.
    pub fn from_mdp(filename: impl AsRef<Path>) -> Result<MdpParameters, MdpError> {
        let file = File::open(filename.as_ref())
            .map_err(|_| MdpError::FileNotFound(Box::from(filename.as_ref())))?;

        let regex = Regex::new(
            r"^\s*(?P<parameter>[^=;]+?)\s*=\s*(?P<value>[^;]*?)\s*(?P<comment>;.*)?$",
        )
        .expect("FATAL GMXBB ERROR | mdp_io::from_mdp | Could not construct regular expression.");

        let mut mdp = MdpParameters::new();
        for raw_line in BufReader::new(file).lines() {
            let line = raw_line.map_err(|_| MdpError::FileNotFound(Box::from(filename.as_ref())))?;

            if line.trim_start().starts_with(';') {
                continue;
            }

            if let Some(captures) = regex.captures(&line) {
                mdp.set(&captures["parameter"], &captures["value"]);
            }
        }

        Ok(mdp)
    }

    /// Write the parameters into an mdp file as `key = value` lines.
    pub fn write_mdp(&self, filename: impl AsRef<Path>) -> Result<(), MdpError> {
        let error = || MdpError::CouldNotWrite(Box::from(filename.as_ref()));

        let file = File::create(filename.as_ref()).map_err(|_| error())?;
        let mut writer = BufWriter::new(file);

        for (key, value) in self.iter() {
            writeln!(writer, "{} = {}", key, value).map_err(|_| error())?;
        }

        writer.flush().map_err(|_| error())
    }
}

/// Create an mdp file by merging (in order of increasing priority)
/// the preset for the `simulation` type, the parameters from the `input` mdp file
/// and the `overrides`.
pub fn create_mdp(
    output: impl AsRef<Path>,
    input: Option<&Path>,
    simulation: Option<SimulationType>,
    overrides: &MdpParameters,
) -> Result<MdpParameters, MdpError> {
    let mut mdp = MdpParameters::preset(simulation);

    if let Some(input) = input {
        mdp.merge(&MdpParameters::from_mdp(input)?);
    }

    mdp.merge(overrides);

    log::debug!(
        "Writing {} mdp parameters into '{}'.",
        mdp.len(),
        output.as_ref().display()
    );
    mdp.write_mdp(output)?;
    Ok(mdp)
}

/******************************/
/*         UNIT TESTS         */
/******************************/
