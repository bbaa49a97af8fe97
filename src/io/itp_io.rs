// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Implementation of functions for writing position restraint itp files
//! and for including them into chain itp files.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::auxiliary::file_name;
use crate::errors::TopologyError;
use crate::structures::restraint::PositionRestraints;

/// Header of a position restraint itp file.
const POSRES_HEADER: &str = "[ position_restraints ]\n; atom  type      fx      fy      fz\n";

/// ## Methods for writing position restraints.
impl PositionRestraints {
    /// Write the position restraints into an itp file.
    ///
    /// Each restrained atom is written as `<local index>     1  <force constants>`.
    /// Overwrites the contents of any previously existing file with the same `filename`.
    pub fn write_itp(&self, filename: impl AsRef<Path>) -> Result<(), TopologyError> {
        let error = || TopologyError::CouldNotWrite(Box::from(filename.as_ref()));

        let file = File::create(filename.as_ref()).map_err(|_| error())?;
        let mut writer = BufWriter::new(file);

        write!(writer, "{}", POSRES_HEADER).map_err(|_| error())?;
        for index in self.local_indices() {
            writeln!(writer, "{}     1  {}", index, self.force_constants()).map_err(|_| error())?;
        }

        writer.flush().map_err(|_| error())
    }
}

/// Find itp files of the chain `chain` in directory `dir`.
///
/// Chain itp files are files named `*_chain_<chain>.itp`. Files starting with `posre`,
/// files ending with `_pr.itp` and files listed in `exclude` are not chain itp files.
/// Paths are returned sorted.
///
/// ## Returns
/// `TopologyError::ChainItpNotFound` if there is no itp file for the chain.
pub fn find_chain_itps(
    dir: impl AsRef<Path>,
    chain: &str,
    exclude: &[String],
) -> Result<Vec<PathBuf>, TopologyError> {
    let suffix = format!("_chain_{}.itp", chain);

    let entries = std::fs::read_dir(dir.as_ref())
        .map_err(|_| TopologyError::FileNotFound(Box::from(dir.as_ref())))?;

    let mut itps: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            let name = file_name(path);
            path.is_file()
                && name.ends_with(&suffix)
                && !name.starts_with("posre")
                && !name.ends_with("_pr.itp")
                && !exclude.contains(&name)
        })
        .collect();

    if itps.is_empty() {
        return Err(TopologyError::ChainItpNotFound(chain.to_owned()));
    }

    itps.sort();
    Ok(itps)
}

/// Append a block including `included` guarded by `#ifdef CUSTOM_POSRES` to the itp file `itp`.
pub fn append_posres_include(itp: impl AsRef<Path>, included: &str) -> Result<(), TopologyError> {
    let error = || TopologyError::CouldNotWrite(Box::from(itp.as_ref()));

    let mut file = OpenOptions::new()
        .append(true)
        .open(itp.as_ref())
        .map_err(|_| error())?;

    write!(
        file,
        "\n; Include Position restraint file\n#ifdef CUSTOM_POSRES\n#include \"{}\"\n#endif\n",
        included
    )
    .map_err(|_| error())
}

/******************************/
/*         UNIT TESTS         */
/******************************/
