// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Implementation of functions for reading and writing top and itp files.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::errors::TopologyError;
use crate::structures::topology::Topology;

/// ## Methods for reading and writing topology files.
impl Topology {
    /// Read a topology (top or itp) file.
    ///
    /// ## Returns
    /// `Topology` if the file could be read. `TopologyError::FileNotFound` if the file
    /// could not be opened, `TopologyError::CouldNotRead` if it is not a valid text file.
    /// An empty file produces an empty topology.
    pub fn from_file(filename: impl AsRef<Path>) -> Result<Topology, TopologyError> {
        let mut file = File::open(filename.as_ref())
            .map_err(|_| TopologyError::FileNotFound(Box::from(filename.as_ref())))?;

        let mut text = String::new();
        file.read_to_string(&mut text)
            .map_err(|_| TopologyError::CouldNotRead(Box::from(filename.as_ref())))?;

        Ok(Topology::from_text(&text))
    }

    /// Write the topology into a file.
    /// Overwrites the contents of any previously existing file with the same `filename`.
    pub fn write_file(&self, filename: impl AsRef<Path>) -> Result<(), TopologyError> {
        let file = File::create(filename.as_ref())
            .map_err(|_| TopologyError::CouldNotWrite(Box::from(filename.as_ref())))?;

        let mut writer = BufWriter::new(file);
        for line in self.lines() {
            write!(writer, "{}", line.raw())
                .map_err(|_| TopologyError::CouldNotWrite(Box::from(filename.as_ref())))?;
        }

        writer
            .flush()
            .map_err(|_| TopologyError::CouldNotWrite(Box::from(filename.as_ref())))
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
