// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Error types returned by the `gmxbb` building blocks.

use std::path::Path;
use thiserror::Error;

/// Errors that can occur when reading or validating the properties of a building block.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Could not read configuration file `{0}`.")]
    CouldNotRead(Box<Path>),
    #[error("Could not parse configuration: {0}")]
    ParseErr(String),
    #[error("Configuration must be a mapping of properties.")]
    NotAMapping,
    #[error("Invalid value `{1}` of property `{0}`.")]
    InvalidValue(String, String),
    #[error("Property `{0}` is required but was not provided.")]
    MissingProperty(String),
    #[error("Container executable `{0}` is neither docker nor singularity.")]
    UnknownContainer(String),
    #[error("Required file path `{0}` was not provided.")]
    MissingPath(String),
    #[error("File `{0}` has an unsupported format.")]
    UnsupportedFormat(Box<Path>),
}

/// Errors that can occur when checking the version of the installed Gromacs.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GmxVersionError {
    #[error("Gromacs version should be {required} or newer, {detected} detected.")]
    TooOld { detected: u32, required: u32 },
}

/// Errors that can occur when running an external command.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("Command `{0}` is empty.")]
    EmptyCommand(String),
    #[error("Could not spawn process `{0}`.")]
    CouldNotSpawn(String),
    #[error("Could not communicate with process `{0}`.")]
    CouldNotCommunicate(String),
    #[error("Could not write into log file `{0}`.")]
    CouldNotWriteLog(Box<Path>),
}

/// Errors that can occur when staging files for a building block.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StageError {
    #[error("Input file `{0}` was not found.")]
    FileNotFound(Box<Path>),
    #[error("Could not create directory `{0}`.")]
    CouldNotCreateDir(Box<Path>),
    #[error("Could not copy `{0}`.")]
    CouldNotCopy(Box<Path>),
    #[error("Could not resolve path `{0}`.")]
    InvalidPath(Box<Path>),
    #[error("Could not write file `{0}`.")]
    CouldNotWrite(Box<Path>),
}

/// Errors that can occur when packing or unpacking a topology zip archive.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ArchiveError {
    #[error("Archive `{0}` was not found.")]
    FileNotFound(Box<Path>),
    #[error("Could not read archive `{0}`.")]
    CouldNotRead(Box<Path>),
    #[error("Could not extract `{1}` from archive `{0}`.")]
    CouldNotExtract(Box<Path>, String),
    #[error("Archive `{0}` contains no top file.")]
    NoTopFile(Box<Path>),
    #[error("Archive `{0}` contains more than one top file.")]
    MultipleTopFiles(Box<Path>),
    #[error("Could not create archive `{0}`.")]
    CouldNotCreate(Box<Path>),
    #[error("Could not write `{1}` into archive `{0}`.")]
    CouldNotWrite(Box<Path>, String),
}

/// Errors that can occur when reading and parsing ndx file.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseNdxError {
    #[error("File `{0}` was not found.")]
    FileNotFound(Box<Path>),
    #[error("File `{0}` ended unexpectedly.")]
    LineNotFound(Box<Path>),
    #[error("Could not parse line `{0}` as group name.")]
    ParseGroupNameErr(String),
    #[error("Could not parse line `{0}`.")]
    ParseLineErr(String),
    #[error("The ndx file contains multiple groups named `{0}`.")]
    GroupsShareName(String),
}

/// Errors that can occur when writing an ndx file.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WriteNdxError {
    #[error("File `{0}` could not be created.")]
    CouldNotCreate(Box<Path>),
    #[error("Could not write line into file.")]
    CouldNotWrite,
}

/// Errors that can occur when mapping restrained atoms onto a reference group.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RestraintMappingError {
    #[error("Group `{0}` does not exist in the ndx file.")]
    GroupNotFound(String),
    #[error("Atom `{atom}` of restrain group `{restrain}` is not part of reference group `{reference}`.")]
    AtomNotInReference {
        atom: usize,
        restrain: String,
        reference: String,
    },
    #[error("Could not parse `{0}` as a (reference, restrain, chain) triplet.")]
    InvalidTriplet(String),
    #[error("No (reference, restrain, chain) triplets were provided.")]
    NoTriplets,
    #[error("Could not parse `{0}` as force constants.")]
    InvalidForceConstants(String),
}

/// Errors that can occur when reading, editing or writing topology files.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TopologyError {
    #[error("File `{0}` was not found.")]
    FileNotFound(Box<Path>),
    #[error("File `{0}` could not be read as text.")]
    CouldNotRead(Box<Path>),
    #[error("Could not write file `{0}`.")]
    CouldNotWrite(Box<Path>),
    #[error("Topology file `{0}` is empty.")]
    EmptyTopology(Box<Path>),
    #[error("Topology file `{0}` does not include any `forcefield.itp`.")]
    ForceFieldIncludeNotFound(Box<Path>),
    #[error("Could not find the name of the molecule type in `{0}`.")]
    MoleculeTypeNotFound(Box<Path>),
    #[error("Topology file `{0}` contains no `#ifdef POSRES` include.")]
    PosresIncludeNotFound(Box<Path>),
    #[error("No itp file for chain `{0}` was found in the topology.")]
    ChainItpNotFound(String),
}

/// Errors that can occur when reading or writing an mdp file.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MdpError {
    #[error("File `{0}` was not found.")]
    FileNotFound(Box<Path>),
    #[error("Could not write file `{0}`.")]
    CouldNotWrite(Box<Path>),
}

/// Any error that can stop a building block.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BlockError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Version(#[from] GmxVersionError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error(transparent)]
    Stage(#[from] StageError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Ndx(#[from] ParseNdxError),
    #[error(transparent)]
    Restraint(#[from] RestraintMappingError),
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error(transparent)]
    Mdp(#[from] MdpError),
}
