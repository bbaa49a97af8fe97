// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Enum capturing file types handled by the `gmxbb` building blocks.

use std::path::Path;

use crate::errors::ConfigError;

/// Types of files handled by `gmxbb`.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum FileType {
    Unknown,
    GRO,
    PDB,
    TPR,
    NDX,
    TOP,
    ITP,
    MDP,
    ZIP,
    XTC,
    TRR,
    EDR,
    LOG,
    CPT,
    XVG,
}

impl FileType {
    /// Identify file type from the name of the file (based on file extension).
    pub fn from_name(filename: impl AsRef<Path>) -> FileType {
        let extension = match filename.as_ref().extension() {
            Some(x) => x,
            None => return FileType::Unknown,
        };

        match extension.to_str() {
            Some("gro") => FileType::GRO,
            Some("pdb") => FileType::PDB,
            Some("tpr") => FileType::TPR,
            Some("ndx") => FileType::NDX,
            Some("top") => FileType::TOP,
            Some("itp") => FileType::ITP,
            Some("mdp") => FileType::MDP,
            Some("zip") => FileType::ZIP,
            Some("xtc") => FileType::XTC,
            Some("trr") => FileType::TRR,
            Some("edr") => FileType::EDR,
            Some("log") => FileType::LOG,
            Some("cpt") => FileType::CPT,
            Some("xvg") => FileType::XVG,
            Some(_) | None => FileType::Unknown,
        }
    }

    /// Check that the file is of one of the `accepted` types.
    ///
    /// ## Returns
    /// `Ok` if the extension of the file matches, else `ConfigError::UnsupportedFormat`.
    pub fn check(filename: impl AsRef<Path>, accepted: &[FileType]) -> Result<(), ConfigError> {
        if accepted.contains(&FileType::from_name(filename.as_ref())) {
            Ok(())
        } else {
            Err(ConfigError::UnsupportedFormat(Box::from(filename.as_ref())))
        }
    }
}

/// Structure formats accepted by most Gromacs tools.
pub(crate) const STRUCTURE_FORMATS: &[FileType] = &[FileType::GRO, FileType::PDB, FileType::TPR];

/// Trajectory formats accepted by Gromacs analysis tools.
pub(crate) const TRAJECTORY_FORMATS: &[FileType] = &[
    FileType::XTC,
    FileType::TRR,
    FileType::GRO,
    FileType::PDB,
];
