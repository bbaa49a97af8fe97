// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Simple, auxiliary functions and constants used through the `gmxbb` library.

use std::path::{Path, PathBuf};

/******************************/
/*         CONSTANTS          */
/******************************/

/// Oldest supported Gromacs version (5.1.2) in the normalized integer form.
pub const MIN_GMX_VERSION: u32 = 512;

/// Default force constants (kJ mol^-1 nm^-2) of position restraints.
pub const DEFAULT_FORCE_CONSTANTS: &str = "500 500 500";

/// Content of a file marking a failed output.
pub(crate) const FAILED_OUTPUT: &str = "Error\n";

/******************************/
/*         FILE NAMES         */
/******************************/

/// Construct the name of a step file by joining `prefix`, `step` and `name` using underscores.
/// Missing or empty parts are skipped.
pub fn create_name(prefix: Option<&str>, step: Option<&str>, name: &str) -> String {
    [prefix, step, Some(name)]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<&str>>()
        .join("_")
}

/// Get the file name of `path` as a `String`.
/// Returns an empty string if `path` terminates in `..`.
pub(crate) fn file_name(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Convert a relative path to an absolute path using the current working directory.
pub(crate) fn absolute(path: impl AsRef<Path>) -> std::io::Result<PathBuf> {
    let path = path.as_ref();
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/******************************/
/*      OUTPUT CHECKING       */
/******************************/

/// Check whether all the files exist and are not empty.
pub fn outputs_complete<P: AsRef<Path>>(paths: &[P]) -> bool {
    paths.iter().all(|path| {
        std::fs::metadata(path.as_ref())
            .map(|meta| meta.is_file() && meta.len() > 0)
            .unwrap_or(false)
    })
}

/// Overwrite the file with a marker signaling that the output could not be produced.
pub fn write_failed_output(path: impl AsRef<Path>) -> std::io::Result<()> {
    std::fs::write(path, FAILED_OUTPUT)
}

/******************************/
/*           OTHER            */
/******************************/

/// Convert `impl AsRef<Path>` to `String` panicking with an error message in case the conversion fails.
#[inline(always)]
pub(crate) fn path2string(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .to_str()
        .expect("FATAL GMXBB ERROR | auxiliary::path2string | Could not convert Path to &str.")
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn create_name_full() {
        assert_eq!(
            create_name(Some("prot"), Some("step1"), "ligand.top"),
            "prot_step1_ligand.top"
        );
    }

    #[test]
    fn create_name_partial() {
        assert_eq!(create_name(None, Some("step1"), "log.out"), "step1_log.out");
        assert_eq!(create_name(Some(""), None, "log.out"), "log.out");
        assert_eq!(create_name(None, None, "Chain_A.itp"), "Chain_A.itp");
    }

    #[test]
    fn file_name_of_path() {
        assert_eq!(file_name("some/dir/topol.top"), "topol.top");
        assert_eq!(file_name("topol.top"), "topol.top");
    }

    #[test]
    fn outputs_complete_missing() {
        let dir = TempDir::new().unwrap();
        let existing = dir.path().join("a.gro");
        std::fs::write(&existing, "content").unwrap();
        let missing = dir.path().join("b.gro");

        assert!(outputs_complete(&[&existing]));
        assert!(!outputs_complete(&[&existing, &missing]));
    }

    #[test]
    fn outputs_complete_empty() {
        let dir = TempDir::new().unwrap();
        let empty = dir.path().join("empty.gro");
        std::fs::write(&empty, "").unwrap();

        assert!(!outputs_complete(&[&empty]));
    }

    #[test]
    fn failed_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("output.zip");
        std::fs::write(&path, "partial content").unwrap();

        write_failed_output(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Error\n");
    }
}
