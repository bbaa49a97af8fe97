// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Implementation of functions for packing and unpacking topology zip archives.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::auxiliary::file_name;
use crate::errors::ArchiveError;
use crate::files::FileType;

/// Topology archive unpacked into a temporary directory.
///
/// The directory is removed once the bundle is dropped,
/// unless it is kept using [`TopologyBundle::keep`].
#[derive(Debug)]
pub struct TopologyBundle {
    dir: TempDir,
    top: PathBuf,
}

impl TopologyBundle {
    /// Unpack a topology archive into a new temporary directory created inside `parent`.
    ///
    /// ## Returns
    /// - `ArchiveError::NoTopFile` if the archive contains no top file.
    /// - `ArchiveError::MultipleTopFiles` if the archive contains more than one top file.
    /// - Other `ArchiveError` errors if the archive could not be read or extracted.
    ///
    /// ## Notes
    /// - The directory structure of the archive is not kept. All files are extracted
    ///   into the same directory using only their file names.
    pub fn unzip(archive: impl AsRef<Path>, parent: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let dir = tempfile::Builder::new()
            .prefix("gmxbb_top_")
            .tempdir_in(parent.as_ref())
            .map_err(|_| {
                ArchiveError::CouldNotExtract(
                    Box::from(archive.as_ref()),
                    parent.as_ref().display().to_string(),
                )
            })?;

        let top = unzip_top(archive, dir.path())?;
        log::debug!("Topology unpacked into '{}'.", dir.path().display());

        Ok(TopologyBundle { dir, top })
    }

    /// Get the directory containing the unpacked files.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Get the path to the top file.
    pub fn top_path(&self) -> &Path {
        &self.top
    }

    /// Change the name of the top file of the bundle.
    /// The file itself is not created or renamed.
    pub fn set_top_name(&mut self, name: &str) {
        self.top = self.dir.path().join(name);
    }

    /// Pack the top file and all itp files of the bundle into `output`.
    pub fn zip(&self, output: impl AsRef<Path>) -> Result<(), ArchiveError> {
        zip_top(&self.top, output)
    }

    /// Keep the unpacked directory on disk and return its path.
    pub fn keep(self) -> PathBuf {
        self.dir.into_path()
    }
}

/// Extract all files from a topology archive into `dest`.
///
/// ## Returns
/// Path to the extracted top file.
pub fn unzip_top(archive: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<PathBuf, ArchiveError> {
    let archive_path = archive.as_ref();

    let file =
        File::open(archive_path).map_err(|_| ArchiveError::FileNotFound(Box::from(archive_path)))?;
    let mut zip =
        ZipArchive::new(file).map_err(|_| ArchiveError::CouldNotRead(Box::from(archive_path)))?;

    let mut tops = Vec::new();
    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|_| ArchiveError::CouldNotRead(Box::from(archive_path)))?;

        if entry.is_dir() {
            continue;
        }

        let name = match entry.enclosed_name() {
            Some(path) => file_name(path),
            None => {
                log::warn!(
                    "Skipping unsafe archive entry '{}' in '{}'.",
                    entry.name(),
                    archive_path.display()
                );
                continue;
            }
        };

        let extract_error =
            || ArchiveError::CouldNotExtract(Box::from(archive_path), name.clone());

        let mut content = Vec::new();
        entry.read_to_end(&mut content).map_err(|_| extract_error())?;

        let target = dest.as_ref().join(&name);
        std::fs::write(&target, content).map_err(|_| extract_error())?;

        if FileType::from_name(&target) == FileType::TOP {
            tops.push(target);
        }
    }

    match tops.len() {
        0 => Err(ArchiveError::NoTopFile(Box::from(archive_path))),
        1 => Ok(tops.remove(0)),
        _ => Err(ArchiveError::MultipleTopFiles(Box::from(archive_path))),
    }
}

/// Pack a top file together with all itp files from its directory into an archive.
///
/// The top file is written first, followed by the itp files sorted by name.
/// All files are placed at the root of the archive and compressed using deflate.
pub fn zip_top(top: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<(), ArchiveError> {
    let top = top.as_ref();
    let output = output.as_ref();

    let dir = match top.parent() {
        Some(x) if !x.as_os_str().is_empty() => x.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut itps: Vec<PathBuf> = std::fs::read_dir(&dir)
        .map_err(|_| ArchiveError::FileNotFound(Box::from(dir.as_path())))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && FileType::from_name(path) == FileType::ITP)
        .collect();
    itps.sort();

    let file = File::create(output).map_err(|_| ArchiveError::CouldNotCreate(Box::from(output)))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in std::iter::once(top.to_path_buf()).chain(itps) {
        let name = file_name(&path);
        let write_error = || ArchiveError::CouldNotWrite(Box::from(output), name.clone());

        let content = std::fs::read(&path).map_err(|_| write_error())?;
        zip.start_file(name.as_str(), options)
            .map_err(|_| write_error())?;
        zip.write_all(&content).map_err(|_| write_error())?;
    }

    zip.finish()
        .map_err(|_| ArchiveError::CouldNotCreate(Box::from(output)))?;

    log::debug!("Topology '{}' packed into '{}'.", top.display(), output.display());
    Ok(())
}

/******************************/
/*         UNIT TESTS         */
/******************************/
