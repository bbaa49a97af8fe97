// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Implementation of functions for reading and writing ndx files.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::errors::{ParseNdxError, WriteNdxError};
use crate::structures::index::IndexFile;

/// ## Methods for reading and writing ndx files.
impl IndexFile {
    /// Read an ndx file and construct an `IndexFile`.
    ///
    /// ## Returns
    /// - `Ok(IndexFile)` if the parsing is successful.
    /// - `ParseNdxError::GroupsShareName` if the ndx file contains two groups with the same name.
    /// - Other `ParseNdxError` errors if the file does not exist or parsing failed.
    ///
    /// ## Notes
    /// - The indices in an ndx file are global 1-based atom numbers as used by gromacs.
    /// - Atom numbers are kept in the same order as in the file. Duplicates are kept.
    /// - Empty lines are skipped.
    /// - Atom numbers provided before the first group name are ignored.
    pub fn from_ndx(filename: impl AsRef<Path>) -> Result<IndexFile, ParseNdxError> {
        let file = match File::open(filename.as_ref()) {
            Ok(x) => x,
            Err(_) => return Err(ParseNdxError::FileNotFound(Box::from(filename.as_ref()))),
        };

        let buffer = BufReader::new(file);
        let mut index = IndexFile::new();

        let mut current_name = "".to_string();
        let mut atom_indices = Vec::new();

        for raw_line in buffer.lines() {
            let line = match raw_line {
                Ok(x) => x,
                Err(_) => return Err(ParseNdxError::LineNotFound(Box::from(filename.as_ref()))),
            };

            // skip empty lines
            if line.trim().is_empty() {
                continue;
            }

            // read ndx group name
            if line.contains('[') && line.contains(']') {
                // store previously loaded group
                if !current_name.is_empty() {
                    index.add_group(&current_name, atom_indices)?;
                }
                atom_indices = Vec::new();

                // read next group name
                current_name = parse_group_name(&line)?;

            // read standard line
            } else {
                atom_indices.extend(parse_ndx_line(&line)?);
            }
        }

        // load the last group
        if !current_name.is_empty() {
            index.add_group(&current_name, atom_indices)?;
        }

        Ok(index)
    }

    /// Write the groups of the `IndexFile` into an ndx file.
    ///
    /// ## Returns
    /// `Ok` if writing is successful, else `WriteNdxError`.
    ///
    /// ## Notes
    /// - Overwrites the contents of any previously existing file with the same `filename`.
    /// - Atom numbers are written 15 per line, as gromacs does.
    pub fn write_ndx(&self, filename: impl AsRef<Path>) -> Result<(), WriteNdxError> {
        let output = match File::create(&filename) {
            Ok(x) => x,
            Err(_) => return Err(WriteNdxError::CouldNotCreate(Box::from(filename.as_ref()))),
        };

        let mut writer = BufWriter::new(output);

        for (name, atoms) in self.iter() {
            write_group(&mut writer, name, atoms)?;
        }

        writer.flush().map_err(|_| WriteNdxError::CouldNotWrite)?;

        Ok(())
    }
}

/// Write a single ndx group into the stream.
fn write_group(stream: &mut impl Write, name: &str, atoms: &[usize]) -> Result<(), WriteNdxError> {
    writeln!(stream, "[ {} ]", name).map_err(|_| WriteNdxError::CouldNotWrite)?;

    for (iterator, index) in atoms.iter().enumerate() {
        if (iterator + 1) % 15 == 0 || iterator + 1 == atoms.len() {
            writeln!(stream, "{:4}", index).map_err(|_| WriteNdxError::CouldNotWrite)?;
        } else {
            write!(stream, "{:4} ", index).map_err(|_| WriteNdxError::CouldNotWrite)?;
        }
    }

    Ok(())
}

/// Parse a line of an ndx file as a group name.
fn parse_group_name(line: &str) -> Result<String, ParseNdxError> {
    let name = line.replace(['[', ']'], "").trim().to_string();

    if name.is_empty() {
        Err(ParseNdxError::ParseGroupNameErr(line.to_string()))
    } else {
        Ok(name)
    }
}

/// Parse a line of an ndx file as gmx atom numbers.
fn parse_ndx_line(line: &str) -> Result<Vec<usize>, ParseNdxError> {
    line.split_whitespace()
        .map(|raw_id| match raw_id.parse::<usize>() {
            Ok(0) | Err(_) => Err(ParseNdxError::ParseLineErr(line.to_string())),
            Ok(x) => Ok(x),
        })
        .collect()
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests_read_ndx {
    use super::*;

    #[test]
    fn read() {
        let index = IndexFile::from_ndx("test_files/ndx2resttop.ndx").unwrap();

        assert_eq!(index.get_n_groups(), 6);

        assert_eq!(index.get_group("System").unwrap().len(), 20);
        assert_eq!(index.get_group("Chain_A").unwrap(), &[5, 6, 7, 8]);
        assert_eq!(index.get_group("Chain_A_noMut").unwrap(), &[6, 7]);
        assert_eq!(
            index.get_group("Chain_B").unwrap(),
            &[9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20]
        );
        assert_eq!(index.get_group("Chain_B_noMut").unwrap(), &[10, 12, 19, 20]);
        assert_eq!(index.get_group("Ligand").unwrap(), &[1, 2, 3, 4]);
    }

    #[test]
    fn read_order_preserved() {
        let index = IndexFile::from_ndx("test_files/index_shuffled.ndx").unwrap();

        assert_eq!(index.get_group("Shuffled").unwrap(), &[8, 3, 5, 1, 3]);
    }

    #[test]
    fn read_empty() {
        let index = IndexFile::from_ndx("test_files/index_empty.ndx").unwrap();
        assert_eq!(index.get_n_groups(), 0);
    }

    #[test]
    fn read_empty_lines() {
        let index = IndexFile::from_ndx("test_files/index_empty_lines.ndx").unwrap();

        assert_eq!(index.get_n_groups(), 2);
        assert_eq!(index.get_group("System").unwrap().len(), 20);
        assert_eq!(index.get_group("Protein").unwrap().len(), 16);
    }

    #[test]
    fn read_multiword_group() {
        let index = IndexFile::from_ndx("test_files/index_multiword_group.ndx").unwrap();

        assert!(index.group_exists("Protein Named Buforin II P11L"));
        assert_eq!(
            index
                .get_group("Protein Named Buforin II P11L")
                .unwrap()
                .len(),
            16
        );
    }

    macro_rules! read_ndx_fails {
        ($name:ident, $file:expr, $variant:path, $expected:expr) => {
            #[test]
            fn $name() {
                match IndexFile::from_ndx($file) {
                    Err($variant(e)) => assert_eq!(e, $expected),
                    Ok(_) => panic!("Parsing should have failed, but it succeeded."),
                    Err(e) => panic!("Parsing successfully failed but incorrect error type `{:?}` was returned.", e),
                }
            }
        };
    }

    read_ndx_fails!(
        read_nonexistent,
        "nonexistent.ndx",
        ParseNdxError::FileNotFound,
        Box::from(Path::new("nonexistent.ndx"))
    );

    read_ndx_fails!(
        read_name_invalid,
        "test_files/index_invalid_name.ndx",
        ParseNdxError::ParseGroupNameErr,
        "[   ] "
    );

    read_ndx_fails!(
        read_invalid_line,
        "test_files/index_invalid_line.ndx",
        ParseNdxError::ParseLineErr,
        "  16   17   18   -19   20"
    );

    read_ndx_fails!(
        read_zero_index,
        "test_files/index_zero.ndx",
        ParseNdxError::ParseLineErr,
        "   0    1    2"
    );

    read_ndx_fails!(
        read_duplicate_groups,
        "test_files/index_duplicate_groups.ndx",
        ParseNdxError::GroupsShareName,
        "Protein"
    );
}

#[cfg(test)]
mod tests_write_ndx {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn write() {
        let index = IndexFile::from_ndx("test_files/ndx2resttop.ndx").unwrap();

        let ndx_output = NamedTempFile::new().unwrap();
        let path_to_output = ndx_output.path();

        if index.write_ndx(path_to_output).is_err() {
            panic!("Writing ndx file failed.");
        }

        let mut result = File::open(path_to_output).unwrap();
        let mut expected = File::open("test_files/ndx2resttop.ndx").unwrap();

        assert!(file_diff::diff_files(&mut result, &mut expected));
    }

    #[test]
    fn write_and_read() {
        let mut index = IndexFile::new();
        index.add_group("Long", (1..=40).collect()).unwrap();
        index.add_group("Empty", vec![]).unwrap();
        index.add_group("Short", vec![7, 3]).unwrap();

        let ndx_output = NamedTempFile::new().unwrap();
        index.write_ndx(ndx_output.path()).unwrap();

        let read = IndexFile::from_ndx(ndx_output.path()).unwrap();
        assert_eq!(read, index);
    }

    #[test]
    fn write_fails() {
        let index = IndexFile::from_ndx("test_files/ndx2resttop.ndx").unwrap();

        match index.write_ndx("Xhfguiedhqueiowhd/nonexistent.ndx") {
            Err(WriteNdxError::CouldNotCreate(e)) => {
                assert_eq!(e, Box::from(Path::new("Xhfguiedhqueiowhd/nonexistent.ndx")))
            }
            Ok(_) => panic!("Writing should have failed, but it did not."),
            Err(e) => panic!("Incorrect error type `{:?}` was returned.", e),
        }
    }
}
