// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Implementation of the IndexFile structure holding named groups of atom numbers.

use indexmap::IndexMap;

use crate::errors::ParseNdxError;

/// Named groups of atoms as stored in a Gromacs ndx file.
///
/// Atom numbers are global and 1-based (as understood by Gromacs)
/// and are kept in the order in which they were provided.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexFile {
    groups: IndexMap<String, Vec<usize>>,
}

impl IndexFile {
    /// Create a new empty `IndexFile`.
    pub fn new() -> Self {
        IndexFile::default()
    }

    /// Add a new group into the `IndexFile`.
    ///
    /// ## Returns
    /// `Ok` if the group was added. `ParseNdxError::GroupsShareName` if a group with the
    /// same name already exists. In such case, the `IndexFile` is not changed.
    pub fn add_group(&mut self, name: &str, atoms: Vec<usize>) -> Result<(), ParseNdxError> {
        if self.groups.contains_key(name) {
            return Err(ParseNdxError::GroupsShareName(name.to_owned()));
        }

        self.groups.insert(name.to_owned(), atoms);
        Ok(())
    }

    /// Get atom numbers of the group with the given name.
    /// Returns `None` if the group does not exist.
    pub fn get_group(&self, name: &str) -> Option<&[usize]> {
        self.groups.get(name).map(Vec::as_slice)
    }

    /// Check whether a group with the given name exists.
    pub fn group_exists(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// Get the number of groups.
    pub fn get_n_groups(&self) -> usize {
        self.groups.len()
    }

    /// Iterate over the groups in the order in which they were added.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.groups
            .iter()
            .map(|(name, atoms)| (name.as_str(), atoms.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_get() {
        let mut index = IndexFile::new();
        index.add_group("Chain_A", vec![5, 6, 7, 8]).unwrap();
        index.add_group("Chain_A_noMut", vec![7, 6]).unwrap();

        assert_eq!(index.get_n_groups(), 2);
        assert!(index.group_exists("Chain_A"));
        assert_eq!(index.get_group("Chain_A").unwrap(), &[5, 6, 7, 8]);
        assert_eq!(index.get_group("Chain_A_noMut").unwrap(), &[7, 6]);
        assert!(index.get_group("Chain_B").is_none());
    }

    #[test]
    fn add_duplicate() {
        let mut index = IndexFile::new();
        index.add_group("Protein", vec![1, 2]).unwrap();

        match index.add_group("Protein", vec![3]) {
            Err(ParseNdxError::GroupsShareName(e)) => assert_eq!(e, "Protein"),
            Ok(_) => panic!("Adding should have failed, but it succeeded."),
            Err(e) => panic!("Incorrect error type `{:?}` was returned.", e),
        }

        assert_eq!(index.get_group("Protein").unwrap(), &[1, 2]);
    }

    #[test]
    fn iterate_in_order() {
        let mut index = IndexFile::new();
        index.add_group("B", vec![2]).unwrap();
        index.add_group("A", vec![1]).unwrap();

        let names: Vec<&str> = index.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["B", "A"]);
    }
}
