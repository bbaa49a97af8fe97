// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Implementation of position restraints mapped from global atom numbering
//! onto the numbering of a reference group.

use std::fmt::Display;
use std::str::FromStr;

use getset::Getters;
use hashbrown::HashMap;

use crate::errors::RestraintMappingError;
use crate::structures::index::IndexFile;

/******************************/
/*      FORCE CONSTANTS       */
/******************************/

/// Force constants of a position restraint.
///
/// The original text is kept as provided so that the written restraints
/// reproduce it exactly. The text must contain one (isotropic) or three
/// (x, y, z) floating point numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceConstants {
    literal: String,
    values: Vec<f64>,
}

impl ForceConstants {
    /// Check whether the force constants specify a separate value for each axis.
    pub fn is_per_axis(&self) -> bool {
        self.values.len() == 3
    }
}

impl FromStr for ForceConstants {
    type Err = RestraintMappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split_whitespace()
            .map(|x| x.parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()
            .map_err(|_| RestraintMappingError::InvalidForceConstants(s.to_owned()))?;

        if values.len() != 1 && values.len() != 3 {
            return Err(RestraintMappingError::InvalidForceConstants(s.to_owned()));
        }

        Ok(ForceConstants {
            literal: s.trim().to_owned(),
            values,
        })
    }
}

impl Display for ForceConstants {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.literal)
    }
}

/******************************/
/*          TRIPLETS          */
/******************************/

/// Reference group, restrain group and chain identifier
/// describing which atoms of which chain should be restrained.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct RestraintTriplet {
    /// Group containing all atoms of the chain.
    #[getset(get = "pub")]
    reference: String,
    /// Group containing the atoms to restrain. Subset of `reference`.
    #[getset(get = "pub")]
    restrain: String,
    /// Identifier of the chain.
    #[getset(get = "pub")]
    chain: String,
}

impl RestraintTriplet {
    pub fn new(reference: &str, restrain: &str, chain: &str) -> Self {
        RestraintTriplet {
            reference: reference.to_owned(),
            restrain: restrain.to_owned(),
            chain: chain.to_owned(),
        }
    }

    /// Parse a list of triplets in the format
    /// `( reference, restrain, chain ), ( reference, restrain, chain ), ...`.
    ///
    /// ## Notes
    /// - Whitespace inside the triplets is ignored.
    /// - Each triplet must consist of exactly three non-empty items.
    pub fn parse_list(string: &str) -> Result<Vec<RestraintTriplet>, RestraintMappingError> {
        if string.trim().is_empty() {
            return Err(RestraintMappingError::NoTriplets);
        }

        string
            .split("),")
            .map(|raw| {
                let cleaned: String = raw
                    .trim_matches(|c: char| c == ' ' || c == '(' || c == ')')
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();

                match cleaned.split(',').collect::<Vec<&str>>().as_slice() {
                    [reference, restrain, chain]
                        if !reference.is_empty() && !restrain.is_empty() && !chain.is_empty() =>
                    {
                        Ok(RestraintTriplet::new(reference, restrain, chain))
                    }
                    _ => Err(RestraintMappingError::InvalidTriplet(raw.trim().to_owned())),
                }
            })
            .collect()
    }
}

/******************************/
/*     POSITION RESTRAINTS    */
/******************************/

/// Position restraints of atoms numbered relative to a reference group.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionRestraints {
    /// 1-based positions of the restrained atoms inside the reference group.
    local_indices: Vec<usize>,
    force_constants: ForceConstants,
}

impl PositionRestraints {
    /// Map the atoms of the `restrain` group onto the numbering of the `reference` group.
    ///
    /// Each restrained atom is assigned its 1-based position in the reference group
    /// (the first position, if the atom is listed multiple times).
    ///
    /// ## Returns
    /// - `RestraintMappingError::AtomNotInReference` if any restrained atom is not part of the reference group.
    pub fn map(
        reference: &[usize],
        restrain: &[usize],
        force_constants: ForceConstants,
    ) -> Result<Self, RestraintMappingError> {
        let mut positions: HashMap<usize, usize> = HashMap::with_capacity(reference.len());
        for (i, &atom) in reference.iter().enumerate() {
            positions.entry(atom).or_insert(i + 1);
        }

        let local_indices = restrain
            .iter()
            .map(|atom| {
                positions
                    .get(atom)
                    .copied()
                    .ok_or(RestraintMappingError::AtomNotInReference {
                        atom: *atom,
                        restrain: String::new(),
                        reference: String::new(),
                    })
            })
            .collect::<Result<Vec<usize>, _>>()?;

        Ok(PositionRestraints {
            local_indices,
            force_constants,
        })
    }

    /// Construct position restraints for the groups named in `triplet`.
    ///
    /// ## Returns
    /// - `RestraintMappingError::GroupNotFound` if any of the groups does not exist.
    /// - `RestraintMappingError::AtomNotInReference` if the restrain group is not a subset of the reference group.
    pub fn from_triplet(
        index: &IndexFile,
        triplet: &RestraintTriplet,
        force_constants: ForceConstants,
    ) -> Result<Self, RestraintMappingError> {
        let reference = index
            .get_group(triplet.reference())
            .ok_or_else(|| RestraintMappingError::GroupNotFound(triplet.reference().clone()))?;
        let restrain = index
            .get_group(triplet.restrain())
            .ok_or_else(|| RestraintMappingError::GroupNotFound(triplet.restrain().clone()))?;

        PositionRestraints::map(reference, restrain, force_constants).map_err(|e| match e {
            RestraintMappingError::AtomNotInReference { atom, .. } => {
                RestraintMappingError::AtomNotInReference {
                    atom,
                    restrain: triplet.restrain().clone(),
                    reference: triplet.reference().clone(),
                }
            }
            other => other,
        })
    }

    /// Get the local (reference-relative) indices of the restrained atoms.
    pub fn local_indices(&self) -> &[usize] {
        &self.local_indices
    }

    /// Get the force constants of the restraints.
    pub fn force_constants(&self) -> &ForceConstants {
        &self.force_constants
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rand::seq::SliceRandom;
    use rand::Rng;

    fn fc() -> ForceConstants {
        "500 500 500".parse().unwrap()
    }

    #[test]
    fn force_constants_three() {
        let fc: ForceConstants = " 1000 500.5  250 ".parse().unwrap();
        assert!(fc.is_per_axis());
        assert_approx_eq!(f64, fc.values[0], 1000.0);
        assert_approx_eq!(f64, fc.values[1], 500.5);
        assert_approx_eq!(f64, fc.values[2], 250.0);
        assert_eq!(fc.to_string(), "1000 500.5  250");
    }

    #[test]
    fn force_constants_isotropic() {
        let fc: ForceConstants = "1000".parse().unwrap();
        assert!(!fc.is_per_axis());
        assert_eq!(fc.values.len(), 1);
    }

    #[test]
    fn force_constants_invalid() {
        for string in ["500 500", "a b c", "", "1 2 3 4"] {
            match string.parse::<ForceConstants>() {
                Err(RestraintMappingError::InvalidForceConstants(e)) => assert_eq!(e, string),
                Ok(_) => panic!("Parsing `{}` should have failed.", string),
                Err(e) => panic!("Incorrect error type `{:?}` was returned.", e),
            }
        }
    }

    #[test]
    fn parse_triplets() {
        let triplets = RestraintTriplet::parse_list(
            "( Chain_A, Chain_A_noMut, A ), ( Chain_B, Chain_B_noMut, B )",
        )
        .unwrap();

        assert_eq!(
            triplets,
            vec![
                RestraintTriplet::new("Chain_A", "Chain_A_noMut", "A"),
                RestraintTriplet::new("Chain_B", "Chain_B_noMut", "B"),
            ]
        );
    }

    #[test]
    fn parse_single_triplet_compact() {
        let triplets = RestraintTriplet::parse_list("(Chain_A,Chain_A_noMut,A)").unwrap();
        assert_eq!(triplets.len(), 1);
        assert_eq!(triplets[0].reference(), "Chain_A");
        assert_eq!(triplets[0].restrain(), "Chain_A_noMut");
        assert_eq!(triplets[0].chain(), "A");
    }

    #[test]
    fn parse_triplets_invalid() {
        match RestraintTriplet::parse_list("( Chain_A, A ), ( Chain_B, Chain_B_noMut, B )") {
            Err(RestraintMappingError::InvalidTriplet(e)) => assert_eq!(e, "( Chain_A, A"),
            Ok(_) => panic!("Parsing should have failed, but it succeeded."),
            Err(e) => panic!("Incorrect error type `{:?}` was returned.", e),
        }
    }

    #[test]
    fn parse_triplets_empty() {
        assert_eq!(
            RestraintTriplet::parse_list("  "),
            Err(RestraintMappingError::NoTriplets)
        );
    }

    #[test]
    fn map_simple() {
        let restraints = PositionRestraints::map(&[5, 6, 7, 8], &[6, 7], fc()).unwrap();
        assert_eq!(restraints.local_indices(), &[2, 3]);
    }

    #[test]
    fn map_unordered() {
        let restraints = PositionRestraints::map(&[5, 6, 7, 8], &[8, 5], fc()).unwrap();
        assert_eq!(restraints.local_indices(), &[4, 1]);
    }

    #[test]
    fn map_duplicate_reference_uses_first() {
        let restraints = PositionRestraints::map(&[3, 9, 3], &[3], fc()).unwrap();
        assert_eq!(restraints.local_indices(), &[1]);
    }

    #[test]
    fn map_missing_atom() {
        match PositionRestraints::map(&[5, 6, 7, 8], &[6, 9], fc()) {
            Err(RestraintMappingError::AtomNotInReference { atom, .. }) => assert_eq!(atom, 9),
            Ok(_) => panic!("Mapping should have failed, but it succeeded."),
            Err(e) => panic!("Incorrect error type `{:?}` was returned.", e),
        }
    }

    #[test]
    fn from_triplet() {
        let index = IndexFile::from_ndx("test_files/ndx2resttop.ndx").unwrap();

        let restraints = PositionRestraints::from_triplet(
            &index,
            &RestraintTriplet::new("Chain_B", "Chain_B_noMut", "B"),
            fc(),
        )
        .unwrap();

        assert_eq!(restraints.local_indices(), &[2, 4, 11, 12]);
    }

    #[test]
    fn from_triplet_missing_group() {
        let index = IndexFile::from_ndx("test_files/ndx2resttop.ndx").unwrap();

        match PositionRestraints::from_triplet(
            &index,
            &RestraintTriplet::new("Chain_C", "Chain_C_noMut", "C"),
            fc(),
        ) {
            Err(RestraintMappingError::GroupNotFound(e)) => assert_eq!(e, "Chain_C"),
            Ok(_) => panic!("Mapping should have failed, but it succeeded."),
            Err(e) => panic!("Incorrect error type `{:?}` was returned.", e),
        }
    }

    #[test]
    fn from_triplet_not_subset() {
        let index = IndexFile::from_ndx("test_files/ndx2resttop.ndx").unwrap();

        match PositionRestraints::from_triplet(
            &index,
            &RestraintTriplet::new("Chain_A", "Chain_B_noMut", "A"),
            fc(),
        ) {
            Err(RestraintMappingError::AtomNotInReference {
                atom,
                restrain,
                reference,
            }) => {
                assert_eq!(atom, 10);
                assert_eq!(restrain, "Chain_B_noMut");
                assert_eq!(reference, "Chain_A");
            }
            Ok(_) => panic!("Mapping should have failed, but it succeeded."),
            Err(e) => panic!("Incorrect error type `{:?}` was returned.", e),
        }
    }

    #[test]
    fn map_random_subsets() {
        let mut rng = rand::thread_rng();

        for _ in 0..50 {
            let n_atoms = rng.gen_range(1..200);
            let offset = rng.gen_range(1..10_000);
            let mut reference: Vec<usize> = (offset..offset + n_atoms).collect();
            reference.shuffle(&mut rng);

            let restrain: Vec<usize> = reference
                .iter()
                .copied()
                .filter(|_| rng.gen_bool(0.4))
                .collect();

            let restraints = PositionRestraints::map(&reference, &restrain, fc()).unwrap();

            // indices are in range and point back to the same atoms
            for (&local, &atom) in restraints.local_indices().iter().zip(restrain.iter()) {
                assert!(local >= 1 && local <= reference.len());
                assert_eq!(reference[local - 1], atom);
            }

            // restrain group follows the reference order, so the indices must be increasing
            assert!(restraints
                .local_indices()
                .windows(2)
                .all(|pair| pair[0] < pair[1]));
        }
    }
}
