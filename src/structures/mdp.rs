// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Implementation of molecular dynamics parameters and their presets.

use std::fmt::Display;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Type of simulation determining the preset of the mdp parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationType {
    /// Energy minimization using the steepest descent algorithm.
    Minimization,
    /// Same as `Minimization`. Used before adding ions.
    Ions,
    /// Constant number of particles, volume and temperature.
    Nvt,
    /// Constant number of particles, pressure and temperature.
    Npt,
    /// Free molecular dynamics without position restraints.
    Free,
    /// No parameters at all. Used to create a tpr file for index generation.
    Index,
}

impl FromStr for SimulationType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minimization" => Ok(SimulationType::Minimization),
            "ions" => Ok(SimulationType::Ions),
            "nvt" => Ok(SimulationType::Nvt),
            "npt" => Ok(SimulationType::Npt),
            "free" => Ok(SimulationType::Free),
            "index" => Ok(SimulationType::Index),
            _ => Err(ConfigError::InvalidValue(
                "simulation_type".to_owned(),
                s.to_owned(),
            )),
        }
    }
}

impl Display for SimulationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SimulationType::Minimization => "minimization",
            SimulationType::Ions => "ions",
            SimulationType::Nvt => "nvt",
            SimulationType::Npt => "npt",
            SimulationType::Free => "free",
            SimulationType::Index => "index",
        };

        write!(f, "{}", name)
    }
}

/// Ordered collection of mdp parameters.
///
/// Keys are normalized on insertion (underscores are replaced with hyphens)
/// and compared case-insensitively, so `nstxout_compressed`, `nstxout-compressed`
/// and `NSTXOUT-COMPRESSED` refer to the same parameter.
/// The spelling used when the parameter was first set is kept.
/// Pseudo-parameters `type` and `simulation-type` are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MdpParameters {
    /// Lowercase normalized key -> (spelling, value).
    parameters: IndexMap<String, (String, String)>,
}

/// Normalize the name of an mdp parameter.
fn normalize_key(key: &str) -> String {
    key.trim().replace('_', "-")
}

/// Key used to look up an mdp parameter.
fn lookup_key(key: &str) -> String {
    normalize_key(key).to_lowercase()
}

impl MdpParameters {
    /// Create an empty set of parameters.
    pub fn new() -> Self {
        MdpParameters::default()
    }

    /// Set the value of a parameter. Replaces the value of a parameter that is already present
    /// while keeping its position and spelling.
    pub fn set(&mut self, key: &str, value: impl Display) {
        let lookup = lookup_key(key);
        if lookup == "type" || lookup == "simulation-type" {
            return;
        }

        match self.parameters.get_mut(&lookup) {
            Some((_, old)) => *old = value.to_string(),
            None => {
                self.parameters
                    .insert(lookup, (normalize_key(key), value.to_string()));
            }
        }
    }

    /// Get the value of a parameter.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.parameters
            .get(&lookup_key(key))
            .map(|(_, value)| value.as_str())
    }

    /// Check whether the parameter is set.
    pub fn contains(&self, key: &str) -> bool {
        self.parameters.contains_key(&lookup_key(key))
    }

    /// Get the number of parameters.
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Check whether there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Iterate over the parameters in the order of insertion.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parameters
            .values()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Merge `other` into `self`. Parameters of `other` take priority.
    pub fn merge(&mut self, other: &MdpParameters) {
        for (key, value) in other.iter() {
            self.set(key, value);
        }
    }

    /// Construct parameters preset for the given type of simulation.
    /// `None` and `SimulationType::Index` produce no parameters.
    pub fn preset(simulation: Option<SimulationType>) -> Self {
        let mut mdp = MdpParameters::new();

        let simulation = match simulation {
            None | Some(SimulationType::Index) => return mdp,
            Some(x) => x,
        };

        let minimization = matches!(
            simulation,
            SimulationType::Minimization | SimulationType::Ions
        );

        // position restraints
        if simulation != SimulationType::Free {
            mdp.set("Define", "-DPOSRES");
        }

        // run parameters
        mdp.set("nsteps", 5000);
        if minimization {
            mdp.set("integrator", "steep");
            mdp.set("emtol", "1000.0");
            mdp.set("emstep", "0.01");
        } else {
            mdp.set("integrator", "md");
            mdp.set("dt", "0.002");
        }

        // output control
        if !minimization {
            let frequency = if simulation == SimulationType::Free {
                5000
            } else {
                500
            };

            for key in ["nstxout", "nstvout", "nstenergy", "nstlog"] {
                mdp.set(key, frequency);
            }
            mdp.set("nstcalcenergy", 100);
            mdp.set("nstcomm", 100);
            mdp.set("nstxout-compressed", 1000);
            mdp.set("compressed-x-precision", 1000);
            mdp.set("compressed-x-grps", "System");
        }

        // bonds
        if !minimization {
            mdp.set("constraint-algorithm", "lincs");
            mdp.set("constraints", "h-bonds");
            mdp.set("lincs-iter", 1);
            mdp.set("lincs-order", 4);
            mdp.set(
                "continuation",
                if simulation == SimulationType::Nvt {
                    "no"
                } else {
                    "yes"
                },
            );
        }

        // neighbour searching and electrostatics
        mdp.set("cutoff-scheme", "Verlet");
        mdp.set("ns-type", "grid");
        mdp.set("rcoulomb", "1.0");
        mdp.set("vdwtype", "cut-off");
        mdp.set("rvdw", "1.0");
        mdp.set("nstlist", 10);
        mdp.set("rlist", 1);
        mdp.set("coulombtype", "PME");
        if !minimization {
            mdp.set("pme-order", 4);
            mdp.set("fourierspacing", "0.12");
            mdp.set("ewald-rtol", "1e-5");
        }

        // temperature and pressure coupling
        if !minimization {
            mdp.set("tcoupl", "V-rescale");
            mdp.set("tc-grps", "Protein Non-Protein");
            mdp.set("tau-t", "0.1 0.1");
            mdp.set("ref-t", "300 300");

            if simulation == SimulationType::Nvt {
                mdp.set("pcoupl", "no");
            } else {
                mdp.set("pcoupl", "Parrinello-Rahman");
                mdp.set("pcoupltype", "isotropic");
                mdp.set("tau-p", "1.0");
                mdp.set("ref-p", "1.0");
                mdp.set("compressibility", "4.5e-5");
                mdp.set("refcoord-scaling", "com");
            }
        }

        // dispersion correction
        if !minimization {
            mdp.set("DispCorr", "EnerPres");
        }

        // velocity generation
        if simulation == SimulationType::Nvt {
            mdp.set("gen-vel", "yes");
            mdp.set("gen-temp", 300);
            mdp.set("gen-seed", -1);
        } else if !minimization {
            mdp.set("gen-vel", "no");
        }

        // periodic boundary conditions
        mdp.set("pbc", "xyz");

        mdp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn normalize_on_insertion() {
        let mut mdp = MdpParameters::new();
        mdp.set("nstxout-compressed", 1000);
        mdp.set("nstxout_compressed", 5000);

        assert_eq!(mdp.len(), 1);
        assert_eq!(mdp.get("nstxout-compressed"), Some("5000"));
        assert_eq!(mdp.get("nstxout_compressed"), Some("5000"));
    }

    #[test]
    fn case_insensitive_keys() {
        let mut mdp = MdpParameters::new();
        mdp.set("Define", "-DPOSRES");
        mdp.set("define", "-DCUSTOM_POSRES");
        mdp.set("DispCorr", "EnerPres");
        mdp.set("dispcorr", "no");

        assert_eq!(mdp.len(), 2);
        assert_eq!(mdp.get("DEFINE"), Some("-DCUSTOM_POSRES"));
        assert_eq!(
            mdp.iter().collect::<Vec<_>>(),
            vec![("Define", "-DCUSTOM_POSRES"), ("DispCorr", "no")]
        );
    }

    #[test]
    fn pseudo_keys_skipped() {
        let mut mdp = MdpParameters::new();
        mdp.set("type", "nvt");
        mdp.set("simulation_type", "nvt");
        mdp.set("simulation-type", "nvt");
        mdp.set("Type", "npt");

        assert!(mdp.is_empty());
    }

    #[test]
    fn preset_nvt() {
        let mdp = MdpParameters::preset(Some(SimulationType::Nvt));

        assert_eq!(mdp.get("integrator"), Some("md"));
        assert_eq!(mdp.get("gen-vel"), Some("yes"));
        assert_eq!(mdp.get("pcoupl"), Some("no"));
        assert!(!mdp.contains("pcoupltype"));
        assert_eq!(mdp.get("Define"), Some("-DPOSRES"));
        assert_eq!(mdp.get("continuation"), Some("no"));
        assert_eq!(mdp.get("nstxout"), Some("500"));
    }

    #[test]
    fn preset_npt() {
        let mdp = MdpParameters::preset(Some(SimulationType::Npt));

        assert_eq!(mdp.get("integrator"), Some("md"));
        assert_eq!(mdp.get("pcoupl"), Some("Parrinello-Rahman"));
        assert_eq!(mdp.get("pcoupltype"), Some("isotropic"));
        assert_eq!(mdp.get("gen-vel"), Some("no"));
        assert_eq!(mdp.get("continuation"), Some("yes"));
        assert_approx_eq!(
            f64,
            mdp.get("compressibility").unwrap().parse::<f64>().unwrap(),
            4.5e-5
        );
    }

    #[test]
    fn preset_free() {
        let mdp = MdpParameters::preset(Some(SimulationType::Free));

        assert!(!mdp.contains("Define"));
        assert_eq!(mdp.get("nstxout"), Some("5000"));
        assert_eq!(mdp.get("pcoupl"), Some("Parrinello-Rahman"));
    }

    #[test]
    fn preset_minimization_and_ions() {
        let minimization = MdpParameters::preset(Some(SimulationType::Minimization));
        let ions = MdpParameters::preset(Some(SimulationType::Ions));

        assert_eq!(minimization, ions);
        assert_eq!(minimization.get("integrator"), Some("steep"));
        assert_eq!(minimization.get("emtol"), Some("1000.0"));
        assert_eq!(minimization.get("Define"), Some("-DPOSRES"));
        assert!(!minimization.contains("tcoupl"));
        assert!(!minimization.contains("gen-vel"));
        assert!(!minimization.contains("dt"));
    }

    #[test]
    fn preset_index() {
        assert!(MdpParameters::preset(Some(SimulationType::Index)).is_empty());
        assert!(MdpParameters::preset(None).is_empty());
    }

    #[test]
    fn merge_priority() {
        let mut mdp = MdpParameters::preset(Some(SimulationType::Nvt));
        let n_parameters = mdp.len();

        let mut overrides = MdpParameters::new();
        overrides.set("nsteps", 100);
        overrides.set("ref_t", "310 310");
        overrides.set("custom_parameter", "value");
        mdp.merge(&overrides);

        assert_eq!(mdp.len(), n_parameters + 1);
        assert_eq!(mdp.get("nsteps"), Some("100"));
        assert_eq!(mdp.get("ref-t"), Some("310 310"));
        assert_eq!(mdp.get("custom-parameter"), Some("value"));
    }

    #[test]
    fn simulation_type_from_str() {
        assert_eq!("npt".parse::<SimulationType>(), Ok(SimulationType::Npt));
        assert_eq!(
            "nve".parse::<SimulationType>(),
            Err(ConfigError::InvalidValue(
                "simulation_type".to_owned(),
                "nve".to_owned()
            ))
        );
        assert_eq!(SimulationType::Minimization.to_string(), "minimization");
    }
}
