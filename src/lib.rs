// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! # gmxbb: Gromacs Building Blocks for Rust
//!
//! Rust library wrapping the command line tools of the Gromacs package
//! into building blocks of simulation workflows.
//!
//! Each building block constructs a Gromacs command from typed properties and file paths,
//! runs it (optionally inside a Docker or Singularity container) and post-processes its outputs.
//! Topologies are passed between the blocks as zip archives containing one top file
//! and any number of itp files.
//!
//! ## Usage
//!
//! Run
//!
//! ```bash
//! $ cargo add gmxbb
//! ```
//!
//! Import the crate in your Rust code:
//! ```
//! use gmxbb::prelude::*;
//! ```
//!
//! ## Examples
//!
//! #### Preparing a system for a simulation
//!
//! Create a topology, put the protein into a box, solvate it and add ions.
//!
//! ```no_run
//! use gmxbb::prelude::*;
//! use std::error::Error;
//!
//! fn main() -> Result<(), Box<dyn Error>> {
//!     pdb2gmx("protein.pdb", "protein.gro", "topology.zip", Pdb2gmxProperties::default())?;
//!     editconf("protein.gro", "box.gro", EditconfProperties::default())?;
//!
//!     solvate(
//!         SolvatePaths {
//!             input_solute_gro_path: "box.gro".into(),
//!             output_gro_path: "solvated.gro".into(),
//!             input_top_zip_path: "topology.zip".into(),
//!             output_top_zip_path: "solvated.zip".into(),
//!         },
//!         SolvateProperties::default(),
//!     )?;
//!
//!     Ok(())
//! }
//! ```
//!
//! #### Reading properties from a configuration
//!
//! Properties of every building block can be read from a YAML or JSON file or string.
//! An optional top-level `properties` mapping is unwrapped.
//!
//! ```no_run
//! use gmxbb::prelude::*;
//! use std::error::Error;
//!
//! fn main() -> Result<(), Box<dyn Error>> {
//!     let properties: GromppProperties = read_properties(Some(
//!         "properties:\n  simulation_type: nvt\n  mdp:\n    nsteps: 5000\n",
//!     ))?;
//!
//!     grompp(
//!         GromppPaths {
//!             input_gro_path: "ions.gro".into(),
//!             input_top_zip_path: "ions.zip".into(),
//!             output_tpr_path: "nvt.tpr".into(),
//!             ..Default::default()
//!         },
//!         properties,
//!     )?;
//!
//!     Ok(())
//! }
//! ```
//!
//! #### Restraining chains using index groups
//!
//! Atoms of `Chain_A_noMut` are restrained relative to the numbering of `Chain_A`
//! and the restraints are included into the itp file of chain `A`.
//!
//! ```no_run
//! use gmxbb::prelude::*;
//! use std::error::Error;
//!
//! fn main() -> Result<(), Box<dyn Error>> {
//!     let properties = Ndx2ResttopProperties {
//!         ref_rest_chain_triplet_list: Some("(Chain_A, Chain_A_noMut, A)".to_owned()),
//!         ..Default::default()
//!     };
//!
//!     ndx2resttop("index.ndx", "topology.zip", "restrained.zip", properties)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Running building blocks as tasks
//! Building blocks return `BlockError` if they can not be run. Use [`runner::task::run_task`]
//! to run a block as an isolated task which never fails: errors and panics are logged and
//! all outputs of the block are replaced with failure markers.
//!
//! ## Error handling
//! The individual error types provided by `gmxbb` are not exported into the `prelude` module
//! except for the umbrella [`errors::BlockError`].
//! If you want to use specific error type, include it explicitly from the `errors` module:
//! ```
//! use gmxbb::errors::TopologyError;
//! ```
//!
//! ## Logging
//! `gmxbb` logs through the `log` crate. Output of the Gromacs commands is additionally
//! written into the log files of the individual steps.
//!
//! ## License
//! This library is released under the MIT License.

/// Current version of the `gmxbb` library.
pub const GMXBB_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod auxiliary;
pub mod config;
pub mod errors;
pub mod files;
mod test_utilities;

pub mod io {
    pub mod itp_io;
    pub mod mdp_io;
    mod ndx_io;
    pub mod top_io;
    pub mod zip_io;
}

pub mod structures {
    pub mod index;
    pub mod mdp;
    pub mod restraint;
    pub mod topology;
}

pub mod runner {
    pub mod block;
    pub mod command;
    pub mod container;
    pub mod stage;
    pub mod task;
    pub mod version;
}

pub mod blocks {
    pub mod append_ligand;
    pub mod cluster;
    pub mod editconf;
    pub mod genion;
    pub mod genrestr;
    pub mod gmxselect;
    pub mod grompp;
    pub mod grompp_mdrun;
    pub mod make_ndx;
    pub mod mdrun;
    pub mod ndx2resttop;
    pub mod pdb2gmx;
    pub mod rms;
    pub mod select;
    pub mod solvate;
}

/// Reexported building blocks, their properties and basic `gmxbb` structures.
pub mod prelude {
    pub use crate::blocks::append_ligand::{append_ligand, AppendLigand, AppendLigandProperties};
    pub use crate::blocks::cluster::{cluster, Cluster, ClusterPaths, ClusterProperties};
    pub use crate::blocks::editconf::{editconf, Editconf, EditconfProperties};
    pub use crate::blocks::genion::{genion, Genion, GenionPaths, GenionProperties};
    pub use crate::blocks::genrestr::{genrestr, Genrestr, GenrestrPaths, GenrestrProperties};
    pub use crate::blocks::gmxselect::{gmxselect, GmxSelect, GmxSelectProperties};
    pub use crate::blocks::grompp::{grompp, Grompp, GromppPaths, GromppProperties};
    pub use crate::blocks::grompp_mdrun::{
        grompp_mdrun, GromppMdrun, GromppMdrunPaths, GromppMdrunProperties,
    };
    pub use crate::blocks::make_ndx::{make_ndx, MakeNdx, MakeNdxProperties};
    pub use crate::blocks::mdrun::{mdrun, Mdrun, MdrunOptions, MdrunPaths, MdrunProperties};
    pub use crate::blocks::ndx2resttop::{ndx2resttop, Ndx2Resttop, Ndx2ResttopProperties};
    pub use crate::blocks::pdb2gmx::{pdb2gmx, Pdb2gmx, Pdb2gmxProperties};
    pub use crate::blocks::rms::{rms, Rms, RmsPaths, RmsProperties};
    pub use crate::blocks::select::{select, Select, SelectPaths, SelectProperties};
    pub use crate::blocks::solvate::{solvate, Solvate, SolvatePaths, SolvateProperties};
    pub use crate::config::{read_properties, GmxProperties, Properties, StepProperties};
    pub use crate::errors::BlockError;
    pub use crate::files::FileType;
    pub use crate::io::zip_io::TopologyBundle;
    pub use crate::runner::block::BuildingBlock;
    pub use crate::runner::task::run_task;
    pub use crate::structures::index::IndexFile;
    pub use crate::structures::mdp::{MdpParameters, SimulationType};
    pub use crate::structures::restraint::{ForceConstants, PositionRestraints, RestraintTriplet};
    pub use crate::structures::topology::Topology;
}
