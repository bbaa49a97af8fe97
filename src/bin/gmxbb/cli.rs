// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "gmxbb",
    about = "Gromacs building blocks",
    version,
    author,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Put a structure into a simulation box (gmx editconf)
    Editconf(EditconfArgs),
    /// Create a run input file (gmx grompp)
    Grompp(GromppArgs),
    /// Run a simulation (gmx mdrun)
    Mdrun(MdrunArgs),
    /// Create a run input file and run the simulation
    GromppMdrun(GromppMdrunArgs),
    /// Add ions to a system (gmx genion)
    Genion(GenionArgs),
    /// Generate position restraints (gmx genrestr)
    Genrestr(GenrestrArgs),
    /// Create an index file (gmx make_ndx)
    MakeNdx(MakeNdxArgs),
    /// Create a topology from a PDB file (gmx pdb2gmx)
    Pdb2gmx(Pdb2gmxArgs),
    /// Solvate a system (gmx solvate)
    Solvate(SolvateArgs),
    /// Select atoms and merge them with an index file (gmx select)
    Gmxselect(SelectArgs),
    /// Write a selection into an index file (gmx select)
    Select(SelectArgs),
    /// Cluster structures of a trajectory (gmx cluster)
    Cluster(AnalysisArgs),
    /// Calculate RMSD of a trajectory (gmx rms)
    Rms(AnalysisArgs),
    /// Restrain chains of a topology using index groups
    Ndx2resttop(Ndx2ResttopArgs),
    /// Append a ligand to a topology
    AppendLigand(AppendLigandArgs),
}

/// Configuration shared by all commands.
#[derive(Args)]
pub struct ConfigOption {
    /// Properties of the block (YAML/JSON file or string)
    #[arg(short, long, value_name = "CONFIG")]
    pub config: Option<String>,
}

#[derive(Args)]
pub struct EditconfArgs {
    #[command(flatten)]
    pub config: ConfigOption,
    #[arg(long = "input_gro_path", value_name = "FILE")]
    pub input_gro_path: PathBuf,
    #[arg(long = "output_gro_path", value_name = "FILE")]
    pub output_gro_path: PathBuf,
}

#[derive(Args)]
pub struct GromppArgs {
    #[command(flatten)]
    pub config: ConfigOption,
    #[arg(long = "input_gro_path", value_name = "FILE")]
    pub input_gro_path: PathBuf,
    #[arg(long = "input_top_zip_path", value_name = "FILE")]
    pub input_top_zip_path: PathBuf,
    #[arg(long = "output_tpr_path", value_name = "FILE")]
    pub output_tpr_path: PathBuf,
    #[arg(long = "input_cpt_path", value_name = "FILE")]
    pub input_cpt_path: Option<PathBuf>,
    #[arg(long = "input_ndx_path", value_name = "FILE")]
    pub input_ndx_path: Option<PathBuf>,
    #[arg(long = "input_mdp_path", value_name = "FILE")]
    pub input_mdp_path: Option<PathBuf>,
}

/// Output files of a simulation.
#[derive(Args)]
pub struct SimulationOutputs {
    #[arg(long = "output_trr_path", value_name = "FILE")]
    pub output_trr_path: PathBuf,
    #[arg(long = "output_gro_path", value_name = "FILE")]
    pub output_gro_path: PathBuf,
    #[arg(long = "output_edr_path", value_name = "FILE")]
    pub output_edr_path: PathBuf,
    #[arg(long = "output_log_path", value_name = "FILE")]
    pub output_log_path: PathBuf,
    #[arg(long = "input_cpt_path", value_name = "FILE")]
    pub input_cpt_path: Option<PathBuf>,
    #[arg(long = "output_xtc_path", value_name = "FILE")]
    pub output_xtc_path: Option<PathBuf>,
    #[arg(long = "output_cpt_path", value_name = "FILE")]
    pub output_cpt_path: Option<PathBuf>,
    #[arg(long = "output_dhdl_path", value_name = "FILE")]
    pub output_dhdl_path: Option<PathBuf>,
}

#[derive(Args)]
pub struct MdrunArgs {
    #[command(flatten)]
    pub config: ConfigOption,
    #[arg(long = "input_tpr_path", value_name = "FILE")]
    pub input_tpr_path: PathBuf,
    #[command(flatten)]
    pub outputs: SimulationOutputs,
}

#[derive(Args)]
pub struct GromppMdrunArgs {
    #[command(flatten)]
    pub config: ConfigOption,
    #[arg(long = "input_gro_path", value_name = "FILE")]
    pub input_gro_path: PathBuf,
    #[arg(long = "input_top_zip_path", value_name = "FILE")]
    pub input_top_zip_path: PathBuf,
    #[arg(long = "input_ndx_path", value_name = "FILE")]
    pub input_ndx_path: Option<PathBuf>,
    #[arg(long = "input_mdp_path", value_name = "FILE")]
    pub input_mdp_path: Option<PathBuf>,
    #[command(flatten)]
    pub outputs: SimulationOutputs,
}

#[derive(Args)]
pub struct GenionArgs {
    #[command(flatten)]
    pub config: ConfigOption,
    #[arg(long = "input_tpr_path", value_name = "FILE")]
    pub input_tpr_path: PathBuf,
    #[arg(long = "input_top_zip_path", value_name = "FILE")]
    pub input_top_zip_path: PathBuf,
    #[arg(long = "output_gro_path", value_name = "FILE")]
    pub output_gro_path: PathBuf,
    #[arg(long = "output_top_zip_path", value_name = "FILE")]
    pub output_top_zip_path: PathBuf,
    #[arg(long = "input_ndx_path", value_name = "FILE")]
    pub input_ndx_path: Option<PathBuf>,
}

#[derive(Args)]
pub struct GenrestrArgs {
    #[command(flatten)]
    pub config: ConfigOption,
    #[arg(long = "input_structure_path", value_name = "FILE")]
    pub input_structure_path: PathBuf,
    #[arg(long = "input_ndx_path", value_name = "FILE")]
    pub input_ndx_path: Option<PathBuf>,
    #[arg(long = "input_top_zip_path", value_name = "FILE")]
    pub input_top_zip_path: Option<PathBuf>,
    #[arg(long = "output_itp_path", value_name = "FILE")]
    pub output_itp_path: Option<PathBuf>,
    #[arg(long = "output_top_zip_path", value_name = "FILE")]
    pub output_top_zip_path: Option<PathBuf>,
}

#[derive(Args)]
pub struct MakeNdxArgs {
    #[command(flatten)]
    pub config: ConfigOption,
    #[arg(long = "input_structure_path", value_name = "FILE")]
    pub input_structure_path: PathBuf,
    #[arg(long = "output_ndx_path", value_name = "FILE")]
    pub output_ndx_path: PathBuf,
    #[arg(long = "input_ndx_path", value_name = "FILE")]
    pub input_ndx_path: Option<PathBuf>,
}

#[derive(Args)]
pub struct Pdb2gmxArgs {
    #[command(flatten)]
    pub config: ConfigOption,
    #[arg(long = "input_pdb_path", value_name = "FILE")]
    pub input_pdb_path: PathBuf,
    #[arg(long = "output_gro_path", value_name = "FILE")]
    pub output_gro_path: PathBuf,
    #[arg(long = "output_top_zip_path", value_name = "FILE")]
    pub output_top_zip_path: PathBuf,
}

#[derive(Args)]
pub struct SolvateArgs {
    #[command(flatten)]
    pub config: ConfigOption,
    #[arg(long = "input_solute_gro_path", value_name = "FILE")]
    pub input_solute_gro_path: PathBuf,
    #[arg(long = "output_gro_path", value_name = "FILE")]
    pub output_gro_path: PathBuf,
    #[arg(long = "input_top_zip_path", value_name = "FILE")]
    pub input_top_zip_path: PathBuf,
    #[arg(long = "output_top_zip_path", value_name = "FILE")]
    pub output_top_zip_path: PathBuf,
}

#[derive(Args)]
pub struct SelectArgs {
    #[command(flatten)]
    pub config: ConfigOption,
    #[command(flatten)]
    pub select: SelectFiles,
}

/// Files of `gmx select`.
#[derive(Args)]
pub struct SelectFiles {
    #[arg(long = "input_structure_path", value_name = "FILE")]
    pub input_structure_path: PathBuf,
    #[arg(long = "output_ndx_path", value_name = "FILE")]
    pub output_ndx_path: PathBuf,
    #[arg(long = "input_ndx_path", value_name = "FILE")]
    pub input_ndx_path: Option<PathBuf>,
}

/// Arguments of the trajectory analyses.
#[derive(Args)]
pub struct AnalysisArgs {
    #[command(flatten)]
    pub config: ConfigOption,
    #[arg(long = "input_structure_path", value_name = "FILE")]
    pub input_structure_path: PathBuf,
    #[arg(long = "input_traj_path", value_name = "FILE")]
    pub input_traj_path: PathBuf,
    /// Output structure (cluster) or xvg file (rms)
    #[arg(long = "output_path", value_name = "FILE")]
    pub output_path: PathBuf,
    #[arg(long = "input_index_path", value_name = "FILE")]
    pub input_index_path: Option<PathBuf>,
}

#[derive(Args)]
pub struct Ndx2ResttopArgs {
    #[command(flatten)]
    pub config: ConfigOption,
    #[arg(long = "input_ndx_path", value_name = "FILE")]
    pub input_ndx_path: PathBuf,
    #[arg(long = "input_top_zip_path", value_name = "FILE")]
    pub input_top_zip_path: PathBuf,
    #[arg(long = "output_top_zip_path", value_name = "FILE")]
    pub output_top_zip_path: PathBuf,
}

#[derive(Args)]
pub struct AppendLigandArgs {
    #[command(flatten)]
    pub config: ConfigOption,
    #[arg(long = "input_top_zip_path", value_name = "FILE")]
    pub input_top_zip_path: PathBuf,
    #[arg(long = "input_itp_path", value_name = "FILE")]
    pub input_itp_path: PathBuf,
    #[arg(long = "input_posres_itp_path", value_name = "FILE")]
    pub input_posres_itp_path: Option<PathBuf>,
    #[arg(long = "output_top_zip_path", value_name = "FILE")]
    pub output_top_zip_path: PathBuf,
}

pub fn parse() -> Cli {
    Cli::parse()
}
