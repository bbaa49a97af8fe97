// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

use std::path::PathBuf;

use gmxbb::prelude::*;

use crate::cli::*;

/// Read properties of a block from the `-c/--config` option.
fn properties<T: Properties>(config: &ConfigOption) -> Result<T, BlockError> {
    Ok(read_properties(config.config.as_deref())?)
}

/// Collect all provided output paths.
fn outputs<const N: usize>(required: &[&PathBuf], optional: [&Option<PathBuf>; N]) -> Vec<PathBuf> {
    required
        .iter()
        .map(|&x| x.clone())
        .chain(optional.into_iter().flatten().cloned())
        .collect()
}

fn simulation_outputs(sim: &SimulationOutputs) -> Vec<PathBuf> {
    outputs(
        &[
            &sim.output_trr_path,
            &sim.output_gro_path,
            &sim.output_edr_path,
            &sim.output_log_path,
        ],
        [
            &sim.output_xtc_path,
            &sim.output_cpt_path,
            &sim.output_dhdl_path,
        ],
    )
}

/// Run the block selected by the command as a task.
///
/// ## Returns
/// Name of the block and its return code.
pub fn dispatch(command: Command) -> (&'static str, i32) {
    match command {
        Command::Editconf(args) => {
            let out = vec![args.output_gro_path.clone()];
            (
                "editconf",
                run_task("editconf", &out, || {
                    editconf(
                        &args.input_gro_path,
                        &args.output_gro_path,
                        properties(&args.config)?,
                    )
                }),
            )
        }

        Command::Grompp(args) => {
            let out = vec![args.output_tpr_path.clone()];
            let paths = GromppPaths {
                input_gro_path: args.input_gro_path,
                input_top_zip_path: args.input_top_zip_path,
                output_tpr_path: args.output_tpr_path,
                input_cpt_path: args.input_cpt_path,
                input_ndx_path: args.input_ndx_path,
                input_mdp_path: args.input_mdp_path,
            };
            (
                "grompp",
                run_task("grompp", &out, || grompp(paths, properties(&args.config)?)),
            )
        }

        Command::Mdrun(args) => {
            let out = simulation_outputs(&args.outputs);
            let sim = args.outputs;
            let paths = MdrunPaths {
                input_tpr_path: args.input_tpr_path,
                output_trr_path: sim.output_trr_path,
                output_gro_path: sim.output_gro_path,
                output_edr_path: sim.output_edr_path,
                output_log_path: sim.output_log_path,
                input_cpt_path: sim.input_cpt_path,
                output_xtc_path: sim.output_xtc_path,
                output_cpt_path: sim.output_cpt_path,
                output_dhdl_path: sim.output_dhdl_path,
            };
            (
                "mdrun",
                run_task("mdrun", &out, || mdrun(paths, properties(&args.config)?)),
            )
        }

        Command::GromppMdrun(args) => {
            let out = simulation_outputs(&args.outputs);
            let sim = args.outputs;
            let paths = GromppMdrunPaths {
                input_gro_path: args.input_gro_path,
                input_top_zip_path: args.input_top_zip_path,
                output_trr_path: sim.output_trr_path,
                output_gro_path: sim.output_gro_path,
                output_edr_path: sim.output_edr_path,
                output_log_path: sim.output_log_path,
                input_cpt_path: sim.input_cpt_path,
                input_ndx_path: args.input_ndx_path,
                input_mdp_path: args.input_mdp_path,
                output_xtc_path: sim.output_xtc_path,
                output_cpt_path: sim.output_cpt_path,
                output_dhdl_path: sim.output_dhdl_path,
            };
            (
                "grompp_mdrun",
                run_task("grompp_mdrun", &out, || {
                    grompp_mdrun(paths, properties(&args.config)?)
                }),
            )
        }

        Command::Genion(args) => {
            let out = vec![args.output_gro_path.clone(), args.output_top_zip_path.clone()];
            let paths = GenionPaths {
                input_tpr_path: args.input_tpr_path,
                input_top_zip_path: args.input_top_zip_path,
                output_gro_path: args.output_gro_path,
                output_top_zip_path: args.output_top_zip_path,
                input_ndx_path: args.input_ndx_path,
            };
            (
                "genion",
                run_task("genion", &out, || genion(paths, properties(&args.config)?)),
            )
        }

        Command::Genrestr(args) => {
            let out = outputs(&[], [&args.output_itp_path, &args.output_top_zip_path]);
            let paths = GenrestrPaths {
                input_structure_path: args.input_structure_path,
                input_ndx_path: args.input_ndx_path,
                input_top_zip_path: args.input_top_zip_path,
                output_itp_path: args.output_itp_path,
                output_top_zip_path: args.output_top_zip_path,
            };
            (
                "genrestr",
                run_task("genrestr", &out, || {
                    genrestr(paths, properties(&args.config)?)
                }),
            )
        }

        Command::MakeNdx(args) => {
            let out = vec![args.output_ndx_path.clone()];
            (
                "make_ndx",
                run_task("make_ndx", &out, || {
                    make_ndx(
                        &args.input_structure_path,
                        &args.output_ndx_path,
                        args.input_ndx_path.as_ref(),
                        properties(&args.config)?,
                    )
                }),
            )
        }

        Command::Pdb2gmx(args) => {
            let out = vec![args.output_gro_path.clone(), args.output_top_zip_path.clone()];
            (
                "pdb2gmx",
                run_task("pdb2gmx", &out, || {
                    pdb2gmx(
                        &args.input_pdb_path,
                        &args.output_gro_path,
                        &args.output_top_zip_path,
                        properties(&args.config)?,
                    )
                }),
            )
        }

        Command::Solvate(args) => {
            let out = vec![args.output_gro_path.clone(), args.output_top_zip_path.clone()];
            let paths = SolvatePaths {
                input_solute_gro_path: args.input_solute_gro_path,
                output_gro_path: args.output_gro_path,
                input_top_zip_path: args.input_top_zip_path,
                output_top_zip_path: args.output_top_zip_path,
            };
            (
                "solvate",
                run_task("solvate", &out, || solvate(paths, properties(&args.config)?)),
            )
        }

        Command::Gmxselect(args) => {
            let out = vec![args.select.output_ndx_path.clone()];
            let config = args.config;
            (
                "gmxselect",
                run_task("gmxselect", &out, || {
                    gmxselect(select_paths(args.select), properties(&config)?)
                }),
            )
        }

        Command::Select(args) => {
            let out = vec![args.select.output_ndx_path.clone()];
            let config = args.config;
            (
                "select",
                run_task("select", &out, || {
                    select(select_paths(args.select), properties(&config)?)
                }),
            )
        }

        Command::Cluster(args) => {
            let out = vec![args.output_path.clone()];
            let paths = ClusterPaths {
                input_structure_path: args.input_structure_path,
                input_traj_path: args.input_traj_path,
                output_pdb_path: args.output_path,
                input_index_path: args.input_index_path,
            };
            (
                "cluster",
                run_task("cluster", &out, || cluster(paths, properties(&args.config)?)),
            )
        }

        Command::Rms(args) => {
            let out = vec![args.output_path.clone()];
            let paths = RmsPaths {
                input_structure_path: args.input_structure_path,
                input_traj_path: args.input_traj_path,
                output_xvg_path: args.output_path,
                input_index_path: args.input_index_path,
            };
            (
                "rms",
                run_task("rms", &out, || rms(paths, properties(&args.config)?)),
            )
        }

        Command::Ndx2resttop(args) => {
            let out = vec![args.output_top_zip_path.clone()];
            (
                "ndx2resttop",
                run_task("ndx2resttop", &out, || {
                    ndx2resttop(
                        &args.input_ndx_path,
                        &args.input_top_zip_path,
                        &args.output_top_zip_path,
                        properties(&args.config)?,
                    )
                }),
            )
        }

        Command::AppendLigand(args) => {
            let out = vec![args.output_top_zip_path.clone()];
            (
                "append_ligand",
                run_task("append_ligand", &out, || {
                    append_ligand(
                        &args.input_top_zip_path,
                        &args.input_itp_path,
                        args.input_posres_itp_path.as_ref(),
                        &args.output_top_zip_path,
                        properties(&args.config)?,
                    )
                }),
            )
        }
    }
}

fn select_paths(args: SelectFiles) -> SelectPaths {
    SelectPaths {
        input_structure_path: args.input_structure_path,
        output_ndx_path: args.output_ndx_path,
        input_ndx_path: args.input_ndx_path,
    }
}
