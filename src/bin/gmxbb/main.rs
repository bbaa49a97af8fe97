// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

use std::process::ExitCode;

use colored::Colorize;

mod cli;
mod commands;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = cli::parse();
    let (name, code) = commands::dispatch(cli.command);

    if code == 0 {
        eprintln!("{} {}", name.bold(), "finished successfully".green());
    } else {
        eprintln!(
            "{} {} {}",
            name.bold(),
            "failed with return code".red(),
            code.to_string().red().bold()
        );
    }

    // exit codes are limited to 0-255
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
