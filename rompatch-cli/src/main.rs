//! rompatch CLI
//!
//! Command-line interface for keeping a ROM patch archive's filenames on the
//! canonical naming scheme.

mod cli_types;
mod commands;
mod error;
mod logger;

use clap::Parser;

use cli_types::{Cli, Commands, ValidateAction};
use error::CliError;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init(cli.quiet, cli.verbose, cli.logfile.as_deref()) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    if let Err(e) = run(cli) {
        log::error!("{e}");
        log::logger().flush();
        std::process::exit(1);
    }
    log::logger().flush();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let root = cli.root.as_deref();
    match cli.command {
        Commands::Rename {
            apply,
            backup,
            baserom,
        } => commands::rename::run_rename(root, apply, backup, baserom, cli.quiet),
        Commands::Plan { baserom, json } => {
            commands::plan::run_plan(root, baserom, json, cli.quiet)
        }
        Commands::Validate { action } => match action {
            ValidateAction::Manifest { path, json, strict } => {
                commands::validate::run_validate_manifest(root, path.as_deref(), json, strict)
            }
            ValidateAction::Pr { json, strict } => {
                commands::validate::run_validate_pr(root, json, strict)
            }
        },
        Commands::Badges { output } => commands::badges::run_badges(root, output.as_deref()),
    }
}
