//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rompatch")]
#[command(about = "Standardize and validate patch filenames in a ROM patch archive", long_about = None)]
pub(crate) struct Cli {
    /// Archive root containing config/, metadata/ and patches/ (defaults to current directory)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write log output to a file (ANSI codes stripped)
    #[arg(long, global = true)]
    pub logfile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Rename patch files (and their metadata) to the canonical naming scheme
    Rename {
        /// Perform the renames (default is a dry run)
        #[arg(long)]
        apply: bool,

        /// Copy originals into a timestamped backup directory first
        #[arg(long)]
        backup: bool,

        /// Only process one base ROM subdirectory (e.g., emerald)
        #[arg(long)]
        baserom: Option<String>,
    },

    /// Show the computed name for every patch, including ones already canonical
    Plan {
        /// Only process one base ROM subdirectory (e.g., emerald)
        #[arg(long)]
        baserom: Option<String>,

        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Check filenames against the naming convention without changing anything
    Validate {
        #[command(subcommand)]
        action: ValidateAction,
    },

    /// Generate the badge stylesheet from the config tables
    Badges {
        /// Output file (default: docs/assets/css/generated/badges.css)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub(crate) enum ValidateAction {
    /// Validate every entry of the published manifest
    Manifest {
        /// Manifest file (default: docs/manifest.json)
        path: Option<PathBuf>,

        /// Output JSON instead of text
        #[arg(long)]
        json: bool,

        /// Exit with an error when any entry is invalid
        #[arg(long)]
        strict: bool,
    },

    /// Validate every metadata record and its patch file
    Pr {
        /// Output JSON instead of text
        #[arg(long)]
        json: bool,

        /// Exit with an error when any file is non-compliant
        #[arg(long)]
        strict: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn rename_defaults_to_dry_run() {
        let cli = Cli::parse_from(["rompatch", "rename"]);
        match cli.command {
            Commands::Rename {
                apply,
                backup,
                baserom,
            } => {
                assert!(!apply);
                assert!(!backup);
                assert!(baserom.is_none());
            }
            _ => panic!("expected rename"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "rompatch", "validate", "manifest", "site/manifest.json", "--json", "-v", "--root",
            "/archive",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.root, Some(PathBuf::from("/archive")));
        match cli.command {
            Commands::Validate {
                action: ValidateAction::Manifest { path, json, strict },
            } => {
                assert_eq!(path, Some(PathBuf::from("site/manifest.json")));
                assert!(json);
                assert!(!strict);
            }
            _ => panic!("expected validate manifest"),
        }
    }
}
