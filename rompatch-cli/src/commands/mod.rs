pub(crate) mod badges;
pub(crate) mod plan;
pub(crate) mod rename;
pub(crate) mod validate;

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::{Stderr, Stdout};

use rompatch_core::{ConfigTables, RenameDecision};
use rompatch_lib::{ArchiveLayout, PlanOptions, PlanProgress, RenamePlan, plan_renames};

use crate::error::CliError;

/// Resolve the archive root and load its layout and config tables.
pub(crate) fn open_archive(
    root: Option<&Path>,
) -> Result<(ArchiveLayout, ConfigTables), CliError> {
    let root: PathBuf = match root {
        Some(r) => r.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let layout = ArchiveLayout::load(root)?;
    let tables = layout.load_tables()?;
    log::debug!(
        "Loaded {} systems and {} base ROMs from {}",
        tables.systems.len(),
        tables.base_roms.len(),
        layout.config_dir.display()
    );
    Ok((layout, tables))
}

/// Plan renames behind a spinner (hidden when `quiet`).
pub(crate) fn plan_with_spinner(
    layout: &ArchiveLayout,
    tables: &ConfigTables,
    baserom: Option<String>,
    quiet: bool,
) -> Result<RenamePlan, CliError> {
    layout.require_archive_dirs()?;

    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("  {spinner:.cyan} {msg}") {
            pb.set_style(style.tick_chars("/-\\|"));
        }
        pb
    };

    let progress_callback = |progress: PlanProgress| match progress {
        PlanProgress::Scanned { file_count } => {
            pb.set_message(format!("Found {file_count} metadata files"));
            pb.tick();
        }
        PlanProgress::Resolving {
            ref file_name,
            file_index,
            total,
        } => {
            pb.set_message(format!("[{}/{}] Resolving {}", file_index + 1, total, file_name));
            pb.tick();
        }
        PlanProgress::Done => {
            pb.finish_and_clear();
        }
    };

    let options = PlanOptions { baserom };
    let result = plan_renames(
        &layout.metadata_dir,
        &layout.patches_dir,
        tables,
        &options,
        &progress_callback,
    );
    pb.finish_and_clear();
    Ok(result?)
}

/// Print the warnings attached to one decision, indented under it.
pub(crate) fn print_decision_warnings(decision: &RenameDecision) {
    for warning in &decision.warnings {
        log::warn!(
            "      {} {}",
            "\u{26A0}".if_supports_color(Stderr, |t| t.yellow()),
            warning,
        );
    }
}

/// `old → new` line for a pending rename.
pub(crate) fn print_rename_line(decision: &RenameDecision) {
    log::info!(
        "  {} {} {}",
        decision.old_filename,
        "\u{2192}".if_supports_color(Stdout, |t| t.green()),
        decision
            .new_filename
            .if_supports_color(Stdout, |t| t.bold()),
    );
}
