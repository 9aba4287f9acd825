use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::{Stderr, Stdout};

use rompatch_lib::{ExecuteOptions, RenameSummary, execute_renames};

use crate::commands::{open_archive, plan_with_spinner, print_decision_warnings, print_rename_line};
use crate::error::CliError;

pub(crate) fn run_rename(
    root: Option<&Path>,
    apply: bool,
    backup: bool,
    baserom: Option<String>,
    quiet: bool,
) -> Result<(), CliError> {
    let (layout, tables) = open_archive(root)?;

    log::info!(
        "Scanning metadata in: {}",
        layout
            .display_path(&layout.metadata_dir)
            .display()
            .if_supports_color(Stdout, |t| t.cyan()),
    );
    if let Some(sub) = &baserom {
        log::info!(
            "{}",
            format!("Base ROM filter: {sub}").if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    if !apply {
        log::info!(
            "{}",
            "Dry run: no files will be renamed (use --apply)"
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    log::info!("");

    let plan = plan_with_spinner(&layout, &tables, baserom, quiet)?;

    for decision in plan.renames() {
        print_rename_line(decision);
        print_decision_warnings(decision);
    }

    let validated = match plan.validated() {
        Ok(v) => v,
        Err(issues) => {
            log::error!("");
            log::error!(
                "{}",
                "Conflicts (nothing was renamed):".if_supports_color(Stderr, |t| t.bold()),
            );
            for issue in &issues {
                log::error!(
                    "  {} {}",
                    "\u{2718}".if_supports_color(Stderr, |t| t.red()),
                    issue,
                );
            }
            return Err(CliError::PlanRejected(issues.len()));
        }
    };

    let options = ExecuteOptions {
        dry_run: !apply,
        backup_root: backup.then(|| layout.backup_dir.clone()),
    };
    let summary = execute_renames(&validated, &options);

    log::info!("");
    print_summary(&summary, plan.skipped().count(), plan.failed().count(), &layout.root);
    Ok(())
}

fn print_summary(summary: &RenameSummary, skipped: usize, failed: usize, root: &Path) {
    log::info!("{}", "Summary:".if_supports_color(Stdout, |t| t.bold()));
    if summary.renamed > 0 {
        log::info!(
            "  {} {} patches renamed",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            summary.renamed,
        );
    }
    if summary.metadata_updated > 0 {
        log::info!(
            "  {} {} metadata files updated",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            summary.metadata_updated,
        );
    }
    if summary.would_rename > 0 {
        log::info!(
            "  {} {} patches would be renamed",
            "\u{2192}".if_supports_color(Stdout, |t| t.cyan()),
            summary.would_rename,
        );
    }
    if summary.already_correct > 0 {
        log::info!(
            "  {} {} already correctly named",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            summary.already_correct,
        );
    }
    if let Some(dir) = &summary.backup_dir
        && summary.backed_up > 0
    {
        log::info!(
            "  {} {} originals backed up to {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            summary.backed_up,
            dir.strip_prefix(root).unwrap_or(dir).display(),
        );
    }
    if skipped > 0 {
        log::warn!(
            "  {} {} records without a patch file",
            "?".if_supports_color(Stderr, |t| t.yellow()),
            skipped,
        );
    }
    if failed > 0 {
        log::warn!(
            "  {} {} metadata files could not be read",
            "\u{26A0}".if_supports_color(Stderr, |t| t.yellow()),
            failed,
        );
    }
    for error in &summary.errors {
        log::error!(
            "  {} {}",
            "\u{2718}".if_supports_color(Stderr, |t| t.red()),
            error,
        );
    }
}
