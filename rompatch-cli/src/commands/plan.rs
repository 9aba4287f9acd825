use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::{Stderr, Stdout};
use serde::Serialize;

use rompatch_core::RenameDecision;
use rompatch_lib::{RecordOutcome, validate_plan};

use crate::commands::{open_archive, plan_with_spinner, print_decision_warnings, print_rename_line};
use crate::error::CliError;

#[derive(Serialize)]
struct PlanReport<'a> {
    decisions: Vec<&'a RenameDecision>,
    skipped: Vec<&'a Path>,
    failed: Vec<FailedRecord<'a>>,
    issues: Vec<String>,
}

#[derive(Serialize)]
struct FailedRecord<'a> {
    metadata_path: &'a Path,
    error: String,
}

/// Print every computed name, including records that are already canonical.
pub(crate) fn run_plan(
    root: Option<&Path>,
    baserom: Option<String>,
    json: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let (layout, tables) = open_archive(root)?;
    let plan = plan_with_spinner(&layout, &tables, baserom, quiet || json)?;
    let issues = validate_plan(&plan);

    if json {
        let report = PlanReport {
            decisions: plan.decisions().collect(),
            skipped: plan.skipped().collect(),
            failed: plan
                .failed()
                .map(|(metadata_path, error)| FailedRecord {
                    metadata_path,
                    error: error.to_string(),
                })
                .collect(),
            issues: issues.iter().map(|i| i.to_string()).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let mut current_dir: Option<PathBuf> = None;
    for outcome in &plan.outcomes {
        let RecordOutcome::Planned(decision) = outcome else {
            continue;
        };
        let dir = decision.metadata_path.parent().map(Path::to_path_buf);
        if dir != current_dir {
            if let Some(d) = &dir {
                log::info!(
                    "{}",
                    layout
                        .display_path(d)
                        .display()
                        .if_supports_color(Stdout, |t| t.bold()),
                );
            }
            current_dir = dir;
        }

        if decision.needs_rename {
            print_rename_line(decision);
        } else {
            log::info!(
                "  {} {}",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                decision.new_filename.if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
        print_decision_warnings(decision);
    }

    for path in plan.skipped() {
        log::warn!(
            "  {} {} (no patch file)",
            "?".if_supports_color(Stderr, |t| t.yellow()),
            layout.display_path(path).display(),
        );
    }
    for (path, error) in plan.failed() {
        log::warn!(
            "  {} {}: {}",
            "\u{26A0}".if_supports_color(Stderr, |t| t.yellow()),
            layout.display_path(path).display(),
            error,
        );
    }

    log::info!("");
    log::info!(
        "{} records, {} to rename",
        plan.decisions().count(),
        plan.rename_count(),
    );
    for issue in &issues {
        log::warn!(
            "  {} {}",
            "\u{2718}".if_supports_color(Stderr, |t| t.red()),
            issue,
        );
    }
    Ok(())
}
