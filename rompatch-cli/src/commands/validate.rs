use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::{Stderr, Stdout};

use rompatch_lib::{validate_manifest, validate_pr_files};

use crate::commands::open_archive;
use crate::error::CliError;

pub(crate) fn run_validate_manifest(
    root: Option<&Path>,
    path: Option<&Path>,
    json: bool,
    strict: bool,
) -> Result<(), CliError> {
    let (layout, tables) = open_archive(root)?;
    let manifest_path = path.map_or_else(|| layout.manifest_path.clone(), Path::to_path_buf);
    let report = validate_manifest(&manifest_path, &layout.metadata_dir, &tables);

    if json {
        println!("{}", serde_json::to_string(&report)?);
    } else if report.valid {
        log::info!(
            "{} All filenames are valid",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::warn!(
            "{} Validation errors:",
            "\u{2718}".if_supports_color(Stderr, |t| t.red()),
        );
        for error in &report.errors {
            log::warn!("  - {error}");
        }
    }

    if strict && !report.valid {
        return Err(CliError::validation_failed(format!(
            "{} manifest error(s)",
            report.errors.len()
        )));
    }
    Ok(())
}

pub(crate) fn run_validate_pr(
    root: Option<&Path>,
    json: bool,
    strict: bool,
) -> Result<(), CliError> {
    let (layout, tables) = open_archive(root)?;
    let report = validate_pr_files(
        &layout.metadata_dir,
        &layout.patches_dir,
        &tables,
        &layout.root,
    )?;

    if json {
        println!("{}", serde_json::to_string(&report)?);
    } else if report.valid {
        log::info!(
            "{} All filenames follow naming convention",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::warn!(
            "{} Found {} non-compliant filenames:",
            "\u{26A0}".if_supports_color(Stderr, |t| t.yellow()),
            report.issues.len(),
        );
        for issue in &report.issues {
            log::warn!(
                "  {} {} {}",
                issue.current,
                "\u{2192}".if_supports_color(Stderr, |t| t.green()),
                issue.expected,
            );
        }
    }

    if strict && !report.valid {
        return Err(CliError::validation_failed(format!(
            "{} non-compliant file(s)",
            report.issues.len()
        )));
    }
    Ok(())
}
