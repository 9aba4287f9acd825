//! Naming checks for the published manifest and for pull-request trees.
//!
//! Both checks only report. Nothing on disk is changed.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use rompatch_core::{ConfigTables, PatchMetadata, load_metadata, resolve_decision};

use crate::error::ArchiveError;
use crate::layout::require_dir;
use crate::rename::scan_metadata_files;

/// One entry of `docs/manifest.json`. Other keys are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    #[serde(default)]
    pub id: serde_json::Value,
    /// Patch path relative to the manifest's directory
    pub file: String,
    #[serde(default)]
    pub base_rom: Option<String>,
}

impl ManifestEntry {
    fn id_label(&self) -> String {
        match &self.id {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => self.file.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ManifestReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Check every manifest entry's patch against the canonical naming rules.
pub fn validate_manifest(
    manifest_path: &Path,
    metadata_dir: &Path,
    tables: &ConfigTables,
) -> ManifestReport {
    let entries = match read_manifest(manifest_path) {
        Ok(entries) => entries,
        Err(e) => {
            return ManifestReport::from_errors(vec![format!("Failed to read manifest: {e}")]);
        }
    };
    log::debug!(
        "Validating {} manifest entries from {}",
        entries.len(),
        manifest_path.display()
    );

    let base_dir = manifest_path.parent().unwrap_or(Path::new(""));
    let mut errors = Vec::new();

    for entry in &entries {
        let patch_path = base_dir.join(&entry.file);
        if !patch_path.exists() {
            errors.push(format!("Missing patch file: {}", entry.file));
            continue;
        }

        let Some(base_rom) = entry.base_rom.as_deref() else {
            errors.push(format!("Missing baseRom for {}", entry.id_label()));
            continue;
        };
        if !metadata_dir.join(base_rom).is_dir() {
            errors.push(format!("Missing metadata directory for {base_rom}"));
            continue;
        }

        let found = match find_manifest_metadata(metadata_dir, base_rom, &patch_path) {
            Ok(found) => found,
            Err(e) => {
                errors.push(format!("Validation error for {}: {e}", entry.id_label()));
                continue;
            }
        };
        let Some((md_path, metadata)) = found else {
            errors.push(format!("No metadata file found for {}", entry.file));
            continue;
        };

        let decision = resolve_decision(tables, &metadata, &md_path, &patch_path);
        if decision.needs_rename {
            errors.push(format!(
                "Non-standard filename: {} → {}",
                decision.old_filename, decision.new_filename
            ));
        }
    }

    ManifestReport::from_errors(errors)
}

fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>, String> {
    let contents = fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&contents).map_err(|e| e.to_string())
}

/// The metadata record for `patch_path` inside one base-ROM directory.
///
/// A same-stem `.md` wins; otherwise the first record (sorted) whose `file`
/// reference names the patch. Unparseable candidates in the fallback scan are
/// ignored.
fn find_manifest_metadata(
    metadata_dir: &Path,
    base_rom: &str,
    patch_path: &Path,
) -> Result<Option<(PathBuf, PatchMetadata)>, String> {
    if let Some(stem) = patch_path.file_stem() {
        let mut name = stem.to_os_string();
        name.push(".md");
        let same_stem = metadata_dir.join(base_rom).join(name);
        if same_stem.is_file() {
            let metadata = load_metadata(&same_stem).map_err(|e| e.to_string())?;
            return Ok(Some((same_stem, metadata)));
        }
    }

    let patch_name = patch_path.file_name();
    let candidates =
        scan_metadata_files(metadata_dir, Some(base_rom)).map_err(|e| e.to_string())?;
    for md_path in candidates {
        let Ok(metadata) = load_metadata(&md_path) else {
            continue;
        };
        let refers_to_patch = metadata
            .patch_ref()
            .is_some_and(|r| Path::new(r).file_name() == patch_name);
        if refers_to_patch {
            return Ok(Some((md_path, metadata)));
        }
    }
    Ok(None)
}

/// A file whose name does not follow the convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrIssue {
    pub current: String,
    pub expected: String,
    pub metadata: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrReport {
    pub valid: bool,
    pub issues: Vec<PrIssue>,
}

/// Check every metadata record and its same-stem patch.
///
/// Records without a patch are skipped. `root` is only used to shorten the
/// reported metadata paths.
pub fn validate_pr_files(
    metadata_dir: &Path,
    patches_dir: &Path,
    tables: &ConfigTables,
    root: &Path,
) -> Result<PrReport, ArchiveError> {
    require_dir("Metadata", metadata_dir)?;
    require_dir("Patches", patches_dir)?;

    let mut issues = Vec::new();
    for md_path in scan_metadata_files(metadata_dir, None)? {
        let metadata = match load_metadata(&md_path) {
            Ok(m) => m,
            Err(e) => {
                issues.push(PrIssue {
                    current: md_path.display().to_string(),
                    expected: "ERROR".to_string(),
                    metadata: format!("Validation failed: {e}"),
                });
                continue;
            }
        };

        let Some(patch_path) = find_same_stem_patch(&md_path, patches_dir)? else {
            log::debug!("No patch for {}, skipping", md_path.display());
            continue;
        };

        let decision = resolve_decision(tables, &metadata, &md_path, &patch_path);
        if decision.needs_rename {
            issues.push(PrIssue {
                current: decision.old_filename,
                expected: decision.new_filename,
                metadata: md_path
                    .strip_prefix(root)
                    .unwrap_or(&md_path)
                    .display()
                    .to_string(),
            });
        }
    }

    Ok(PrReport {
        valid: issues.is_empty(),
        issues,
    })
}

/// First file (sorted) named `<stem>.*` in `<patches>/<metadata subdir>/`.
fn find_same_stem_patch(
    md_path: &Path,
    patches_dir: &Path,
) -> Result<Option<PathBuf>, ArchiveError> {
    let (Some(subdir), Some(stem)) = (
        md_path.parent().and_then(|p| p.file_name()),
        md_path.file_stem().and_then(|s| s.to_str()),
    ) else {
        return Ok(None);
    };

    let patch_dir = patches_dir.join(subdir);
    if !patch_dir.is_dir() {
        return Ok(None);
    }

    let prefix = format!("{stem}.");
    let mut matches: Vec<PathBuf> = fs::read_dir(&patch_dir)
        .map_err(|e| ArchiveError::io(patch_dir.display().to_string(), e))?
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix))
        })
        .collect();
    matches.sort();
    Ok(matches.into_iter().next())
}
